use super::Vec3;

/// 4x4 affine/projective matrix in column-major order.
///
/// Element layout matches 3D Tiles `transform` arrays and WebGL-style engines:
/// `m[col * 4 + row]`, translation in `m[12..15]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    m: [f64; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn from_cols_array(m: [f64; 16]) -> Self {
        Self { m }
    }

    /// Accepts exactly 16 finite numbers.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let m: [f64; 16] = values.try_into().ok()?;
        if m.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self { m })
    }

    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY.m;
        m[12] = t.x;
        m[13] = t.y;
        m[14] = t.z;
        Self { m }
    }

    /// Columns are the images of the x, y and z axes; `origin` is the translation.
    pub fn from_basis(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3, origin: Vec3) -> Self {
        Self {
            m: [
                x_axis.x, x_axis.y, x_axis.z, 0.0, //
                y_axis.x, y_axis.y, y_axis.z, 0.0, //
                z_axis.x, z_axis.y, z_axis.z, 0.0, //
                origin.x, origin.y, origin.z, 1.0,
            ],
        }
    }

    pub fn as_cols_array(&self) -> &[f64; 16] {
        &self.m
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }

    /// First three components of column `col` (0 = x axis, 1 = y, 2 = z, 3 = translation).
    pub fn column3(&self, col: usize) -> Vec3 {
        let i = col * 4;
        Vec3::new(self.m[i], self.m[i + 1], self.m[i + 2])
    }

    pub fn translation(&self) -> Vec3 {
        self.column3(3)
    }

    pub fn mul_vec4(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = self.get(row, 0) * v[0]
                + self.get(row, 1) * v[1]
                + self.get(row, 2) * v[2]
                + self.get(row, 3) * v[3];
        }
        out
    }

    /// Transform a point (w = 1) and divide by the resulting w.
    ///
    /// Returns `None` when w is zero or the result is not finite.
    pub fn transform_point(&self, p: Vec3) -> Option<Vec3> {
        let [x, y, z, w] = self.mul_vec4([p.x, p.y, p.z, 1.0]);
        if w == 0.0 {
            return None;
        }
        let out = Vec3::new(x / w, y / w, z / w);
        out.is_finite().then_some(out)
    }
}
