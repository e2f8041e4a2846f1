use super::{Ecef, Geodetic, Vec3, geodetic_to_ecef};

/// Local East-North-Up coordinates (meters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }
}

/// Unit east, north and up axes of the local tangent frame at `origin`, in ECEF.
pub fn enu_basis(origin: Geodetic) -> [Vec3; 3] {
    let sin_lat = origin.lat_rad.sin();
    let cos_lat = origin.lat_rad.cos();
    let sin_lon = origin.lon_rad.sin();
    let cos_lon = origin.lon_rad.cos();

    [
        Vec3::new(-sin_lon, cos_lon, 0.0),
        Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
        Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
    ]
}

/// Coordinates of geocentric `point` in the tangent frame at `origin`.
pub fn ecef_to_enu(point: Ecef, origin: Geodetic) -> Enu {
    let offset = point.as_vec3() - geodetic_to_ecef(origin).as_vec3();
    let [east, north, up] = enu_basis(origin);
    Enu::new(offset.dot(east), offset.dot(north), offset.dot(up))
}

pub fn enu_to_ecef(enu: Enu, origin: Geodetic) -> Ecef {
    let [east, north, up] = enu_basis(origin);
    let offset = east * enu.east + north * enu.north + up * enu.up;
    (geodetic_to_ecef(origin).as_vec3() + offset).into()
}

#[cfg(test)]
mod tests {
    use super::{Enu, ecef_to_enu, enu_basis, enu_to_ecef};
    use crate::math::{Geodetic, geodetic_to_ecef};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn enu_round_trip_at_equator() {
        let origin = Geodetic::new(0.0, 0.0, 0.0);
        let enu = Enu::new(15.0, -8.0, 2.5);
        let ecef = enu_to_ecef(enu, origin);
        let enu_rt = ecef_to_enu(ecef, origin);

        assert_close(enu_rt.east, enu.east, 1e-9);
        assert_close(enu_rt.north, enu.north, 1e-9);
        assert_close(enu_rt.up, enu.up, 1e-9);
    }

    #[test]
    fn enu_zero_at_origin() {
        let origin = Geodetic::new(0.1, -0.2, 35.0);
        let origin_ecef = geodetic_to_ecef(origin);
        let enu = ecef_to_enu(origin_ecef, origin);
        assert_close(enu.east, 0.0, 1e-9);
        assert_close(enu.north, 0.0, 1e-9);
        assert_close(enu.up, 0.0, 1e-9);
    }

    #[test]
    fn enu_basis_is_orthonormal() {
        let [east, north, up] = enu_basis(Geodetic::new(0.5, 2.0, 0.0));
        assert_close(east.length(), 1.0, 1e-12);
        assert_close(north.length(), 1.0, 1e-12);
        assert_close(east.dot(north), 0.0, 1e-12);
        assert_close(east.cross(north).dot(up), 1.0, 1e-12);
    }
}
