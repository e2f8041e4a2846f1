//! Point-cloud local frame to geocentric frame.

use foundation::math::{Geodetic, Mat4, Vec3, geodetic_to_ecef};
use tracing::warn;

/// Dataset transform plus the local origin subtracted before applying it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReference {
    pub transform: Mat4,
    pub origin: Vec3,
}

impl FrameReference {
    pub fn new(transform: Mat4, origin: Vec3) -> Self {
        Self { transform, origin }
    }

    /// `transform * (p - origin, 1)` divided by w.
    pub fn to_geocentric(&self, local: Vec3) -> Option<Vec3> {
        self.transform.transform_point(local - self.origin)
    }
}

/// Forward map from the dataset's planar CRS to degrees of (lon, lat).
///
/// `None` or non-finite output counts as malformed.
pub trait GeodeticProjection {
    fn forward(&self, x: f64, y: f64) -> Option<(f64, f64)>;
}

impl<F> GeodeticProjection for F
where
    F: Fn(f64, f64) -> Option<(f64, f64)>,
{
    fn forward(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self(x, y)
    }
}

/// Where malformed projection results are placed.
pub fn projection_fallback() -> Vec3 {
    geodetic_to_ecef(Geodetic::from_degrees(0.0, 0.0, 0.0)).as_vec3()
}

/// Projects planar x/y, keeping z as height above the ellipsoid.
pub fn project_to_geocentric<P: GeodeticProjection + ?Sized>(projection: &P, local: Vec3) -> Vec3 {
    match projection.forward(local.x, local.y) {
        Some((lon, lat)) if lon.is_finite() && lat.is_finite() => {
            geodetic_to_ecef(Geodetic::from_degrees(lon, lat, local.z)).as_vec3()
        }
        other => {
            warn!(?other, x = local.x, y = local.y, "invalid coordinates returned from projection");
            projection_fallback()
        }
    }
}

/// Position, forward target and up reference points of one camera pose.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraSample {
    pub position: Vec3,
    pub target: Vec3,
    pub up_point: Vec3,
}

impl CameraSample {
    pub fn map(self, mut f: impl FnMut(Vec3) -> Option<Vec3>) -> Option<Self> {
        Some(Self {
            position: f(self.position)?,
            target: f(self.target)?,
            up_point: f(self.up_point)?,
        })
    }
}

/// Holds whichever conversion the loaded dataset supports.
///
/// The transform path wins whenever a frame reference is present.
#[derive(Default)]
pub struct CoordinateBridge {
    reference: Option<FrameReference>,
    projection: Option<Box<dyn GeodeticProjection>>,
}

impl std::fmt::Debug for CoordinateBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinateBridge")
            .field("reference", &self.reference)
            .field("projection", &self.projection.is_some())
            .finish()
    }
}

impl CoordinateBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference(reference: FrameReference) -> Self {
        Self {
            reference: Some(reference),
            projection: None,
        }
    }

    pub fn set_reference(&mut self, reference: Option<FrameReference>) {
        self.reference = reference;
    }

    pub fn reference(&self) -> Option<&FrameReference> {
        self.reference.as_ref()
    }

    pub fn set_projection(&mut self, projection: impl GeodeticProjection + 'static) {
        self.projection = Some(Box::new(projection));
    }

    pub fn clear_projection(&mut self) {
        self.projection = None;
    }

    pub fn has_projection(&self) -> bool {
        self.projection.is_some()
    }

    pub fn is_available(&self) -> bool {
        self.reference.is_some() || self.projection.is_some()
    }

    /// `None` when neither path is loaded or the transform divides by zero.
    pub fn to_geocentric(&self, local: Vec3) -> Option<Vec3> {
        if let Some(reference) = &self.reference {
            return reference.to_geocentric(local);
        }
        let projection = self.projection.as_deref()?;
        Some(project_to_geocentric(projection, local))
    }

    pub fn transform_sample(&self, sample: CameraSample) -> Option<CameraSample> {
        sample.map(|p| self.to_geocentric(p))
    }
}
