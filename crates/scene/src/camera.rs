//! Camera capabilities of the two renderers.

use foundation::math::{Mat4, Vec3, ecef_to_geodetic, enu_basis};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Orientation relative to the local east-north-up frame at the camera position.
///
/// Heading is clockwise from north, pitch positive above the horizon, roll
/// positive to the right. All radians.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct HeadingPitchRoll {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl HeadingPitchRoll {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }
}

/// Direction, up and right axes for `hpr` at geocentric `position`.
pub fn axes_from_heading_pitch_roll(position: Vec3, hpr: HeadingPitchRoll) -> [Vec3; 3] {
    let [east, north, up] = enu_basis(ecef_to_geodetic(position.into()));
    let (sh, ch) = hpr.heading.sin_cos();
    let (sp, cp) = hpr.pitch.sin_cos();
    let (sr, cr) = hpr.roll.sin_cos();

    let direction = north * (cp * ch) + east * (cp * sh) + up * sp;
    let level_right = east * ch - north * sh;
    let level_up = level_right.cross(direction);

    let cam_up = level_up * cr + level_right * sr;
    let right = direction.cross(cam_up);
    [direction, cam_up, right]
}

/// Inverse of [`axes_from_heading_pitch_roll`].
pub fn heading_pitch_roll_from_axes(position: Vec3, direction: Vec3, cam_up: Vec3) -> HeadingPitchRoll {
    let [east, north, up] = enu_basis(ecef_to_geodetic(position.into()));
    let d = Vec3::new(direction.dot(east), direction.dot(north), direction.dot(up));
    let u = Vec3::new(cam_up.dot(east), cam_up.dot(north), cam_up.dot(up));

    let pitch = d.z.clamp(-1.0, 1.0).asin();
    let looking_straight = (d.z.abs() - 1.0).abs() < 1e-9;

    let heading = if looking_straight {
        // Straight down or up: the top of the view carries the heading.
        let sign = if d.z > 0.0 { -1.0 } else { 1.0 };
        (sign * u.x).atan2(sign * u.y)
    } else {
        d.x.atan2(d.y)
    };

    let roll = if looking_straight {
        0.0
    } else {
        let right = d.cross(u);
        (-right.z).atan2(u.z)
    };

    HeadingPitchRoll::new(heading.rem_euclid(TAU), pitch.clamp(-FRAC_PI_2, FRAC_PI_2), roll)
}

/// Globe renderer camera in the geocentric frame.
pub trait GlobeCamera {
    fn position(&self) -> Vec3;
    fn direction(&self) -> Vec3;
    fn up(&self) -> Vec3;

    fn right(&self) -> Vec3 {
        self.direction().cross(self.up())
    }

    fn set_view(&mut self, position: Vec3, direction: Vec3, up: Vec3);

    fn heading_pitch_roll(&self) -> HeadingPitchRoll {
        heading_pitch_roll_from_axes(self.position(), self.direction(), self.up())
    }

    fn set_heading_pitch_roll(&mut self, hpr: HeadingPitchRoll) {
        let position = self.position();
        let [direction, up, _] = axes_from_heading_pitch_roll(position, hpr);
        self.set_view(position, direction, up);
    }

    /// Translates along `axis` by `amount` meters, keeping orientation.
    fn move_along(&mut self, axis: Vec3, amount: f64) {
        let position = self.position() + axis * amount;
        let (direction, up) = (self.direction(), self.up());
        self.set_view(position, direction, up);
    }

    /// Field of view in radians.
    fn fov(&self) -> f64;
    fn set_fov(&mut self, fov_rad: f64);
}

/// Point-cloud renderer camera in the dataset's local frame.
pub trait PointCloudCamera {
    /// Camera-to-world matrix. Column 0 is right, 1 is up, 2 points backwards.
    ///
    /// `None` when the renderer has no usable matrix this frame.
    fn world_matrix(&self) -> Option<Mat4>;

    /// Vertical field of view in degrees.
    fn fov_deg(&self) -> f64;

    fn aspect(&self) -> f64;
}

/// Orbit view of the point-cloud renderer.
pub trait PointCloudView {
    fn view_position(&self) -> Vec3;
    fn set_view_position(&mut self, position: Vec3);
    fn set_view_direction(&mut self, direction: Vec3);

    /// Point the orbit controls rotate around.
    fn pivot(&self) -> Vec3;
}
