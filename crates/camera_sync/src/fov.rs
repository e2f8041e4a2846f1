/// Globe field of view matching a point-cloud camera's vertical FOV.
///
/// The globe frustum's FOV spans the wider screen dimension, so landscape
/// viewports get the horizontal angle.
pub fn globe_fov_from_vertical(fov_y_deg: f64, aspect: f64) -> f64 {
    let fov_y = fov_y_deg.to_radians();
    if aspect < 1.0 {
        fov_y
    } else {
        ((fov_y * 0.5).tan() * aspect).atan() * 2.0
    }
}
