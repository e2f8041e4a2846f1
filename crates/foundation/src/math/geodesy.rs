use super::Ecef;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Geodetic coordinates in radians and meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            alt_m,
        }
    }

    /// Build from longitude/latitude in degrees, the order mapping libraries use.
    pub fn from_degrees(lon_deg: f64, lat_deg: f64, alt_m: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), alt_m)
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_rad.to_degrees()
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_rad.to_degrees()
    }
}

/// Radius of curvature in the prime vertical at geodetic latitude `lat_rad`.
pub fn prime_vertical_radius(lat_rad: f64) -> f64 {
    let s = lat_rad.sin();
    WGS84_A / (1.0 - WGS84_E2 * s * s).sqrt()
}

pub fn geodetic_to_ecef(geo: Geodetic) -> Ecef {
    let n = prime_vertical_radius(geo.lat_rad);
    let (sin_lat, cos_lat) = geo.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = geo.lon_rad.sin_cos();
    let equatorial = (n + geo.alt_m) * cos_lat;

    Ecef::new(
        equatorial * cos_lon,
        equatorial * sin_lon,
        (n * (1.0 - WGS84_E2) + geo.alt_m) * sin_lat,
    )
}

/// Bowring's closed-form inverse; sub-millimetre for terrestrial heights.
pub fn ecef_to_geodetic(ecef: Ecef) -> Geodetic {
    let p = ecef.x.hypot(ecef.y);
    let lon = ecef.y.atan2(ecef.x);

    let (sin_u, cos_u) = (ecef.z * WGS84_A).atan2(p * WGS84_B).sin_cos();
    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_u.powi(3))
        .atan2(p - WGS84_E2 * WGS84_A * cos_u.powi(3));

    let n = prime_vertical_radius(lat);
    let (sin_lat, cos_lat) = lat.sin_cos();
    // Near the poles p / cos(lat) is unstable; measure along z instead.
    let alt = if cos_lat.abs() > 1e-10 {
        p / cos_lat - n
    } else {
        ecef.z.abs() / sin_lat.abs() - n * (1.0 - WGS84_E2)
    };

    Geodetic::new(lat, lon, alt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {a} ~= {b}");
    }

    #[test]
    fn equator_points_lie_on_semi_major_axis() {
        let origin = geodetic_to_ecef(Geodetic::from_degrees(0.0, 0.0, 0.0));
        assert_close(origin.x, WGS84_A, 1e-6);
        assert_close(origin.z, 0.0, 1e-6);

        let east = geodetic_to_ecef(Geodetic::from_degrees(90.0, 0.0, 0.0));
        assert_close(east.x, 0.0, 1e-6);
        assert_close(east.y, WGS84_A, 1e-6);
    }

    #[test]
    fn north_pole_sits_on_semi_minor_axis() {
        let ecef = geodetic_to_ecef(Geodetic::from_degrees(0.0, 90.0, 0.0));
        assert_close(ecef.z, WGS84_B, 1e-6);
        assert_close(prime_vertical_radius(0.0), WGS84_A, 1e-9);
    }

    #[test]
    fn inverse_recovers_degrees_and_height() {
        for (lon, lat, alt) in [(116.39, 39.9, 45.0), (-73.98, 40.75, 1_200.0), (151.2, -33.86, -20.0)] {
            let geo = ecef_to_geodetic(geodetic_to_ecef(Geodetic::from_degrees(lon, lat, alt)));
            assert_close(geo.lon_deg(), lon, 1e-9);
            assert_close(geo.lat_deg(), lat, 1e-8);
            assert_close(geo.alt_m, alt, 1e-3);
        }
    }

    #[test]
    fn inverse_is_stable_at_the_pole() {
        let geo = ecef_to_geodetic(geodetic_to_ecef(Geodetic::from_degrees(0.0, 90.0, 250.0)));
        assert_close(geo.lat_deg(), 90.0, 1e-9);
        assert_close(geo.alt_m, 250.0, 1e-4);
    }
}
