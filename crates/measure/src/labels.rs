use foundation::math::{Vec3, ecef_to_geodetic};

const KM: f64 = 1000.0;
const KM2: f64 = 1_000_000.0;

/// `"12.34 m"` below a kilometer, `"1.23 km"` from there on.
pub fn format_distance(meters: f64) -> String {
    if meters >= KM {
        format!("{:.2} km", meters / KM)
    } else {
        format!("{meters:.2} m")
    }
}

pub fn total_distance_text(meters: f64) -> String {
    format!("Total: {}", format_distance(meters))
}

pub fn area_text(square_meters: f64) -> String {
    if square_meters >= KM2 {
        format!("Area: {:.2} km²", square_meters / KM2)
    } else {
        format!("Area: {square_meters:.2} m²")
    }
}

/// Geodetic readout of a geocentric position.
pub fn position_text(position: Vec3) -> String {
    let g = ecef_to_geodetic(position.into());
    format!(
        "Lon: {:.6}\nLat: {:.6}\nHeight: {:.2}m",
        g.lon_deg(),
        g.lat_deg(),
        g.alt_m
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::{Geodetic, geodetic_to_ecef};

    #[test]
    fn distance_switches_unit_at_one_kilometer() {
        assert_eq!(format_distance(0.0), "0.00 m");
        assert_eq!(format_distance(999.994), "999.99 m");
        assert_eq!(format_distance(1000.0), "1.00 km");
        assert_eq!(format_distance(12_346.0), "12.35 km");
        assert_eq!(total_distance_text(250.5), "Total: 250.50 m");
    }

    #[test]
    fn area_switches_unit_at_one_square_kilometer() {
        assert_eq!(area_text(10_000.0), "Area: 10000.00 m²");
        assert_eq!(area_text(2_500_000.0), "Area: 2.50 km²");
    }

    #[test]
    fn position_text_has_three_lines() {
        let p = geodetic_to_ecef(Geodetic::from_degrees(116.391, 39.907, 52.25)).as_vec3();
        assert_eq!(
            position_text(p),
            "Lon: 116.391000\nLat: 39.907000\nHeight: 52.25m"
        );
    }
}
