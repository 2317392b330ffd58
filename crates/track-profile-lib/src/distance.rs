//! Great-circle distance on a spherical Earth

use geo::Point;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6371000.0;

/// Haversine distance between two WGS84 positions, in meters
///
/// # Arguments
/// * `lat1`, `lon1` - First position in degrees
/// * `lat2`, `lon2` - Second position in degrees
///
/// Never fails for finite input. The haversine term is clamped to `[0, 1]` so that
/// co-located and antipodal points cannot push the square roots out of their domain.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Haversine distance between two points stored as (x = longitude, y = latitude)
#[inline]
pub fn haversine_between(p1: &Point<f64>, p2: &Point<f64>) -> f64 {
    haversine_distance(p1.y(), p1.x(), p2.y(), p2.x())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_same_point_is_zero() {
        for &(lat, lon) in &[(0.0, 0.0), (51.5074, -0.1278), (-33.86, 151.2), (89.9, 179.9)] {
            assert_eq!(haversine_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ((35.6812, 139.7671), (34.7025, 135.4959)),
            ((0.0, 0.0), (0.0, 1.0)),
            ((-45.0, 170.0), (-44.0, -179.5)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            assert_relative_eq!(
                haversine_distance(lat1, lon1, lat2, lon2),
                haversine_distance(lat2, lon2, lat1, lon1),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(d, 111_195.0, max_relative = 1e-4);
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let d = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert_relative_eq!(d, std::f64::consts::PI * EARTH_RADIUS_M, max_relative = 1e-9);

        let poles = haversine_distance(90.0, 0.0, -90.0, 0.0);
        assert!(poles.is_finite());
    }

    #[test]
    fn test_tiny_separation_is_positive() {
        let d = haversine_distance(35.0, 139.0, 35.0, 139.000001);
        assert!(d > 0.0);
        assert!(d < 1.0);
    }

    #[test]
    fn test_point_helper_matches_degrees_form() {
        // geo points are (x = lon, y = lat)
        let a = Point::new(-0.1278, 51.5074);
        let b = Point::new(2.3522, 48.8566);
        assert_eq!(
            haversine_between(&a, &b),
            haversine_distance(51.5074, -0.1278, 48.8566, 2.3522)
        );
    }
}
