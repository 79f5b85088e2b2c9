//! Geographic coordinates, the globe mapping and seam-aware interpolation

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Render-space units added per meter of altitude (30 km lifts a point by
/// 0.15 globe radii).
pub const ALTITUDE_EXAGGERATION: f64 = 5.0e-6;

/// Radius of the globe model in render space
pub const GLOBE_RADIUS: f64 = 1.0;

/// A tracked object's reported location. Altitude is in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.alt.is_finite()
    }
}

/// Map latitude/longitude (degrees) onto a sphere of `base_radius`, lifted by
/// `altitude` meters. The polar axis is +Y; longitude is shifted by 180° so the
/// prime meridian faces -X.
pub fn map_lat_lon(lat: f64, lon: f64, base_radius: f64, altitude: f64) -> Point3<f64> {
    let phi = (90.0 - lat).to_radians();
    let theta = (lon + 180.0).to_radians();
    let r = base_radius + altitude * ALTITUDE_EXAGGERATION;

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    Point3::new(
        -(r * sin_phi * cos_theta),
        r * cos_phi,
        r * sin_phi * sin_theta,
    )
}

/// Map a coordinate (including its altitude) into render space
#[inline]
pub fn map_to_position(coord: &Coordinate, base_radius: f64) -> Point3<f64> {
    map_lat_lon(coord.lat, coord.lon, base_radius, coord.alt)
}

/// Shortest signed longitude step from `from` to `to`, in degrees.
#[inline]
pub fn shortest_lon_delta(from: f64, to: f64) -> f64 {
    let mut delta = to - from;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    delta
}

/// Wrap a longitude into [-180, 180]. Values already in range are untouched,
/// so both ±180 survive as given.
#[inline]
pub fn normalize_lon(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Interpolate between two fixes. Latitude and altitude are linear; longitude
/// takes the short way around, crossing the antimeridian when that is shorter.
///
/// `t` is not clamped: values outside [0, 1] extrapolate.
pub fn interpolate(a: &Coordinate, b: &Coordinate, t: f64) -> Coordinate {
    let lon = if t == 1.0 {
        // Land exactly on the target fix instead of a + (b - a).
        b.lon
    } else {
        normalize_lon(a.lon + shortest_lon_delta(a.lon, b.lon) * t)
    };

    Coordinate {
        lat: a.lat + (b.lat - a.lat) * t,
        lon,
        alt: a.alt + (b.alt - a.alt) * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lon_distance(a: f64, b: f64) -> f64 {
        shortest_lon_delta(a, b).abs()
    }

    #[test]
    fn seam_crossing_takes_short_path() {
        let a = Coordinate::new(0.0, 170.0, 0.0);
        let b = Coordinate::new(0.0, -170.0, 0.0);
        let mid = interpolate(&a, &b, 0.5);
        assert!((mid.lon.abs() - 180.0).abs() < 1e-9, "got {}", mid.lon);

        let quarter = interpolate(&a, &b, 0.25);
        assert!((quarter.lon - 175.0).abs() < 1e-9);
        let three_quarters = interpolate(&a, &b, 0.75);
        assert!((three_quarters.lon + 175.0).abs() < 1e-9);
    }

    #[test]
    fn lat_and_alt_are_linear() {
        let a = Coordinate::new(-10.0, 20.0, 1_000.0);
        let b = Coordinate::new(30.0, 40.0, 21_000.0);
        let c = interpolate(&a, &b, 0.25);
        assert!((c.lat - 0.0).abs() < 1e-12);
        assert!((c.lon - 25.0).abs() < 1e-12);
        assert!((c.alt - 6_000.0).abs() < 1e-9);
    }

    #[test]
    fn extrapolates_outside_unit_range() {
        let a = Coordinate::new(0.0, 0.0, 0.0);
        let b = Coordinate::new(10.0, 10.0, 100.0);
        let c = interpolate(&a, &b, 2.0);
        assert!((c.lat - 20.0).abs() < 1e-12);
        assert!((c.lon - 20.0).abs() < 1e-12);
        assert!((c.alt - 200.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_lon_wraps() {
        assert_eq!(normalize_lon(190.0), -170.0);
        assert_eq!(normalize_lon(-190.0), 170.0);
        assert_eq!(normalize_lon(180.0), 180.0);
        assert_eq!(normalize_lon(-180.0), -180.0);
        assert_eq!(normalize_lon(540.0), 180.0);
        assert_eq!(normalize_lon(45.0), 45.0);
    }

    #[test]
    fn pole_ignores_longitude() {
        for lon in [-180.0, -90.0, 0.0, 45.0, 180.0] {
            let p = map_lat_lon(90.0, lon, 2.0, 0.0);
            assert!(p.x.abs() < 1e-12 && p.z.abs() < 1e-12);
            assert!((p.y - 2.0).abs() < 1e-12);
        }
        let south = map_lat_lon(-90.0, 33.0, 1.0, 0.0);
        assert!((south.y + 1.0).abs() < 1e-12);
    }

    #[test]
    fn prime_meridian_faces_negative_x() {
        let p = map_lat_lon(0.0, 0.0, 1.0, 0.0);
        // theta = 180°: -(cos 180°) = +1
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn altitude_lifts_radius() {
        let ground = map_lat_lon(12.0, 34.0, 1.0, 0.0);
        let high = map_lat_lon(12.0, 34.0, 1.0, 20_000.0);
        let expected = 1.0 + 20_000.0 * ALTITUDE_EXAGGERATION;
        assert!((ground.coords.norm() - 1.0).abs() < 1e-12);
        assert!((high.coords.norm() - expected).abs() < 1e-12);
    }

    #[test]
    fn non_finite_input_propagates() {
        let p = map_to_position(&Coordinate::new(f64::NAN, 0.0, 0.0), 1.0);
        assert!(!p.x.is_finite());
        assert!(!Coordinate::new(0.0, f64::INFINITY, 0.0).is_finite());
    }

    proptest! {
        #[test]
        fn endpoints_are_exact(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let a = Coordinate::new(lat1, lon1, 0.0);
            let b = Coordinate::new(lat2, lon2, 0.0);
            let start = interpolate(&a, &b, 0.0);
            let end = interpolate(&a, &b, 1.0);
            prop_assert_eq!(start.lon, lon1);
            prop_assert_eq!(end.lon, lon2);
            prop_assert!((end.lat - lat2).abs() < 1e-9);
        }

        #[test]
        fn never_steps_more_than_half_a_turn(
            lon1 in -180.0f64..=180.0, lon2 in -180.0f64..=180.0, t in 0.0f64..1.0,
        ) {
            let a = Coordinate::new(0.0, lon1, 0.0);
            let b = Coordinate::new(0.0, lon2, 0.0);
            let c = interpolate(&a, &b, t);
            prop_assert!((-180.0..=180.0).contains(&c.lon));
            prop_assert!(lon_distance(lon1, c.lon) <= 180.0 * t + 1e-9);
            prop_assert!(lon_distance(c.lon, lon2) <= 180.0 * (1.0 - t) + 1e-9);
        }

        #[test]
        fn mapping_is_deterministic(
            lat in -90.0f64..=90.0, lon in -180.0f64..=180.0, alt in 0.0f64..40_000.0,
        ) {
            let c = Coordinate::new(lat, lon, alt);
            prop_assert_eq!(map_to_position(&c, 1.0), map_to_position(&c, 1.0));
        }
    }
}
