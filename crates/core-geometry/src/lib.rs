//! Geometric primitives shared by the winding pipeline.
//!
//! Two coordinate systems coexist in a winding window:
//! * Cartesian `[x, y]` metres for rectangular windows (two-column cores).
//! * Polar `[radius, angle]` with the angle in **degrees** for toroidal
//!   windows. The radius is a plain distance from the window centre, so a
//!   polar coordinate converts to cartesian with the usual cos/sin pair.
//!
//! Invariants:
//! - All angle-returning helpers produce degrees in `[0, 360)`.
//! - `wound_distance_to_angle` and `angle_to_wound_distance` are inverses
//!   for any positive radius.
//! - Rounding helpers operate on decimal digits, not binary precision, so
//!   serialised output stays stable across platforms.

use std::f64::consts::PI;

/// Tolerance used across the pipeline when comparing lengths in metres.
pub const LENGTH_TOLERANCE: f64 = 1e-9;

/// A planar coordinate pair. Cartesian `[x, y]` or polar `[radius, angle]`
/// depending on the owning container's coordinate system.
pub type Point = [f64; 2];

/// Round to a fixed number of decimal digits.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Ceil to a fixed number of decimal digits.
pub fn ceil_to_decimals(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).ceil() / scale
}

/// Floor to a fixed number of decimal digits.
pub fn floor_to_decimals(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).floor() / scale
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees / 180.0 * PI
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians / PI * 180.0
}

/// Angle in degrees subtended by an arc of `distance` metres wound at
/// `radius` metres. The workhorse conversion for toroidal windows: a wire of
/// height `h` sitting at radius `r` occupies `h / r` radians of the window.
pub fn wound_distance_to_angle(distance: f64, radius: f64) -> f64 {
    distance / radius / PI * 180.0
}

/// Arc length in metres for `angle` degrees at `radius` metres.
pub fn angle_to_wound_distance(angle: f64, radius: f64) -> f64 {
    angle * PI / 180.0 * radius
}

/// `[radius, angle°]` -> `[x, y]`.
pub fn polar_to_cartesian(point: Point) -> Point {
    let angle = degrees_to_radians(point[1]);
    [point[0] * angle.cos(), point[0] * angle.sin()]
}

/// `[x, y]` -> `[radius, angle°]` with the angle wrapped into `[0, 360)`.
pub fn cartesian_to_polar(point: Point) -> Point {
    let radius = point[0].hypot(point[1]);
    let angle = normalize_angle(radians_to_degrees(point[1].atan2(point[0])));
    [radius, angle]
}

pub fn distance(a: Point, b: Point) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

/// Distance between two polar coordinates, measured in the cartesian plane.
pub fn polar_distance(a: Point, b: Point) -> f64 {
    distance(polar_to_cartesian(a), polar_to_cartesian(b))
}

/// Smallest absolute angular difference between two angles in degrees.
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_angle(a - b);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

pub fn circle_perimeter(radius: f64) -> f64 {
    2.0 * PI * radius
}

/// Ramanujan's closed-form approximation for the perimeter of an ellipse
/// with half-axes `a` and `b`. Exact to well under the length tolerance for
/// the aspect ratios a wound turn produces.
pub fn ellipse_perimeter(a: f64, b: f64) -> f64 {
    PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn angle_wrapping() {
        assert!(close(normalize_angle(-90.0), 270.0));
        assert!(close(normalize_angle(360.0), 0.0));
        assert!(close(normalize_angle(725.0), 5.0));
    }

    #[test]
    fn wound_distance_round_trip() {
        let angle = wound_distance_to_angle(0.001, 0.01);
        assert!(close(angle_to_wound_distance(angle, 0.01), 0.001));
    }

    #[test]
    fn polar_cartesian_round_trip() {
        let p = [0.0125, 135.0];
        let back = cartesian_to_polar(polar_to_cartesian(p));
        assert!(close(back[0], p[0]));
        assert!(close(back[1], p[1]));
    }

    #[test]
    fn full_window_is_360_degrees() {
        // A wire whose height equals the full perimeter subtends the whole window.
        let radius = 0.008;
        let perimeter = circle_perimeter(radius);
        assert!(close(wound_distance_to_angle(perimeter, radius), 360.0));
    }

    #[test]
    fn angular_difference_is_symmetric_and_short_way() {
        assert!(close(angular_difference(10.0, 350.0), 20.0));
        assert!(close(angular_difference(350.0, 10.0), 20.0));
        assert!(close(angular_difference(180.0, 0.0), 180.0));
    }

    #[test]
    fn ellipse_degenerates_to_circle() {
        let r = 0.004;
        assert!((ellipse_perimeter(r, r) - circle_perimeter(r)).abs() < 1e-12);
    }

    #[test]
    fn rounding_decimal_digits() {
        assert_eq!(round_to_decimals(0.123456789123, 9), 0.123456789);
        assert_eq!(ceil_to_decimals(0.1000000001, 6), 0.100001);
        assert_eq!(floor_to_decimals(0.1999999, 3), 0.199);
    }

    proptest! {
        #[test]
        fn prop_polar_round_trip(radius in 1e-6f64..1.0, angle in 0.0f64..360.0) {
            let back = cartesian_to_polar(polar_to_cartesian([radius, angle]));
            prop_assert!((back[0] - radius).abs() < 1e-9);
            // Angle comparison modulo the wrap at 360.
            prop_assert!(angular_difference(back[1], angle) < 1e-6);
        }

        #[test]
        fn prop_normalized_range(angle in -1e4f64..1e4) {
            let n = normalize_angle(angle);
            prop_assert!((0.0..360.0).contains(&n));
        }
    }
}
