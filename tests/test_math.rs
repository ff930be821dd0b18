use arena_shooter::math::*;

use approx::assert_relative_eq;
use std::f32::consts::{FRAC_PI_2, PI};

#[test]
fn clamp_inside_and_outside() {
    assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
    assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
    assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
}

#[test]
fn clamp_inverted_range_prefers_lower_bound() {
    assert_eq!(clamp(3.0, 8.0, 2.0), 8.0);
}

#[test]
fn angle_points_from_a_to_b() {
    assert_relative_eq!(angle(0.0, 0.0, 1.0, 0.0), 0.0);
    assert_relative_eq!(angle(0.0, 0.0, 0.0, 1.0), FRAC_PI_2);
    assert_relative_eq!(angle(0.0, 0.0, -1.0, 0.0), PI);
}

#[test]
fn normalize_unit_length() {
    let (x, y) = normalize(3.0, 4.0).unwrap();
    assert_relative_eq!(x, 0.6);
    assert_relative_eq!(y, 0.8);
}

#[test]
fn normalize_zero_is_none() {
    assert!(normalize(0.0, 0.0).is_none());
}

#[test]
fn dist2_is_squared() {
    assert_eq!(dist2(0.0, 0.0, 3.0, 4.0), 25.0);
}

#[test]
fn circles_touching_overlap() {
    assert!(circles_overlap(0.0, 0.0, 2.0, 5.0, 0.0, 3.0));
    assert!(!circles_overlap(0.0, 0.0, 2.0, 5.1, 0.0, 3.0));
}
