use std::f64::consts::{FRAC_PI_4, PI, TAU};

use super::{Point2d, Vector2d};
use crate::error::{Error, Result};
use cgmath::prelude::*;

/// Tolerance for `acos` arguments that overshoot ±1 through rounding alone.
const ACOS_SLACK: f64 = 1e-9;

/// Linearly interpolates between `a` and `b`. Extrapolates outside `[0, 1]`.
#[inline(always)]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Linearly interpolates between two points.
///
/// Weighted form, so `t = 0` and `t = 1` return `a` and `b` exactly.
#[inline(always)]
pub fn lerp_point(a: Point2d, b: Point2d, t: f64) -> Point2d {
    Point2d::from_vec(a.to_vec() * (1.0 - t) + b.to_vec() * t)
}

/// Wraps an angle into `[0, period)`.
///
/// `period` must be positive.
pub fn truncate_angle(angle: f64, period: f64) -> f64 {
    debug_assert!(period > 0.0, "period must be positive");
    let wrapped = angle.rem_euclid(period);
    // `rem_euclid` rounds tiny negative inputs up to exactly `period`
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// The signed shortest rotation from `b` to `a`, in `(-π, π]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = truncate_angle(a - b, TAU);
    if diff > PI {
        diff - TAU
    } else {
        diff
    }
}

/// The heading of a vector: `atan2(x, y)`, so +y is 0 and +x is π/2.
#[inline(always)]
pub fn heading(v: Vector2d) -> f64 {
    v.x.atan2(v.y)
}

/// The unit vector for a heading. Inverse of [heading].
#[inline(always)]
pub fn direction(angle: f64) -> Vector2d {
    Vector2d::new(angle.sin(), angle.cos())
}

/// Angle at the apex `r` of a triangle, given the lengths of its three sides.
///
/// # Parameters
/// * `rp` - Distance from r to p
/// * `pq` - Distance from p to q
/// * `rq` - Distance from r to q
pub fn angle_between(rp: f64, pq: f64, rq: f64) -> Result<f64> {
    let cos = (rp * rp + rq * rq - pq * pq) / (2.0 * rp * rq);
    if !cos.is_finite() || cos.abs() > 1.0 + ACOS_SLACK {
        return Err(Error::TriangleInequality { rp, pq, rq });
    }
    Ok(cos.clamp(-1.0, 1.0).acos())
}

/// Shifts a point sideways from a reference line with the given heading.
///
/// The shift is `half_width - offset` along `(cos(angle), -sin(angle))`,
/// so `offset` is measured from the outer edge of lane 0.
pub fn offset_by_angle(point: Point2d, half_width: f64, offset: f64, angle: f64) -> Point2d {
    let length = half_width - offset;
    if length == 0.0 {
        return point;
    }
    Point2d::new(point.x + angle.cos() * length, point.y - angle.sin() * length)
}

pub fn distance(p: Point2d, q: Point2d) -> f64 {
    p.distance(q)
}

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (PI / 180.0)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / PI)
}

pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Rounds a value to the nearest multiple of `grid`.
pub fn snap(value: f64, grid: f64) -> f64 {
    (value / grid).round() * grid
}

/// Snaps an angle to the closest multiple of π/4 within `tolerance`.
/// The result is always in `[0, 2π)`.
pub fn snap_angle(angle: f64, tolerance: f64) -> f64 {
    let angle = truncate_angle(angle, TAU);
    (0..=8)
        .map(|i| i as f64 * FRAC_PI_4)
        .find(|target| approx_eq(angle, *target, tolerance))
        .map(|target| truncate_angle(target, TAU))
        .unwrap_or(angle)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    #[test]
    fn truncate_angle_stays_in_range() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Lanes are only ever twenty wide.");
        for _ in 0..1000 {
            let angle = rng.gen_range(-1000.0..1000.0);
            let period = rng.gen_range(0.01..10.0);
            let wrapped = truncate_angle(angle, period);
            assert!((0.0..period).contains(&wrapped), "{angle} % {period} = {wrapped}");
        }
        assert_eq!(truncate_angle(-1e-20, TAU), 0.0);
        assert_approx_eq!(truncate_angle(3.5 * PI, PI), 0.5 * PI);
    }

    #[test]
    fn angle_difference_takes_short_way() {
        assert_approx_eq!(angle_difference(deg_to_rad(10.0), deg_to_rad(350.0)), deg_to_rad(20.0));
        assert_approx_eq!(angle_difference(deg_to_rad(350.0), deg_to_rad(10.0)), deg_to_rad(-20.0));
        assert_approx_eq!(angle_difference(TAU - 1e-12, 0.0), 0.0);
    }

    #[test]
    fn heading_round_trips() {
        for deg in [0.0, 45.0, 90.0, 135.0, 180.0, 270.0] {
            let angle = deg_to_rad(deg);
            assert_approx_eq!(truncate_angle(heading(direction(angle)), TAU), angle);
        }
        assert_approx_eq!(heading(Vector2d::new(1.0, 0.0)), PI / 2.0);
    }

    #[test]
    fn angle_between_triangles() {
        assert_approx_eq!(angle_between(3.0, 5.0, 4.0).unwrap(), PI / 2.0);
        assert_approx_eq!(angle_between(1.0, 1.0, 1.0).unwrap(), PI / 3.0);
        // Collinear sides round to exactly π
        assert_approx_eq!(angle_between(150.0, 300.0, 150.0).unwrap(), PI);
        assert!(angle_between(1.0, 5.0, 1.0).is_err());
        assert!(angle_between(0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn offset_by_angle_projects_sideways() {
        let p = Point2d::new(10.0, 10.0);
        assert_eq!(offset_by_angle(p, 20.0, 20.0, 1.3), p);
        let shifted = offset_by_angle(p, 20.0, 10.0, 0.0);
        assert_approx_eq!(shifted.x, 20.0);
        assert_approx_eq!(shifted.y, 10.0);
        let shifted = offset_by_angle(p, 20.0, 30.0, PI / 2.0);
        assert_approx_eq!(shifted.x, 10.0);
        assert_approx_eq!(shifted.y, 20.0);
    }

    #[test]
    fn snapping() {
        assert_eq!(snap(124.0, 50.0), 100.0);
        assert_eq!(snap(126.0, 50.0), 150.0);
        assert_approx_eq!(snap_angle(deg_to_rad(88.0), PI / 16.0), PI / 2.0);
        assert_approx_eq!(snap_angle(deg_to_rad(-2.0), PI / 16.0), 0.0);
        assert_approx_eq!(snap_angle(deg_to_rad(70.0), PI / 16.0), deg_to_rad(70.0));
        assert_approx_eq!(rad_to_deg(deg_to_rad(33.0)), 33.0);
        assert_approx_eq!(distance(Point2d::new(0.0, 0.0), Point2d::new(3.0, 4.0)), 5.0);
    }
}
