//! Derivation of the interior control point of a road curve.

use cgmath::prelude::*;
use log::warn;

use super::{direction, BezierCurve2d, Point2d, Pose};
use crate::error::{Error, Result};

/// Below this, tangents are treated as parallel and lengths as zero.
const EPSILON: f64 = 1e-9;

/// Finds the point where the tangent rays of two oriented endpoints meet.
///
/// Each endpoint's heading points into the road: the ray from `start` runs
/// along `direction(start.angle)`, the ray from `end` along
/// `direction(end.angle)`. The two rays are intersected by solving
/// `start + t1 * dir_start = end + t2 * dir_end`.
///
/// Endpoints facing each other along a straight line have parallel tangents;
/// the midpoint is returned for them. Any other pair of parallel tangents, a
/// non-finite solution, or a solution behind or on either endpoint is an error.
pub fn control_point(start: &Pose, end: &Pose) -> Result<Point2d> {
    let chord = end.pos - start.pos;
    let chord_len = chord.magnitude();
    if chord_len < EPSILON {
        return Err(Error::CoincidentEndpoints);
    }

    let dir_p = direction(start.angle);
    let dir_q = direction(end.angle);
    let det = dir_p.perp_dot(dir_q);

    if det.abs() < EPSILON {
        let collinear = chord.perp_dot(dir_p).abs() < EPSILON * chord_len;
        let facing = dir_p.dot(chord) > 0.0 && dir_q.dot(chord) < 0.0;
        return if collinear && facing {
            Ok(start.pos.midpoint(end.pos))
        } else {
            Err(Error::ParallelTangents)
        };
    }

    let t1 = chord.perp_dot(dir_q) / det;
    let t2 = chord.perp_dot(dir_p) / det;
    if !(t1.is_finite() && t2.is_finite()) {
        return Err(Error::NonFiniteControlPoint);
    }
    if t1 < -EPSILON || t2 < -EPSILON {
        return Err(Error::ControlPointBehind { t1, t2 });
    }
    // A control point on an endpoint leaves that end without a tangent
    let tolerance = EPSILON * chord_len;
    if t1 <= tolerance || t2 <= tolerance {
        return Err(Error::ControlPointAtEndpoint { t1, t2 });
    }

    Ok(start.pos + dir_p * t1)
}

/// Builds the quadratic centre line curve between two oriented endpoints.
pub fn road_curve(start: &Pose, end: &Pose) -> Result<BezierCurve2d> {
    let control = control_point(start, end).map_err(|err| {
        warn!("no curve between {:?} and {:?}: {}", start, end, err);
        err
    })?;
    Ok(BezierCurve2d::quadratic(start.pos, control, end.pos))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::math::{angle_difference, ParametricCurve2d};
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn straight_road_uses_midpoint() {
        let start = Pose::new(0.0, 0.0, 0.0);
        let end = Pose::new(0.0, 300.0, PI);
        let control = control_point(&start, &end).unwrap();
        assert_approx_eq!(control.x, 0.0);
        assert_approx_eq!(control.y, 150.0);
    }

    #[test]
    fn right_angle_corner() {
        let start = Pose::new(0.0, 0.0, FRAC_PI_2);
        let end = Pose::new(100.0, 100.0, PI);
        let control = control_point(&start, &end).unwrap();
        assert_approx_eq!(control.x, 100.0);
        assert_approx_eq!(control.y, 0.0);

        let curve = road_curve(&start, &end).unwrap();
        let first = curve.sample_pose(0.0);
        let last = curve.sample_pose(1.0);
        assert_approx_eq!(first.angle, FRAC_PI_2);
        assert_approx_eq!(angle_difference(last.angle, 0.0), 0.0);
        assert_approx_eq!(last.pos.x, 100.0);
        assert_approx_eq!(last.pos.y, 100.0);
    }

    #[test]
    fn endpoint_tangents_are_respected() {
        let start = Pose::new(50.0, 50.0, PI / 4.0);
        let end = Pose::new(500.0, 200.0, 1.5 * PI);
        let control = control_point(&start, &end).unwrap();
        assert_approx_eq!(control.x, 200.0);
        assert_approx_eq!(control.y, 200.0);
        let curve = road_curve(&start, &end).unwrap();
        assert_approx_eq!(curve.sample_pose(0.0).angle, PI / 4.0);
        let arrive = curve.sample_pose(1.0).angle;
        assert_approx_eq!(arrive, PI / 2.0);
    }

    #[test]
    fn parallel_offset_tangents_are_degenerate() {
        let start = Pose::new(0.0, 0.0, 0.0);
        let end = Pose::new(50.0, 300.0, PI);
        let err = control_point(&start, &end).unwrap_err();
        assert!(matches!(err, Error::ParallelTangents));
        assert_eq!(err.kind(), ErrorKind::DegenerateGeometry);

        let same = Pose::new(0.0, 300.0, 0.0);
        assert!(matches!(control_point(&start, &same), Err(Error::ParallelTangents)));
    }

    #[test]
    fn control_point_behind_is_flagged() {
        let start = Pose::new(0.0, 0.0, 1.5 * PI);
        let end = Pose::new(100.0, 100.0, PI);
        let err = control_point(&start, &end).unwrap_err();
        assert!(matches!(err, Error::ControlPointBehind { .. }));
    }

    #[test]
    fn control_point_on_endpoint_is_flagged() {
        // The end tangent ray passes straight through the start point
        let start = Pose::new(0.0, 0.0, 0.0);
        let end = Pose::new(100.0, 0.0, 1.5 * PI);
        let err = control_point(&start, &end).unwrap_err();
        assert!(matches!(err, Error::ControlPointAtEndpoint { .. }));
        assert_eq!(err.kind(), ErrorKind::DegenerateGeometry);
        assert!(road_curve(&start, &end).is_err());
    }

    #[test]
    fn coincident_endpoints() {
        let p = Pose::new(10.0, 10.0, 0.0);
        let q = Pose::new(10.0, 10.0, PI);
        assert!(matches!(control_point(&p, &q), Err(Error::CoincidentEndpoints)));
    }
}
