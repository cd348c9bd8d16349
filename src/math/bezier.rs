use cgmath::prelude::*;
use smallvec::SmallVec;
use crate::error::{Error, Result};
use crate::util::Interval;
use super::{heading, lerp_point, truncate_angle, Point2d, Pose, Vector2d};
use super::curve::ParametricCurve2d;

type ControlPoints = SmallVec<[Point2d; 4]>;

/// Evaluates the Bézier curve defined by `points` at `t` with de Casteljau's algorithm.
///
/// The returned heading is the tangent direction `atan2(Δx, Δy)` of the final
/// pair of interpolated points, wrapped into `[0, 2π)`.
pub fn de_casteljau(points: &[Point2d], t: f64) -> Result<Pose> {
    if points.len() < 2 {
        return Err(Error::TooFewControlPoints { count: points.len() });
    }
    let [a, b] = reduce(SmallVec::from_slice(points), t);
    Ok(Pose::from_point(
        lerp_point(a, b, t),
        truncate_angle(heading(b - a), std::f64::consts::TAU),
    ))
}

/// Repeatedly interpolates adjacent pairs until two points remain.
fn reduce(points: ControlPoints, t: f64) -> [Point2d; 2] {
    if points.len() == 2 {
        return [points[0], points[1]];
    }
    let next = points
        .windows(2)
        .map(|pair| lerp_point(pair[0], pair[1], t))
        .collect();
    reduce(next, t)
}

/// A Bézier curve of arbitrary degree.
#[derive(Clone, Debug, PartialEq)]
pub struct BezierCurve2d {
    points: ControlPoints,
}

impl BezierCurve2d {
    /// Creates a curve from two or more control points.
    pub fn new(points: &[Point2d]) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::TooFewControlPoints { count: points.len() });
        }
        Ok(Self { points: SmallVec::from_slice(points) })
    }

    pub fn quadratic(start: Point2d, control: Point2d, end: Point2d) -> Self {
        Self { points: SmallVec::from_slice(&[start, control, end]) }
    }

    pub fn line(start: Point2d, end: Point2d) -> Self {
        Self { points: SmallVec::from_slice(&[start, end]) }
    }

    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// The degree of the curve.
    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    /// Raises the curve by one degree without changing its shape.
    ///
    /// A quadratic `[p0, c, p2]` becomes the cubic
    /// `[p0, p0 + 2/3 (c - p0), p2 + 2/3 (c - p2), p2]`.
    pub fn elevate(&self) -> Self {
        let n = self.points.len() as f64;
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        let inner = self.points.windows(2).enumerate().map(|(i, pair)| {
            let f = (i + 1) as f64 / n;
            Point2d::from_vec(pair[0].to_vec() * f + pair[1].to_vec() * (1.0 - f))
        });
        let points = std::iter::once(first).chain(inner).chain(std::iter::once(last)).collect();
        Self { points }
    }
}

impl ParametricCurve2d for BezierCurve2d {
    fn sample(&self, t: f64) -> Point2d {
        let [a, b] = reduce(self.points.clone(), t);
        lerp_point(a, b, t)
    }

    fn bounds(&self) -> Interval<f64> {
        Interval { min: 0.0, max: 1.0 }
    }

    /// The derivative is the degree times the difference of the final de Casteljau pair.
    fn sample_dt(&self, t: f64) -> Vector2d {
        let [a, b] = reduce(self.points.clone(), t);
        (b - a) * self.degree() as f64
    }

    fn sample_pose(&self, t: f64) -> Pose {
        let [a, b] = reduce(self.points.clone(), t);
        Pose::from_point(
            lerp_point(a, b, t),
            truncate_angle(heading(b - a), std::f64::consts::TAU),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use crate::error::ErrorKind;

    fn sample_points() -> [Point2d; 4] {
        [
            Point2d::new(10.0, 10.0),
            Point2d::new(60.0, 40.0),
            Point2d::new(100.0, 45.0),
            Point2d::new(140.0, -20.0),
        ]
    }

    #[test]
    fn endpoints_are_interpolated() {
        for n in 2..=4 {
            let points = &sample_points()[..n];
            let first = de_casteljau(points, 0.0).unwrap();
            let last = de_casteljau(points, 1.0).unwrap();
            assert_eq!(first.pos, points[0]);
            assert_eq!(last.pos, points[n - 1]);
        }
    }

    #[test]
    fn evaluation_is_continuous() {
        let curve = BezierCurve2d::new(&sample_points()).unwrap();
        let mut prev = curve.sample(0.0);
        for i in 1..=1000 {
            let next = curve.sample(i as f64 / 1000.0);
            assert!((next - prev).magnitude() < 1.0);
            prev = next;
        }
    }

    #[test]
    fn heading_follows_tangent() {
        let line = BezierCurve2d::line(Point2d::new(0.0, 0.0), Point2d::new(100.0, 0.0));
        assert_approx_eq!(line.sample_pose(0.3).angle, std::f64::consts::FRAC_PI_2);
        let down = de_casteljau(&[Point2d::new(0.0, 0.0), Point2d::new(0.0, 50.0)], 0.5).unwrap();
        assert_approx_eq!(down.angle, 0.0);
        let up = de_casteljau(&[Point2d::new(0.0, 50.0), Point2d::new(0.0, 0.0)], 0.5).unwrap();
        assert_approx_eq!(up.angle, std::f64::consts::PI);
    }

    #[test]
    fn rejects_too_few_points() {
        let err = de_casteljau(&[Point2d::new(1.0, 1.0)], 0.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(BezierCurve2d::new(&[]).is_err());
    }

    #[test]
    fn matches_closed_form_quadratic() {
        let [p0, p1, p2, _] = sample_points();
        let curve = BezierCurve2d::quadratic(p0, p1, p2);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let t1 = 1.0 - t;
            let expected = p0.to_vec() * (t1 * t1) + p1.to_vec() * (2.0 * t1 * t) + p2.to_vec() * (t * t);
            let expected_dt = (p1 - p0) * (2.0 * t1) + (p2 - p1) * (2.0 * t);
            let p = curve.sample(t);
            let dt = curve.sample_dt(t);
            assert_approx_eq!(p.x, expected.x);
            assert_approx_eq!(p.y, expected.y);
            assert_approx_eq!(dt.x, expected_dt.x);
            assert_approx_eq!(dt.y, expected_dt.y);
        }
    }

    #[test]
    fn elevation_keeps_shape() {
        let [p0, p1, p2, _] = sample_points();
        let quadratic = BezierCurve2d::quadratic(p0, p1, p2);
        let cubic = quadratic.elevate();
        assert_eq!(cubic.degree(), 3);
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            let a = quadratic.sample(t);
            let b = cubic.sample(t);
            assert_approx_eq!(a.x, b.x);
            assert_approx_eq!(a.y, b.y);
        }
    }
}
