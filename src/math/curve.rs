use cgmath::prelude::*;
use crate::util::Interval;
use super::{heading, truncate_angle, Point2d, Pose, Vector2d};
pub use offset::OffsetCurve;

mod offset;

/// A parametric curve in 2D space.
pub trait ParametricCurve2d {
    /// Samples the parametric curve.
    fn sample(&self, t: f64) -> Point2d;

    /// Returns the minimum and maximum t-values that define the bounds of the curve.
    fn bounds(&self) -> Interval<f64>;

    /// Samples the derivative of the parametric curve.
    ///
    /// The default implementation approximates the derivative by sampling
    /// two very nearby points along the curve.
    fn sample_dt(&self, t: f64) -> Vector2d {
        let delta = self.bounds().length() * 0.0001;
        let p1 = self.sample(t);
        let p2 = self.sample(t + delta);
        (p2 - p1) / delta
    }

    /// Samples the curve's position and its tangent heading in `[0, 2π)`.
    fn sample_pose(&self, t: f64) -> Pose {
        let angle = truncate_angle(heading(self.sample_dt(t)), std::f64::consts::TAU);
        Pose::from_point(self.sample(t), angle)
    }

    /// Approximates the curve with `segments` straight segments.
    fn polyline(&self, segments: usize) -> Vec<Point2d> {
        let segments = segments.max(1);
        let bounds = self.bounds();
        (0..=segments)
            .map(|i| self.sample(bounds.lerp(i as f64 / segments as f64)))
            .collect()
    }
}

impl<T: ParametricCurve2d + ?Sized> ParametricCurve2d for &T {
    fn sample(&self, t: f64) -> Point2d {
        (**self).sample(t)
    }

    fn bounds(&self) -> Interval<f64> {
        (**self).bounds()
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        (**self).sample_dt(t)
    }

    fn sample_pose(&self, t: f64) -> Pose {
        (**self).sample_pose(t)
    }
}

/// Approximates the arc length of a curve by summing `segments` chords.
pub fn curve_length(curve: &impl ParametricCurve2d, segments: usize) -> f64 {
    curve
        .polyline(segments)
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).magnitude())
        .sum()
}
