use crate::math::{offset_by_angle, Point2d, Pose, Vector2d};
use crate::util::Interval;

use super::ParametricCurve2d;

/// A curve running parallel to a reference curve.
///
/// Points are shifted by [offset_by_angle], so `offset` is measured from the
/// outer edge of a road `2 * half_width` wide whose centre line is `inner`.
#[derive(Clone, Debug)]
pub struct OffsetCurve<C>
    where C: ParametricCurve2d
{
    inner: C,
    half_width: f64,
    offset: f64,
}

impl<C> OffsetCurve<C>
    where C: ParametricCurve2d
{
    pub fn new(curve: C, half_width: f64, offset: f64) -> Self {
        Self { inner: curve, half_width, offset }
    }
}

impl<C> ParametricCurve2d for OffsetCurve<C>
    where C: ParametricCurve2d
{
    fn sample(&self, t: f64) -> Point2d {
        self.sample_pose(t).pos
    }

    fn bounds(&self) -> Interval<f64> {
        self.inner.bounds()
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        self.inner.sample_dt(t)
    }

    fn sample_pose(&self, t: f64) -> Pose {
        let centre = self.inner.sample_pose(t);
        Pose {
            pos: offset_by_angle(centre.pos, self.half_width, self.offset, centre.angle),
            angle: centre.angle,
        }
    }
}
