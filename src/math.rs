//! Mathematical structs and functions.

use cgmath::{Point2, Vector2};
use serde::{Deserialize, Serialize};
pub use util::*;
pub use lut::LookupTable;
pub use curve::{curve_length, OffsetCurve, ParametricCurve2d};
pub use bezier::{de_casteljau, BezierCurve2d};
pub use solver::{control_point, road_curve};

mod util;
mod lut;
mod curve;
mod bezier;
mod solver;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// A position together with a heading in radians.
///
/// Headings follow the convention of [heading]: an angle of 0 points along +y,
/// and π/2 points along +x.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Point2d,
    pub angle: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, angle: f64) -> Self {
        Self {
            pos: Point2d::new(x, y),
            angle,
        }
    }

    pub const fn from_point(pos: Point2d, angle: f64) -> Self {
        Self { pos, angle }
    }

    /// Whether both poses sit at exactly the same coordinates, ignoring heading.
    pub fn equal_coords(&self, other: &Pose) -> bool {
        self.pos == other.pos
    }

    /// Linearly interpolates position and heading. No wraparound handling.
    pub fn lerp(&self, other: &Pose, t: f64) -> Pose {
        Pose {
            pos: lerp_point(self.pos, other.pos, t),
            angle: lerp(self.angle, other.angle, t),
        }
    }
}
