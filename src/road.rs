use geometry::{GeometryParams, RoadGeometry};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::math::{
    angle_between, distance, offset_by_angle, BezierCurve2d, OffsetCurve, ParametricCurve2d,
    Point2d, Pose,
};

mod geometry;

/// The kind of traffic a lane carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneType {
    Car,
    Bike,
}

/// The direction of travel of a lane relative to the road's start → end sense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Whether traffic runs from the road's end towards its start.
    pub fn is_reversed(self) -> bool {
        self == Direction::Backward
    }
}

/// A single lane of a road.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    #[serde(rename = "type")]
    pub kind: LaneType,
    pub direction: Direction,
}

impl Lane {
    pub const fn new(kind: LaneType, direction: Direction) -> Self {
        Self { kind, direction }
    }

    pub const fn car(direction: Direction) -> Self {
        Self::new(LaneType::Car, direction)
    }

    pub const fn bike(direction: Direction) -> Self {
        Self::new(LaneType::Bike, direction)
    }
}

/// Which end of a road.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadEnd {
    Start,
    End,
}

/// The style of the line between two adjacent lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    Car,
    Bike,
}

/// Presentation metadata for the boundary between lane `i` and lane `i + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryClass {
    /// `Bike` if either neighbouring lane is a bike lane.
    pub kind: BoundaryKind,
    /// Whether the neighbouring lanes run in opposite directions.
    pub divider: bool,
}

/// Classifies every inner lane boundary. Independent of the road geometry.
pub fn classify_boundaries(lanes: &[Lane]) -> Vec<BoundaryClass> {
    lanes
        .iter()
        .tuple_windows()
        .map(|(a, b)| BoundaryClass {
            kind: if a.kind == LaneType::Bike || b.kind == LaneType::Bike {
                BoundaryKind::Bike
            } else {
                BoundaryKind::Car
            },
            divider: a.direction != b.direction,
        })
        .collect()
}

/// A directed road between two oriented endpoints.
///
/// The derived curves (centre line, lane boundaries, lane centre lines) are
/// rebuilt together whenever the lanes or endpoints change. A failed rebuild
/// leaves the road exactly as it was.
#[derive(Clone, Debug)]
pub struct Road {
    /// The road's name, unique within a network.
    name: String,
    /// The start point; its heading points into the road.
    start: Pose,
    /// The end point; its heading points into the road.
    end: Pose,
    /// The lanes, ordered from the outer edge of lane 0.
    lanes: Vec<Lane>,
    /// Speed limit of the road.
    speed_limit: f64,
    /// Parameters for rebuilding the geometry.
    params: GeometryParams,
    /// Curves derived from the fields above.
    geometry: RoadGeometry,
}

impl Road {
    /// Creates a road without lanes.
    pub fn new(name: impl Into<String>, start: Pose, end: Pose, config: &Config) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        let params = GeometryParams::from_config(config);
        let geometry = RoadGeometry::build(&start, &end, &[], &params)?;
        Ok(Self {
            name,
            start,
            end,
            lanes: vec![],
            speed_limit: config.speed_limit,
            params,
            geometry,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> Pose {
        self.start
    }

    pub fn end(&self) -> Pose {
        self.end
    }

    /// Gets an endpoint.
    pub fn endpoint(&self, end: RoadEnd) -> Pose {
        match end {
            RoadEnd::Start => self.start,
            RoadEnd::End => self.end,
        }
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Gets the lane at `index`.
    pub fn lane(&self, index: usize) -> Result<&Lane> {
        self.lanes.get(index).ok_or(Error::LaneOutOfRange {
            index,
            count: self.lanes.len(),
        })
    }

    /// The lanes running in the given direction.
    pub fn lanes_in_direction(&self, direction: Direction) -> impl Iterator<Item = &Lane> + '_ {
        self.lanes.iter().filter(move |lane| lane.direction == direction)
    }

    pub fn lane_width(&self) -> f64 {
        self.params.lane_width
    }

    /// The overall road width: lane width times lane count.
    pub fn width(&self) -> f64 {
        self.params.lane_width * self.lanes.len() as f64
    }

    pub fn half_width(&self) -> f64 {
        self.geometry.half_width
    }

    /// Approximate length of the centre line.
    pub fn length(&self) -> f64 {
        self.geometry.length
    }

    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    pub fn set_speed_limit(&mut self, speed_limit: f64) {
        self.speed_limit = speed_limit;
    }

    /// Renames the road.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        self.name = name;
        Ok(())
    }

    /// The quadratic centre line.
    pub fn centreline(&self) -> &BezierCurve2d {
        &self.geometry.centreline
    }

    /// The interior control point of the centre line.
    pub fn control_point(&self) -> Point2d {
        self.geometry.centreline.points()[1]
    }

    /// The centre line as an equivalent cubic `[start, c1, c2, end]`.
    pub fn cubic_control_points(&self) -> [Point2d; 4] {
        let cubic = self.geometry.centreline.elevate();
        let p = cubic.points();
        [p[0], p[1], p[2], p[3]]
    }

    /// The angle at the control point between the two endpoints. π for a straight road.
    pub fn bend_angle(&self) -> Result<f64> {
        let control = self.control_point();
        angle_between(
            distance(control, self.start.pos),
            distance(self.start.pos, self.end.pos),
            distance(control, self.end.pos),
        )
    }

    /// The curves between adjacent lanes; boundary `i` separates lane `i` and lane `i + 1`.
    pub fn boundaries(&self) -> Result<&[OffsetCurve<BezierCurve2d>]> {
        self.require_lanes()?;
        Ok(&self.geometry.boundaries)
    }

    /// Presentation class of each boundary, in the same order as [Road::boundaries].
    pub fn boundary_classes(&self) -> Vec<BoundaryClass> {
        classify_boundaries(&self.lanes)
    }

    /// The centre line of lane `index`.
    pub fn lane_curve(&self, index: usize) -> Result<&OffsetCurve<BezierCurve2d>> {
        self.lane(index)?;
        Ok(&self.geometry.lane_centres[index])
    }

    /// The centre lines of the bike lanes, in lane order.
    pub fn bike_centrelines(&self) -> impl Iterator<Item = &OffsetCurve<BezierCurve2d>> + '_ {
        self.lanes
            .iter()
            .zip(&self.geometry.lane_centres)
            .filter(|(lane, _)| lane.kind == LaneType::Bike)
            .map(|(_, curve)| curve)
    }

    /// Samples the road at a lateral `offset` from the outer edge of lane 0,
    /// `fraction` of the way from the start to the end.
    pub fn sample(&self, offset: f64, fraction: f64) -> Result<Pose> {
        self.require_lanes()?;
        let centre = match &self.geometry.baked {
            Some(table) => *table.sample(fraction),
            None => self.geometry.centreline.sample_pose(fraction),
        };
        Ok(Pose {
            pos: offset_by_angle(centre.pos, self.geometry.half_width, offset, centre.angle),
            angle: centre.angle,
        })
    }

    /// Whether samples are answered from a precomputed table.
    pub fn is_baked(&self) -> bool {
        self.geometry.baked.is_some()
    }

    /// Switches baked sampling on or off.
    pub fn set_baked(&mut self, baked: bool) {
        if baked == self.params.baked {
            return;
        }
        self.params.baked = baked;
        self.geometry.bake(&self.params);
    }

    /// Appends a lane.
    pub fn add_lane(&mut self, lane: Lane) -> Result<()> {
        let mut lanes = self.lanes.clone();
        lanes.push(lane);
        self.rebuild(self.start, self.end, lanes)
    }

    /// Removes the lane at `index`.
    pub fn remove_lane(&mut self, index: usize) -> Result<Lane> {
        let lane = *self.lane(index)?;
        let mut lanes = self.lanes.clone();
        lanes.remove(index);
        self.rebuild(self.start, self.end, lanes)?;
        Ok(lane)
    }

    /// Replaces every lane at once.
    pub fn set_lanes(&mut self, lanes: Vec<Lane>) -> Result<()> {
        self.rebuild(self.start, self.end, lanes)
    }

    /// Moves one endpoint.
    pub fn set_endpoint(&mut self, end: RoadEnd, pose: Pose) -> Result<()> {
        let (start, finish) = match end {
            RoadEnd::Start => (pose, self.end),
            RoadEnd::End => (self.start, pose),
        };
        self.rebuild(start, finish, self.lanes.clone())
    }

    pub fn set_start(&mut self, pose: Pose) -> Result<()> {
        self.set_endpoint(RoadEnd::Start, pose)
    }

    pub fn set_end(&mut self, pose: Pose) -> Result<()> {
        self.set_endpoint(RoadEnd::End, pose)
    }

    /// Rebuilds every derived curve, then commits the new state in one go.
    fn rebuild(&mut self, start: Pose, end: Pose, lanes: Vec<Lane>) -> Result<()> {
        let geometry = RoadGeometry::build(&start, &end, &lanes, &self.params)?;
        debug!(
            "rebuilt road '{}': {} lanes, width {}, length {:.1}",
            self.name,
            lanes.len(),
            2.0 * geometry.half_width,
            geometry.length
        );
        self.start = start;
        self.end = end;
        self.lanes = lanes;
        self.geometry = geometry;
        Ok(())
    }

    fn require_lanes(&self) -> Result<()> {
        if self.lanes.is_empty() {
            Err(Error::NoLanes)
        } else {
            Ok(())
        }
    }
}
