use std::f64::consts::{PI, TAU};
use std::time::Duration;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

pub use self::tween::{FrameClock, Tween};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::math::{truncate_angle, Pose};
use crate::road::Road;
use crate::{AgentId, RoadId};

mod tween;

/// Samples the pose of an agent travelling in lane `lane` of `road`,
/// `fraction` of the way along its direction of travel.
///
/// For a lane running against the road's start to end sense, the fraction is
/// measured from the road's end and the heading is turned around.
pub fn sample_pose(road: &Road, lane: usize, fraction: f64) -> Result<Pose> {
    let facing = road.lane(lane)?.direction.is_reversed();
    let lane_width = road.lane_width();
    let offset = lane as f64 * lane_width + 0.5 * lane_width;
    let fraction = if facing { 1.0 - fraction } else { fraction };
    let mut pose = road.sample(offset, fraction)?;
    if facing {
        pose.angle = truncate_angle(pose.angle + PI, TAU);
    }
    Ok(pose)
}

/// The kind of road user an agent represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    #[default]
    Car,
    Bike,
}

impl AgentKind {
    /// Body width and length.
    pub fn size(self) -> (f64, f64) {
        match self {
            AgentKind::Car => (16.0, 32.0),
            AgentKind::Bike => (7.0, 16.0),
        }
    }
}

/// Where an agent was first put on the network.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub road: RoadId,
    /// Index of the lane.
    pub lane: usize,
    /// Longitudinal fraction along the lane's direction of travel.
    pub fraction: f64,
    /// Initial speed.
    pub speed: f64,
    /// Whether the lane runs against the road's start to end sense.
    pub facing: bool,
}

/// One recorded frame of an agent's movement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStep {
    pub road: RoadId,
    /// Whether the agent travels from the road's end towards its start.
    pub reversed: bool,
    /// Longitudinal fraction along the direction of travel.
    pub fraction: f64,
    /// Distance from the agent's lane to the side of the road, as measured
    /// in the direction of travel.
    pub distance_to_side: f64,
}

/// A vehicle or bike placed on the network.
#[derive(Clone, Debug)]
pub struct Agent {
    /// The agent's ID
    pub(crate) id: AgentId,
    kind: AgentKind,
    /// The pose currently presented.
    pose: Pose,
    /// The pose the agent is moving towards, or resting at.
    target: Pose,
    /// The road the agent is on.
    road: Option<RoadId>,
    /// The initial placement, kept so the agent can be put back.
    placement: Option<Placement>,
    tween: Tween,
    clock: FrameClock,
    /// Time covered by one playback step at unit speed.
    step_interval: Duration,
}

impl Agent {
    pub(crate) fn new(id: AgentId, kind: AgentKind, config: &Config) -> Self {
        let tween = Tween::new(config.frame_rate);
        let clock = FrameClock::new(tween.frame_interval());
        Self {
            id,
            kind,
            pose: Pose::new(0.0, 0.0, 0.0),
            target: Pose::new(0.0, 0.0, 0.0),
            road: None,
            placement: None,
            tween,
            clock,
            step_interval: config.simulation_interval(),
        }
    }

    /// Gets the agent's ID.
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: AgentKind) {
        self.kind = kind;
    }

    /// The agent's body width and length.
    pub fn size(&self) -> (f64, f64) {
        self.kind.size()
    }

    /// The pose to present.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The pose the agent is moving towards, or resting at.
    pub fn target(&self) -> Pose {
        self.target
    }

    /// The ID of the road the agent is currently on.
    pub fn road_id(&self) -> Option<RoadId> {
        self.road
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    /// Whether the agent is part way through a move.
    pub fn is_moving(&self) -> bool {
        self.tween.is_running()
    }

    /// Puts the agent on lane `lane` of `road`, and remembers the placement.
    pub fn place(
        &mut self,
        road_id: RoadId,
        road: &Road,
        lane: usize,
        fraction: f64,
        speed: f64,
    ) -> Result<()> {
        let facing = road.lane(lane)?.direction.is_reversed();
        let pose = sample_pose(road, lane, fraction)?;
        self.placement = Some(Placement {
            road: road_id,
            lane,
            fraction,
            speed,
            facing,
        });
        self.road = Some(road_id);
        self.rest_at(pose);
        debug!("placed agent {:?} at {:?}", self.id, pose);
        Ok(())
    }

    /// Puts the agent back at its initial placement on `road`, which must be
    /// the road it was placed on. Used after the road's geometry changes.
    pub fn replace(&mut self, road: &Road) -> Result<()> {
        let placement = self.placement.ok_or(Error::AgentNotPlaced)?;
        let pose = sample_pose(road, placement.lane, placement.fraction)?;
        self.road = Some(placement.road);
        self.rest_at(pose);
        Ok(())
    }

    /// Removes the agent from the network, keeping its last pose.
    pub(crate) fn unplace(&mut self) {
        self.stop();
        self.road = None;
        self.placement = None;
    }

    /// Computes the pose for a playback step on `road`.
    pub fn next_position(step: &PlaybackStep, road: &Road) -> Result<Pose> {
        let lateral = step.distance_to_side + 0.5 * road.lane_width();
        let (offset, fraction) = if step.reversed {
            (road.width() - lateral, 1.0 - step.fraction)
        } else {
            (lateral, step.fraction)
        };
        let mut pose = road.sample(offset, fraction)?;
        if step.reversed {
            pose.angle = truncate_angle(pose.angle + PI, TAU);
        }
        Ok(pose)
    }

    /// Moves straight to the pose of a playback step.
    pub fn jump_to(&mut self, step: &PlaybackStep, road: &Road) -> Result<()> {
        let pose = Self::next_position(step, road)?;
        self.road = Some(step.road);
        self.rest_at(pose);
        Ok(())
    }

    /// Starts animating towards the pose of a playback step.
    ///
    /// The move lasts one playback interval divided by `speed`.
    pub fn simulate(&mut self, step: &PlaybackStep, road: &Road, speed: f64) -> Result<()> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(Error::InvalidSpeed(speed));
        }
        let duration = Duration::try_from_secs_f64(self.step_interval.as_secs_f64() / speed)
            .map_err(|_| Error::InvalidSpeed(speed))?;
        let pose = Self::next_position(step, road)?;
        self.clock.reset();
        if let Some(snapped) = self.tween.start(self.target, pose, duration) {
            self.pose = snapped;
        }
        // A move with no distance still turns the agent's heading for the next one
        self.target = pose;
        self.road = Some(step.road);
        trace!("agent {:?} moving to {:?} over {:?}", self.id, pose, duration);
        Ok(())
    }

    /// Advances the animation by one frame. Returns the new pose, if it moved.
    pub fn tick(&mut self) -> Option<Pose> {
        let pose = self.tween.tick()?;
        self.pose = pose;
        Some(pose)
    }

    /// Advances the animation by `dt` of wall-clock time, running every frame
    /// that fell due. Returns the new pose, if it moved.
    pub fn advance(&mut self, dt: Duration) -> Option<Pose> {
        if !self.tween.is_running() {
            return None;
        }
        let due = self.clock.advance(dt);
        let mut moved = None;
        for _ in 0..due {
            match self.tick() {
                Some(pose) => moved = Some(pose),
                None => break,
            }
        }
        moved
    }

    /// Cancels any move in progress, snapping to its target.
    pub fn stop(&mut self) {
        if let Some(target) = self.tween.stop() {
            self.pose = target;
        }
        self.clock.reset();
    }

    fn rest_at(&mut self, pose: Pose) {
        self.tween.stop();
        self.clock.reset();
        self.pose = pose;
        self.target = pose;
    }
}
