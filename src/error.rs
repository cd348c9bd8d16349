//! Error handling for road geometry, lane and agent operations.

use thiserror::Error;

use crate::intersection::Compass;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category an [Error] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed arguments; the call is rejected before any mutation.
    InvalidInput,
    /// An index outside the valid range; state is left unchanged.
    OutOfRange,
    /// Geometry that has no well-defined curve.
    DegenerateGeometry,
    /// An entity key that is not (or no longer) part of the network.
    NotFound,
    /// Configuration that could not be parsed or is out of bounds.
    Config,
}

/// Errors surfaced by the geometry and kinematics engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("name '{0}' is already in use")]
    DuplicateName(String),

    #[error("a curve needs at least 2 control points, got {count}")]
    TooFewControlPoints { count: usize },

    #[error("lane index {index} out of range for a road with {count} lanes")]
    LaneOutOfRange { index: usize, count: usize },

    #[error("road has no lanes")]
    NoLanes,

    #[error("start and end points coincide")]
    CoincidentEndpoints,

    #[error("endpoint tangents are parallel and do not meet")]
    ParallelTangents,

    #[error("control point lies behind an endpoint (t1 = {t1}, t2 = {t2})")]
    ControlPointBehind { t1: f64, t2: f64 },

    #[error("control point lies on an endpoint (t1 = {t1}, t2 = {t2})")]
    ControlPointAtEndpoint { t1: f64, t2: f64 },

    #[error("control point is not finite")]
    NonFiniteControlPoint,

    #[error("sides {rp}, {pq}, {rq} do not form a triangle")]
    TriangleInequality { rp: f64, pq: f64, rq: f64 },

    #[error("{0:?} slot is already connected")]
    SlotOccupied(Compass),

    #[error("road end is already connected to an intersection")]
    AlreadyConnected,

    #[error("unknown road")]
    UnknownRoad,

    #[error("unknown intersection")]
    UnknownIntersection,

    #[error("unknown agent")]
    UnknownAgent,

    #[error("agent has not been placed on a road")]
    AgentNotPlaced,

    #[error("playback speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl Error {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            EmptyName
            | DuplicateName(_)
            | TooFewControlPoints { .. }
            | SlotOccupied(_)
            | AlreadyConnected
            | AgentNotPlaced
            | InvalidSpeed(_) => ErrorKind::InvalidInput,
            LaneOutOfRange { .. } | NoLanes => ErrorKind::OutOfRange,
            CoincidentEndpoints
            | ParallelTangents
            | ControlPointBehind { .. }
            | ControlPointAtEndpoint { .. }
            | NonFiniteControlPoint
            | TriangleInequality { .. } => ErrorKind::DegenerateGeometry,
            UnknownRoad | UnknownIntersection | UnknownAgent => ErrorKind::NotFound,
            InvalidConfig(_) | ConfigParse(_) => ErrorKind::Config,
        }
    }
}
