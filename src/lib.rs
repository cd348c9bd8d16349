pub use agent::{sample_pose, Agent, AgentKind, FrameClock, PlaybackStep, Placement, Tween};
pub use cgmath;
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use intersection::{Compass, Connection, Intersection};
pub use network::Network;
pub use road::{BoundaryClass, BoundaryKind, Direction, Lane, LaneType, Road, RoadEnd};
use slotmap::new_key_type;
pub use slotmap::{Key, KeyData};
pub use util::Interval;

mod agent;
mod config;
mod error;
mod intersection;
pub mod math;
mod network;
mod road;
mod util;

new_key_type! {
    /// Unique ID of a [Road].
    pub struct RoadId;
    /// Unique ID of an [Intersection].
    pub struct IntersectionId;
    /// Unique ID of an [Agent].
    pub struct AgentId;
}
