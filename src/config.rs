//! Configuration shared by roads, intersections and agents.

use std::f64::consts::PI;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Geometry and animation settings, passed by value to everything that needs them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Width of a single lane in world units.
    pub lane_width: f64,
    /// Animation frame rate in Hz.
    pub frame_rate: u32,
    /// Maximum error, in radians, that heading input is snapped across.
    pub angle_snap: f64,
    /// Grid spacing that endpoint input is snapped to.
    pub grid_size: f64,
    /// Number of polyline segments used to approximate curves.
    pub curve_segments: usize,
    /// Number of centreline samples kept by a baked road.
    pub baked_samples: usize,
    /// Time between two recorded playback steps, in ms.
    pub simulation_interval_ms: u64,
    /// Default speed limit for new roads.
    pub speed_limit: f64,
    /// Smallest intersection size, in lanes.
    pub min_intersection_lanes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lane_width: 20.0,
            frame_rate: 30,
            angle_snap: PI / 16.0,
            grid_size: 50.0,
            curve_segments: 100,
            baked_samples: 1000,
            simulation_interval_ms: 250,
            speed_limit: 30.0,
            min_intersection_lanes: 2,
        }
    }
}

impl Config {
    /// Parses a JSON configuration. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.lane_width.is_finite() && self.lane_width > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lane_width must be positive, got {}",
                self.lane_width
            )));
        }
        if self.frame_rate == 0 {
            return Err(Error::InvalidConfig("frame_rate must be positive".into()));
        }
        if self.curve_segments == 0 || self.baked_samples == 0 {
            return Err(Error::InvalidConfig(
                "curve_segments and baked_samples must be positive".into(),
            ));
        }
        if !(self.grid_size > 0.0) || self.angle_snap < 0.0 {
            return Err(Error::InvalidConfig(
                "grid_size must be positive and angle_snap non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Time between two recorded playback steps.
    pub fn simulation_interval(&self) -> Duration {
        Duration::from_millis(self.simulation_interval_ms)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn partial_json_uses_defaults() {
        let config = Config::from_json(r#"{ "lane_width": 12.5, "frame_rate": 60 }"#).unwrap();
        assert_eq!(config.lane_width, 12.5);
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.curve_segments, 100);
        assert_eq!(config.simulation_interval(), Duration::from_millis(250));
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_json(r#"{ "lane_width": 0 }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let err = Config::from_json(r#"{ "frame_rate": 0 }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let err = Config::from_json("not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
