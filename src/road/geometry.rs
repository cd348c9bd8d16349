use crate::config::Config;
use crate::error::Result;
use crate::math::{curve_length, road_curve, BezierCurve2d, LookupTable, OffsetCurve, ParametricCurve2d, Pose};
use crate::util::Interval;

use super::Lane;

/// Settings a road needs to rebuild its geometry.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GeometryParams {
    pub lane_width: f64,
    pub curve_segments: usize,
    pub baked_samples: usize,
    pub baked: bool,
}

impl GeometryParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            lane_width: config.lane_width,
            curve_segments: config.curve_segments,
            baked_samples: config.baked_samples,
            baked: false,
        }
    }
}

/// The curves derived from a road's endpoints and lanes.
#[derive(Clone, Debug)]
pub(crate) struct RoadGeometry {
    /// The centre line of the road.
    pub centreline: BezierCurve2d,
    /// Half the overall width.
    pub half_width: f64,
    /// Approximate length of the centre line.
    pub length: f64,
    /// One curve per inner lane boundary.
    pub boundaries: Vec<OffsetCurve<BezierCurve2d>>,
    /// One centre line per lane.
    pub lane_centres: Vec<OffsetCurve<BezierCurve2d>>,
    /// Precomputed centre line poses, when baked.
    pub baked: Option<LookupTable<Pose>>,
}

impl RoadGeometry {
    pub fn build(start: &Pose, end: &Pose, lanes: &[Lane], params: &GeometryParams) -> Result<Self> {
        let centreline = road_curve(start, end)?;
        let lane_width = params.lane_width;
        let half_width = lanes.len() as f64 * lane_width / 2.0;

        let boundaries = (1..lanes.len())
            .map(|i| OffsetCurve::new(centreline.clone(), half_width, lane_width * i as f64))
            .collect();
        let lane_centres = (0..lanes.len())
            .map(|i| {
                let offset = lane_width * i as f64 + lane_width / 2.0;
                OffsetCurve::new(centreline.clone(), half_width, offset)
            })
            .collect();

        let mut geometry = Self {
            length: curve_length(&centreline, params.curve_segments),
            centreline,
            half_width,
            boundaries,
            lane_centres,
            baked: None,
        };
        geometry.bake(params);
        Ok(geometry)
    }

    /// Builds or drops the baked sample table to match `params`.
    pub fn bake(&mut self, params: &GeometryParams) {
        self.baked = params.baked.then(|| {
            LookupTable::from_endpoints(Interval::new(0.0, 1.0), params.baked_samples, |t| {
                self.centreline.sample_pose(t)
            })
        });
    }
}
