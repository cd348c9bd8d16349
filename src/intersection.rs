use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::{direction, Point2d, Pose};
use crate::road::RoadEnd;
use crate::RoadId;

/// One of the four sides of an intersection a road can attach to.
///
/// South is towards +y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compass {
    North,
    East,
    South,
    West,
}

impl Compass {
    pub const ALL: [Compass; 4] = [Compass::North, Compass::East, Compass::South, Compass::West];

    /// Heading of a road leaving the intersection through this side.
    pub fn heading(self) -> f64 {
        match self {
            Compass::South => 0.0,
            Compass::East => FRAC_PI_2,
            Compass::North => PI,
            Compass::West => 3.0 * FRAC_PI_2,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A road end attached to an intersection slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    pub road: RoadId,
    pub end: RoadEnd,
}

/// A square node joining up to four road ends.
#[derive(Clone, Debug)]
pub struct Intersection {
    name: String,
    /// The centre of the intersection.
    position: Point2d,
    /// Side length of the square.
    size: f64,
    slots: [Option<Connection>; 4],
}

impl Intersection {
    pub fn new(name: impl Into<String>, position: Point2d, size: f64) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        Ok(Self {
            name,
            position,
            size,
            slots: [None; 4],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        self.name = name;
        Ok(())
    }

    pub fn position(&self) -> Point2d {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Point2d) {
        self.position = position;
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Resizes to fit the widest of `widths`, never shrinking below `min_size`.
    /// Returns whether the size changed.
    pub(crate) fn fit(&mut self, min_size: f64, widths: impl IntoIterator<Item = f64>) -> bool {
        let size = widths.into_iter().fold(min_size, f64::max);
        let changed = size != self.size;
        self.size = size;
        changed
    }

    /// The road end attached to `side`, if any.
    pub fn slot(&self, side: Compass) -> Option<Connection> {
        self.slots[side.index()]
    }

    /// The pose a road end must take to attach to `side`.
    ///
    /// It sits on the edge of the square, heading away from the centre.
    pub fn slot_pose(&self, side: Compass) -> Pose {
        let heading = side.heading();
        Pose::from_point(self.position + direction(heading) * (self.size / 2.0), heading)
    }

    /// Iterates over the occupied slots.
    pub fn connections(&self) -> impl Iterator<Item = (Compass, Connection)> + '_ {
        Compass::ALL
            .into_iter()
            .filter_map(|side| self.slot(side).map(|conn| (side, conn)))
    }

    pub fn is_connected(&self, road: RoadId) -> bool {
        self.connections().any(|(_, conn)| conn.road == road)
    }

    pub(crate) fn attach(&mut self, side: Compass, conn: Connection) -> Result<()> {
        let slot = &mut self.slots[side.index()];
        if slot.is_some() {
            return Err(Error::SlotOccupied(side));
        }
        *slot = Some(conn);
        Ok(())
    }

    pub(crate) fn detach(&mut self, side: Compass) -> Option<Connection> {
        self.slots[side.index()].take()
    }

    /// Detaches every end of `road`, returning the sides that were freed.
    pub(crate) fn detach_road(&mut self, road: RoadId) -> Vec<Compass> {
        let sides: Vec<_> = self
            .connections()
            .filter(|(_, conn)| conn.road == road)
            .map(|(side, _)| side)
            .collect();
        for side in &sides {
            self.detach(*side);
        }
        sides
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::angle_difference;
    use assert_approx_eq::assert_approx_eq;
    use slotmap::KeyData;

    fn road_id(n: u64) -> RoadId {
        RoadId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn slot_poses_face_outwards() {
        let node = Intersection::new("x", Point2d::new(100.0, 100.0), 40.0).unwrap();
        let cases = [
            (Compass::North, 100.0, 80.0),
            (Compass::East, 120.0, 100.0),
            (Compass::South, 100.0, 120.0),
            (Compass::West, 80.0, 100.0),
        ];
        for (side, x, y) in cases {
            let pose = node.slot_pose(side);
            assert_approx_eq!(pose.pos.x, x);
            assert_approx_eq!(pose.pos.y, y);
            let outward = pose.pos - node.position();
            assert_approx_eq!(angle_difference(crate::math::heading(outward), pose.angle), 0.0);
        }
    }

    #[test]
    fn slots_hold_one_road_end() {
        let mut node = Intersection::new("x", Point2d::new(0.0, 0.0), 40.0).unwrap();
        let conn = Connection { road: road_id(1), end: RoadEnd::Start };
        node.attach(Compass::East, conn).unwrap();
        let err = node.attach(Compass::East, conn).unwrap_err();
        assert!(matches!(err, Error::SlotOccupied(Compass::East)));
        assert!(node.is_connected(road_id(1)));

        node.attach(Compass::West, Connection { road: road_id(1), end: RoadEnd::End }).unwrap();
        assert_eq!(node.detach_road(road_id(1)), vec![Compass::East, Compass::West]);
        assert_eq!(node.connections().count(), 0);
    }

    #[test]
    fn fit_tracks_widest_road() {
        let mut node = Intersection::new("x", Point2d::new(0.0, 0.0), 40.0).unwrap();
        assert!(!node.fit(40.0, [20.0, 40.0]));
        assert!(node.fit(40.0, [20.0, 60.0]));
        assert_eq!(node.size(), 60.0);
        assert!(node.fit(40.0, []));
        assert_eq!(node.size(), 40.0);
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            Intersection::new("", Point2d::new(0.0, 0.0), 40.0),
            Err(Error::EmptyName)
        ));
    }
}
