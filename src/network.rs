use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use slotmap::SlotMap;

use crate::agent::{Agent, AgentKind, PlaybackStep};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::intersection::{Compass, Connection, Intersection};
use crate::math::{snap, snap_angle, Point2d, Pose};
use crate::road::{Lane, Road, RoadEnd};
use crate::{AgentId, IntersectionId, RoadId};

/// Roads that have been changed but not yet written back to the network.
type StagedRoads = HashMap<RoadId, Road>;

/// A road network with the agents placed on it.
///
/// Every mutation is all or nothing: roads and intersections affected by a
/// change are rebuilt on copies, and only written back once all of them
/// succeed.
pub struct Network {
    config: Config,
    /// The roads in the network.
    roads: SlotMap<RoadId, Road>,
    /// The intersections joining roads.
    intersections: SlotMap<IntersectionId, Intersection>,
    /// The agents placed on roads.
    agents: SlotMap<AgentId, Agent>,
}

impl Network {
    /// Creates an empty network.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            roads: SlotMap::with_key(),
            intersections: SlotMap::with_key(),
            agents: SlotMap::with_key(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snaps user input to the configured grid and heading increments.
    pub fn snap_input(&self, pose: Pose) -> Pose {
        Pose::new(
            snap(pose.pos.x, self.config.grid_size),
            snap(pose.pos.y, self.config.grid_size),
            snap_angle(pose.angle, self.config.angle_snap),
        )
    }

    /// Whether a road or intersection already uses `name`.
    pub fn name_in_use(&self, name: &str) -> bool {
        self.roads.values().any(|road| road.name() == name)
            || self.intersections.values().any(|node| node.name() == name)
    }

    /// Generates a random name that is not yet in use.
    pub fn generate_name(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let name = format!("{:06x}", rng.gen_range(0..0x100_0000u32));
            if !self.name_in_use(&name) {
                return name;
            }
        }
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            Err(Error::EmptyName)
        } else if self.name_in_use(name) {
            Err(Error::DuplicateName(name.to_owned()))
        } else {
            Ok(())
        }
    }

    /// The side length of an intersection with no roads wider than it.
    fn min_intersection_size(&self) -> f64 {
        self.config.min_intersection_lanes as f64 * self.config.lane_width
    }

    /// Adds a road without lanes.
    pub fn add_road(&mut self, name: impl Into<String>, start: Pose, end: Pose) -> Result<RoadId> {
        let name = name.into();
        self.check_name(&name)?;
        let road = Road::new(name, start, end, &self.config)?;
        let id = self.roads.insert(road);
        info!("added road {:?} '{}'", id, self.roads[id].name());
        Ok(id)
    }

    /// Removes a road, detaching it from intersections and dropping the agents placed on it.
    pub fn remove_road(&mut self, id: RoadId) -> Result<Road> {
        self.road(id)?;
        let mut staged = StagedRoads::new();
        let mut nodes = vec![];
        for node_id in self.intersections_of(id) {
            let mut node = self.intersections[node_id].clone();
            node.detach_road(id);
            self.fit_and_snap(&mut node, &mut staged)?;
            nodes.push((node_id, node));
        }
        self.commit(nodes, staged);

        let dropped: Vec<_> = self
            .agents
            .iter()
            .filter(|(_, agent)| agent.road_id() == Some(id) || agent.placement().map(|p| p.road) == Some(id))
            .map(|(agent_id, _)| agent_id)
            .collect();
        for agent_id in dropped {
            self.agents.remove(agent_id);
        }
        let road = self.roads.remove(id).ok_or(Error::UnknownRoad)?;
        info!("removed road {:?} '{}'", id, road.name());
        Ok(road)
    }

    /// Gets a road.
    pub fn road(&self, id: RoadId) -> Result<&Road> {
        self.roads.get(id).ok_or(Error::UnknownRoad)
    }

    /// Returns an iterator over all the roads.
    pub fn roads(&self) -> impl Iterator<Item = (RoadId, &Road)> {
        self.roads.iter()
    }

    /// Finds a road by name.
    pub fn road_by_name(&self, name: &str) -> Option<RoadId> {
        self.roads.iter().find(|(_, road)| road.name() == name).map(|(id, _)| id)
    }

    pub fn rename_road(&mut self, id: RoadId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.road(id)?.name() == name {
            return Ok(());
        }
        self.check_name(&name)?;
        self.roads[id].rename(name)
    }

    pub fn set_speed_limit(&mut self, id: RoadId, speed_limit: f64) -> Result<()> {
        self.roads.get_mut(id).ok_or(Error::UnknownRoad)?.set_speed_limit(speed_limit);
        Ok(())
    }

    /// Switches a road between exact and precomputed sampling.
    pub fn set_road_baked(&mut self, id: RoadId, baked: bool) -> Result<()> {
        self.update_road(id, |road| {
            road.set_baked(baked);
            Ok(())
        })
    }

    /// Appends a lane to a road.
    pub fn add_lane(&mut self, id: RoadId, lane: Lane) -> Result<()> {
        self.update_road(id, |road| road.add_lane(lane))
    }

    /// Removes the lane at `index` from a road.
    pub fn remove_lane(&mut self, id: RoadId, index: usize) -> Result<Lane> {
        self.update_road(id, |road| road.remove_lane(index))
    }

    /// Replaces every lane of a road.
    pub fn set_lanes(&mut self, id: RoadId, lanes: Vec<Lane>) -> Result<()> {
        self.update_road(id, |road| road.set_lanes(lanes))
    }

    /// Moves a road end that is not connected to an intersection.
    pub fn move_road_end(&mut self, id: RoadId, end: RoadEnd, pose: Pose) -> Result<()> {
        if self.attachment(id, end).is_some() {
            return Err(Error::AlreadyConnected);
        }
        self.update_road(id, |road| road.set_endpoint(end, pose))
    }

    /// Applies `f` to a copy of a road, then refreshes the intersections it is
    /// connected to and the agents placed on it.
    fn update_road<T>(&mut self, id: RoadId, f: impl FnOnce(&mut Road) -> Result<T>) -> Result<T> {
        let mut road = self.road(id)?.clone();
        let out = f(&mut road)?;
        let mut staged = StagedRoads::from([(id, road)]);
        let mut nodes = vec![];
        for node_id in self.intersections_of(id) {
            let mut node = self.intersections[node_id].clone();
            self.fit_and_snap(&mut node, &mut staged)?;
            nodes.push((node_id, node));
        }
        self.commit(nodes, staged);
        Ok(out)
    }

    /// Adds an intersection of the smallest size.
    pub fn add_intersection(&mut self, name: impl Into<String>, position: Point2d) -> Result<IntersectionId> {
        let name = name.into();
        self.check_name(&name)?;
        let node = Intersection::new(name, position, self.min_intersection_size())?;
        let id = self.intersections.insert(node);
        info!("added intersection {:?} '{}'", id, self.intersections[id].name());
        Ok(id)
    }

    /// Removes an intersection. Connected roads stay where they are.
    pub fn remove_intersection(&mut self, id: IntersectionId) -> Result<Intersection> {
        let node = self.intersections.remove(id).ok_or(Error::UnknownIntersection)?;
        info!("removed intersection {:?} '{}'", id, node.name());
        Ok(node)
    }

    /// Gets an intersection.
    pub fn intersection(&self, id: IntersectionId) -> Result<&Intersection> {
        self.intersections.get(id).ok_or(Error::UnknownIntersection)
    }

    /// Returns an iterator over all the intersections.
    pub fn intersections(&self) -> impl Iterator<Item = (IntersectionId, &Intersection)> {
        self.intersections.iter()
    }

    pub fn rename_intersection(&mut self, id: IntersectionId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.intersection(id)?.name() == name {
            return Ok(());
        }
        self.check_name(&name)?;
        self.intersections[id].rename(name)
    }

    /// Moves an intersection, dragging every connected road end along.
    pub fn move_intersection(&mut self, id: IntersectionId, position: Point2d) -> Result<()> {
        let mut node = self.intersection(id)?.clone();
        node.set_position(position);
        let mut staged = StagedRoads::new();
        self.fit_and_snap(&mut node, &mut staged)?;
        self.commit(vec![(id, node)], staged);
        Ok(())
    }

    /// Attaches one end of a road to a side of an intersection, moving the
    /// road end onto the side.
    pub fn connect(&mut self, id: IntersectionId, side: Compass, road: RoadId, end: RoadEnd) -> Result<()> {
        let mut node = self.intersection(id)?.clone();
        self.road(road)?;
        if self.attachment(road, end).is_some() {
            return Err(Error::AlreadyConnected);
        }
        node.attach(side, Connection { road, end })?;
        let mut staged = StagedRoads::new();
        self.fit_and_snap(&mut node, &mut staged)?;
        self.commit(vec![(id, node)], staged);
        debug!("connected {:?} {:?} to {:?} {:?}", road, end, id, side);
        Ok(())
    }

    /// Detaches whatever is connected to a side of an intersection.
    pub fn disconnect(&mut self, id: IntersectionId, side: Compass) -> Result<Option<Connection>> {
        let mut node = self.intersection(id)?.clone();
        let conn = node.detach(side);
        let mut staged = StagedRoads::new();
        self.fit_and_snap(&mut node, &mut staged)?;
        self.commit(vec![(id, node)], staged);
        Ok(conn)
    }

    /// The intersection side a road end is connected to, if any.
    pub fn attachment(&self, road: RoadId, end: RoadEnd) -> Option<(IntersectionId, Compass)> {
        self.intersections.iter().find_map(|(id, node)| {
            node.connections()
                .find(|(_, conn)| *conn == Connection { road, end })
                .map(|(side, _)| (id, side))
        })
    }

    fn intersections_of(&self, road: RoadId) -> Vec<IntersectionId> {
        self.intersections
            .iter()
            .filter(|(_, node)| node.is_connected(road))
            .map(|(id, _)| id)
            .collect()
    }

    /// Resizes `node` to fit its roads, then moves each connected road end
    /// onto its side. Changed roads are written to `staged`.
    fn fit_and_snap(&self, node: &mut Intersection, staged: &mut StagedRoads) -> Result<()> {
        let connections: Vec<_> = node.connections().collect();
        let widths: Vec<f64> = connections
            .iter()
            .filter_map(|(_, conn)| staged.get(&conn.road).or_else(|| self.roads.get(conn.road)))
            .map(Road::width)
            .collect();
        if node.fit(self.min_intersection_size(), widths) {
            debug!("intersection '{}' resized to {}", node.name(), node.size());
        }

        for (side, conn) in connections {
            let road = match staged.entry(conn.road) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    entry.insert(self.roads.get(conn.road).ok_or(Error::UnknownRoad)?.clone())
                }
            };
            let pose = node.slot_pose(side);
            if road.endpoint(conn.end) != pose {
                road.set_endpoint(conn.end, pose)?;
            }
        }
        Ok(())
    }

    /// Writes back staged changes and puts agents back on the changed roads.
    fn commit(&mut self, nodes: Vec<(IntersectionId, Intersection)>, staged: StagedRoads) {
        for (id, node) in nodes {
            self.intersections[id] = node;
        }
        for (id, road) in staged {
            self.roads[id] = road;
            self.replace_agents(id);
        }
    }

    /// Puts every agent placed on a road back at its initial placement.
    fn replace_agents(&mut self, road_id: RoadId) {
        let road = &self.roads[road_id];
        for (agent_id, agent) in &mut self.agents {
            if agent.placement().map(|p| p.road) != Some(road_id) {
                continue;
            }
            if let Err(err) = agent.replace(road) {
                warn!("agent {:?} no longer fits on road '{}': {}", agent_id, road.name(), err);
                agent.unplace();
            }
        }
    }

    /// Adds an agent that is not yet on any road.
    pub fn add_agent(&mut self, kind: AgentKind) -> AgentId {
        let config = &self.config;
        self.agents.insert_with_key(|id| Agent::new(id, kind, config))
    }

    /// Removes an agent.
    pub fn remove_agent(&mut self, id: AgentId) -> Result<Agent> {
        self.agents.remove(id).ok_or(Error::UnknownAgent)
    }

    /// Gets an agent.
    pub fn agent(&self, id: AgentId) -> Result<&Agent> {
        self.agents.get(id).ok_or(Error::UnknownAgent)
    }

    /// Returns an iterator over all the agents.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn set_agent_kind(&mut self, id: AgentId, kind: AgentKind) -> Result<()> {
        self.agent_mut(id)?.set_kind(kind);
        Ok(())
    }

    fn agent_mut(&mut self, id: AgentId) -> Result<&mut Agent> {
        self.agents.get_mut(id).ok_or(Error::UnknownAgent)
    }

    /// Puts an agent on a lane of a road.
    pub fn place_agent(&mut self, id: AgentId, road: RoadId, lane: usize, fraction: f64, speed: f64) -> Result<()> {
        let road_ref = self.roads.get(road).ok_or(Error::UnknownRoad)?;
        self.agents
            .get_mut(id)
            .ok_or(Error::UnknownAgent)?
            .place(road, road_ref, lane, fraction, speed)
    }

    /// Starts animating an agent towards a playback step.
    pub fn play(&mut self, id: AgentId, step: &PlaybackStep, speed: f64) -> Result<()> {
        let road = self.roads.get(step.road).ok_or(Error::UnknownRoad)?;
        self.agents
            .get_mut(id)
            .ok_or(Error::UnknownAgent)?
            .simulate(step, road, speed)
    }

    /// Moves an agent straight to a playback step.
    pub fn jump_agent(&mut self, id: AgentId, step: &PlaybackStep) -> Result<()> {
        let road = self.roads.get(step.road).ok_or(Error::UnknownRoad)?;
        self.agents.get_mut(id).ok_or(Error::UnknownAgent)?.jump_to(step, road)
    }

    /// Cancels every agent's move in progress, snapping each to its target.
    pub fn stop_all(&mut self) {
        for agent in self.agents.values_mut() {
            agent.stop();
        }
    }

    /// Advances every agent's animation by `dt` of wall-clock time.
    /// Returns the number of agents that moved.
    pub fn step(&mut self, dt: Duration) -> usize {
        self.agents
            .values_mut()
            .filter_map(|agent| agent.advance(dt))
            .count()
    }
}
