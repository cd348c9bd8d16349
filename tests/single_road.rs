//! Tests that involve a single road and the agents on it.

use std::f64::consts::{FRAC_PI_2, PI};
use std::time::Duration;

use assert_approx_eq::assert_approx_eq;
use road_kinematics::{
    math::{ParametricCurve2d, Pose},
    sample_pose, AgentKind, Config, Direction, Lane, Network, PlaybackStep, Road,
};

/// A road that bends through a right angle: east from the origin, then south.
fn corner(config: &Config) -> Road {
    let mut road = Road::new(
        "corner",
        Pose::new(0.0, 0.0, FRAC_PI_2),
        Pose::new(200.0, 200.0, PI),
        config,
    )
    .unwrap();
    road.set_lanes(vec![
        Lane::car(Direction::Forward),
        Lane::car(Direction::Forward),
        Lane::car(Direction::Backward),
    ])
    .unwrap();
    road
}

fn assert_close(a: Pose, b: Pose) {
    assert_approx_eq!(a.pos.x, b.pos.x);
    assert_approx_eq!(a.pos.y, b.pos.y);
}

/// Forward lanes start at the road's start, backward lanes at its end.
#[test]
fn lanes_run_in_their_direction() {
    let config = Config::default();
    let road = corner(&config);
    for lane in 0..3 {
        let curve = road.lane_curve(lane).unwrap();
        let (first, last) = (curve.sample_pose(0.0), curve.sample_pose(1.0));
        let (a, b) = (sample_pose(&road, lane, 0.0).unwrap(), sample_pose(&road, lane, 1.0).unwrap());
        if road.lane(lane).unwrap().direction == Direction::Forward {
            assert_close(a, first);
            assert_close(b, last);
        } else {
            assert_close(a, last);
            assert_close(b, first);
        }
    }
}

/// Lane 0's centre at the start is offset to the side of the start point.
#[test]
fn lane_offsets_are_lateral() {
    let config = Config::default();
    let road = corner(&config);
    // Heading +x, so lane 0 lies on the -y side
    let start = sample_pose(&road, 0, 0.0).unwrap();
    assert_approx_eq!(start.pos.x, 0.0);
    assert_approx_eq!(start.pos.y, -20.0);
    assert_approx_eq!(start.angle, FRAC_PI_2);
}

/// Adding then removing a lane restores the road.
#[test]
fn lane_round_trip() {
    let config = Config::default();
    let mut road = corner(&config);
    let width = road.width();
    let before: Vec<_> = road
        .boundaries()
        .unwrap()
        .iter()
        .map(|curve| curve.polyline(20))
        .collect();

    road.add_lane(Lane::bike(Direction::Backward)).unwrap();
    assert_eq!(road.width(), width + config.lane_width);
    road.remove_lane(3).unwrap();

    assert_eq!(road.width(), width);
    let after: Vec<_> = road
        .boundaries()
        .unwrap()
        .iter()
        .map(|curve| curve.polyline(20))
        .collect();
    assert_eq!(before, after);
}

/// An agent played along a lane ends exactly on each step and never leaves the road.
#[test]
fn agent_follows_playback() {
    let mut net = Network::new(Config::default()).unwrap();
    let road = net
        .add_road("corner", Pose::new(0.0, 0.0, FRAC_PI_2), Pose::new(200.0, 200.0, PI))
        .unwrap();
    net.set_lanes(road, vec![Lane::car(Direction::Forward), Lane::car(Direction::Backward)])
        .unwrap();
    let agent = net.add_agent(AgentKind::Car);
    net.place_agent(agent, road, 0, 0.0, 10.0).unwrap();

    let frame = Duration::from_secs(1) / net.config().frame_rate;
    for i in 1..=4 {
        let step = PlaybackStep {
            road,
            reversed: false,
            fraction: i as f64 / 4.0,
            distance_to_side: 0.0,
        };
        let expected = sample_pose(net.road(road).unwrap(), 0, step.fraction).unwrap();
        net.play(agent, &step, 1.0).unwrap();
        let mut frames = 0;
        while net.agent(agent).unwrap().is_moving() {
            net.step(frame);
            frames += 1;
            let pos = net.agent(agent).unwrap().pose().pos;
            assert!(pos.x > -30.0 && pos.x < 230.0);
            assert!(pos.y > -30.0 && pos.y < 230.0);
        }
        assert_eq!(frames, 7);
        assert_eq!(net.agent(agent).unwrap().pose(), expected);
    }
}

/// A baked road answers samples close to the exact curve.
#[test]
fn baked_sampling_is_close() {
    let config = Config::default();
    let mut road = corner(&config);
    let exact: Vec<_> = (0..=10)
        .map(|i| sample_pose(&road, 1, i as f64 / 10.0).unwrap())
        .collect();
    road.set_baked(true);
    for (i, exact) in exact.into_iter().enumerate() {
        let baked = sample_pose(&road, 1, i as f64 / 10.0).unwrap();
        assert!((baked.pos.x - exact.pos.x).abs() < 1.0);
        assert!((baked.pos.y - exact.pos.y).abs() < 1.0);
    }
}
