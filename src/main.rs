use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::info;
use road_kinematics::{
    math::Point2d, AgentKind, Compass, Config, Direction, Lane, Network, PlaybackStep, RoadEnd,
};

#[derive(Parser)]
#[command(name = "road-kinematics")]
#[command(about = "Builds a small road network and plays an agent along it")]
struct Cli {
    /// JSON configuration file; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of playback steps
    #[arg(long, default_value = "8")]
    steps: u32,

    /// Playback speed multiplier
    #[arg(long, default_value = "1.0")]
    speed: f64,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::from_json(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    let mut net = Network::new(config)?;

    // Two intersections joined by a road bending through a right angle
    let west = net.add_intersection("west", Point2d::new(0.0, 0.0))?;
    let south = net.add_intersection("south", Point2d::new(300.0, 300.0))?;
    let start = net.intersection(west)?.slot_pose(Compass::East);
    let end = net.intersection(south)?.slot_pose(Compass::North);
    let name = net.generate_name();
    let road = net.add_road(name, start, end)?;
    net.set_lanes(
        road,
        vec![
            Lane::bike(Direction::Forward),
            Lane::car(Direction::Forward),
            Lane::car(Direction::Backward),
            Lane::bike(Direction::Backward),
        ],
    )?;
    net.connect(west, Compass::East, road, RoadEnd::Start)?;
    net.connect(south, Compass::North, road, RoadEnd::End)?;

    let built = net.road(road)?;
    info!(
        "road '{}': width {}, length {:.1}, bend {:.1} deg",
        built.name(),
        built.width(),
        built.length(),
        built.bend_angle()?.to_degrees()
    );

    let car = net.add_agent(AgentKind::Car);
    net.place_agent(car, road, 1, 0.0, 10.0)?;
    let frame = Duration::from_secs(1) / net.config().frame_rate;

    for i in 1..=cli.steps {
        let step = PlaybackStep {
            road,
            reversed: false,
            fraction: i as f64 / cli.steps as f64,
            distance_to_side: net.config().lane_width,
        };
        net.play(car, &step, cli.speed)?;
        while net.agent(car)?.is_moving() {
            net.step(frame);
        }
        let pose = net.agent(car)?.pose();
        println!(
            "step {:>3}: ({:8.2}, {:8.2}) heading {:6.1} deg",
            i,
            pose.pos.x,
            pose.pos.y,
            pose.angle.to_degrees()
        );
    }
    Ok(())
}
