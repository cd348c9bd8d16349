//! Frame-by-frame interpolation of an agent's pose.

use std::f64::consts::{PI, TAU};
use std::time::Duration;

use log::trace;

use crate::math::{truncate_angle, Pose};

/// Interpolates a pose from one sample to another over a fixed number of frames.
///
/// The tween is either idle or running a single sweep. It does not own a
/// timer: the host calls [Tween::tick] once per frame, directly or through a
/// [FrameClock], and presents whatever pose it returns.
#[derive(Clone, Debug)]
pub struct Tween {
    /// Frames per second.
    frame_rate: u32,
    /// The sweep in progress, if running.
    sweep: Option<Sweep>,
}

#[derive(Clone, Copy, Debug)]
struct Sweep {
    /// The start pose, with its heading unwrapped against `to`.
    from: Pose,
    /// The end pose, with its heading unwrapped against `from`.
    to: Pose,
    /// The end pose exactly as commanded.
    target: Pose,
    /// Frames elapsed.
    frame: usize,
    /// Frames in the whole sweep.
    frames: usize,
}

impl Tween {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            frame_rate: frame_rate.max(1),
            sweep: None,
        }
    }

    /// Time between two frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.frame_rate as u64)
    }

    /// The number of whole frames that fit in `duration`.
    pub fn frame_count(&self, duration: Duration) -> usize {
        (duration.as_micros() * self.frame_rate as u128 / 1_000_000) as usize
    }

    pub fn is_running(&self) -> bool {
        self.sweep.is_some()
    }

    /// The pose the running sweep ends on.
    pub fn target(&self) -> Option<Pose> {
        self.sweep.map(|sweep| sweep.target)
    }

    /// Starts a new sweep from `from` to `to` lasting `duration`.
    ///
    /// A running sweep is stopped first. Returns the pose to present right
    /// away, if any: the previous target when a sweep was cut short, or `to`
    /// when the move is shorter than a single frame.
    pub fn start(&mut self, from: Pose, to: Pose, duration: Duration) -> Option<Pose> {
        let snapped = self.stop();
        if from.equal_coords(&to) {
            return snapped;
        }

        let frames = self.frame_count(duration);
        if frames == 0 {
            trace!("move shorter than one frame, arriving at {:?}", to);
            return Some(to);
        }

        let (from_angle, to_angle) = unwrap_headings(from.angle, to.angle);
        self.sweep = Some(Sweep {
            from: Pose::from_point(from.pos, from_angle),
            to: Pose::from_point(to.pos, to_angle),
            target: to,
            frame: 0,
            frames,
        });
        snapped
    }

    /// Advances one frame and returns the pose to present.
    ///
    /// Returns `None` when idle, so ticks that arrive after [Tween::stop] are dropped.
    pub fn tick(&mut self) -> Option<Pose> {
        let sweep = self.sweep.as_mut()?;
        sweep.frame += 1;
        if sweep.frame >= sweep.frames {
            let target = sweep.target;
            self.sweep = None;
            trace!("tween arrived at {:?}", target);
            return Some(target);
        }

        let percent = sweep.frame as f64 / sweep.frames as f64;
        let mut pose = sweep.from.lerp(&sweep.to, percent);
        pose.angle = truncate_angle(pose.angle, TAU);
        trace!("tween frame {}/{}: {:?}", sweep.frame, sweep.frames, pose);
        Some(pose)
    }

    /// Cancels the running sweep and returns its target, which the caller
    /// should present. Does nothing when idle.
    pub fn stop(&mut self) -> Option<Pose> {
        self.sweep.take().map(|sweep| sweep.target)
    }
}

/// Brings two headings into the same winding so that interpolating between
/// them sweeps the shorter arc.
fn unwrap_headings(from: f64, to: f64) -> (f64, f64) {
    let from = truncate_angle(from, TAU);
    let to = truncate_angle(to, TAU);
    if to - from > PI {
        (from + TAU, to)
    } else if from - to > PI {
        (from, to + TAU)
    } else {
        (from, to)
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Turns elapsed wall-clock time into a number of due frames.
#[derive(Clone, Debug)]
pub struct FrameClock {
    interval: Duration,
    pending: Duration,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: Duration::ZERO,
        }
    }

    /// Adds `dt` to the clock and returns how many frames are now due.
    /// Time left over is carried into the next call.
    pub fn advance(&mut self, dt: Duration) -> usize {
        if self.interval.is_zero() {
            return 0;
        }
        let pending = self.pending.as_nanos() + dt.as_nanos();
        let interval = self.interval.as_nanos();
        let rest = pending % interval;
        self.pending = Duration::new((rest / NANOS_PER_SEC) as u64, (rest % NANOS_PER_SEC) as u32);
        usize::try_from(pending / interval).unwrap_or(usize::MAX)
    }

    /// Drops any partially elapsed frame.
    pub fn reset(&mut self) {
        self.pending = Duration::ZERO;
    }
}
