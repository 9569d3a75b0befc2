//! Input events and the per-tick driver.
//!
//! Device pollers (keyboard, joystick, a script) only ever talk to the world
//! through an `mpsc` channel of `InputEvent`s. Termination travels down the
//! same channel as `InputEvent::Quit`, so the frame loop sees it at a tick
//! boundary and nothing else needs shared state.

use std::sync::mpsc::{self, Receiver, TryRecvError};

use anyhow::{Context, Result};
use serde::Serialize;

use super::render::Renderer;
use super::{Point, World};

/// Analog stick values within this distance of centre count as centred.
pub const ANALOG_TOLERANCE: i32 = 4096;

/// Collapse an analog axis reading to -1, 0 or 1.
pub fn analog(v: i32) -> i32 {
    if v < -ANALOG_TOLERANCE {
        -1
    } else if v > ANALOG_TOLERANCE {
        1
    } else {
        0
    }
}

/// A unit step on each axis, each component in `-1..=1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const NONE: Direction = Direction { dx: 0, dy: 0 };
    pub const LEFT: Direction = Direction { dx: -1, dy: 0 };
    pub const RIGHT: Direction = Direction { dx: 1, dy: 0 };
    pub const UP: Direction = Direction { dx: 0, dy: -1 };
    pub const DOWN: Direction = Direction { dx: 0, dy: 1 };

    pub fn from_axis(x: i32, y: i32) -> Self {
        Direction {
            dx: analog(x),
            dy: analog(y),
        }
    }

    /// From held keys; right beats left and down beats up.
    pub fn from_keys(left: bool, right: bool, up: bool, down: bool) -> Self {
        let mut dir = Direction::NONE;
        if left {
            dir.dx = -1;
        }
        if right {
            dir.dx = 1;
        }
        if up {
            dir.dy = -1;
        }
        if down {
            dir.dy = 1;
        }
        dir
    }

    /// Parse one step of a move script: `L`, `R`, `U`, `D` or `.` (stand).
    pub fn from_move(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'L' => Some(Direction::LEFT),
            'R' => Some(Direction::RIGHT),
            'U' => Some(Direction::UP),
            'D' => Some(Direction::DOWN),
            '.' => Some(Direction::NONE),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Steer(Direction),
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Sequences drain input → update → render, once per call to `tick`.
pub struct FrameLoop {
    events: Receiver<InputEvent>,
    ticks: u64,
}

impl FrameLoop {
    pub fn new(events: Receiver<InputEvent>) -> Self {
        FrameLoop { events, ticks: 0 }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one frame. Stops (without updating) on `Quit` or once every
    /// sender has gone away. When several steer events are queued the
    /// last one wins; with none queued the previous heading is kept.
    pub fn tick<R: Renderer>(&mut self, world: &mut World, renderer: &mut R) -> Flow {
        loop {
            match self.events.try_recv() {
                Ok(InputEvent::Steer(dir)) => world.steer(dir),
                Ok(InputEvent::Quit) => {
                    log::debug!("quit requested after {} ticks", self.ticks);
                    return Flow::Stop;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::debug!("input channel closed after {} ticks", self.ticks);
                    return Flow::Stop;
                }
            }
        }

        world.update();
        world.render(renderer);
        self.ticks += 1;
        Flow::Continue
    }

    /// Tick until the channel says stop; returns the number of frames run.
    /// Pacing is up to the producer.
    pub fn run<R: Renderer>(&mut self, world: &mut World, renderer: &mut R) -> u64 {
        while self.tick(world, renderer) == Flow::Continue {}
        self.ticks
    }
}

/// What one tick of a scripted walk left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub actor: Point,
    pub tile: (i32, i32),
    pub camera: Point,
    pub sprite: u16,
}

/// Drive `world` through `steps`, one steer event per tick, then quit.
/// The producer and the frame loop share this thread, so each step is
/// sent right before the tick that consumes it.
pub fn replay<R: Renderer>(
    world: &mut World,
    renderer: &mut R,
    steps: &[Direction],
) -> Result<Vec<TickReport>> {
    let (tx, rx) = mpsc::channel();
    let mut frames = FrameLoop::new(rx);
    let mut reports = Vec::with_capacity(steps.len());

    for &dir in steps {
        tx.send(InputEvent::Steer(dir)).context("Input channel closed")?;
        if frames.tick(world, renderer) == Flow::Stop {
            break;
        }
        let hero = world.hero();
        reports.push(TickReport {
            tick: frames.ticks(),
            actor: hero.at,
            tile: world.to_tile(hero.at),
            camera: world.viewport().at,
            sprite: hero.tile(),
        });
    }

    tx.send(InputEvent::Quit).context("Input channel closed")?;
    let ticks = frames.run(world, renderer);
    log::debug!("walk finished after {ticks} ticks");
    Ok(reports)
}
