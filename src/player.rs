use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use crate::audio::{AudioSink, SoundCue};
use crate::caster::Point;
use crate::grid::Occupancy;
use crate::input::InputState;

pub const DEFAULT_HEALTH: f64 = 100.0;
pub const DEFAULT_SPEED: f64 = 2.7;
pub const DEFAULT_RUN_FACTOR: f64 = 1.5;

/// Position and facing, everything the camera needs to cast a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub direction: f64,
}

impl Pose {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageSource {
    World,
    Actor(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Damaged,
    Died,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    Damaged {
        source: DamageSource,
        amount: f64,
        health: f64,
    },
    Died {
        source: DamageSource,
    },
}

impl PlayerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PlayerEvent::Damaged { .. } => EventKind::Damaged,
            PlayerEvent::Died { .. } => EventKind::Died,
        }
    }
}

type Listener = Box<dyn FnMut(&PlayerEvent)>;

pub struct Player {
    pub x: f64,
    pub y: f64,
    /// Radians, kept in `[0, TAU)`.
    pub direction: f64,
    /// Vertical look in `[-1, 1]`, shifts the horizon.
    pub direction_v: f64,
    pub health: f64,
    pub speed: f64,
    pub run_factor: f64,
    /// Distance walked, drives head bob.
    pub paces: f64,
    pub is_moving: bool,
    pub is_rotating: bool,
    pub lock_controls: bool,
    walk_cue: bool,
    run_cue: bool,
    listeners: Vec<(EventKind, Listener)>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("direction", &self.direction)
            .field("direction_v", &self.direction_v)
            .field("health", &self.health)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Player {
    pub fn new(x: f64, y: f64, direction: f64) -> Self {
        Self {
            x,
            y,
            direction: direction.rem_euclid(TAU),
            direction_v: 0.0,
            health: DEFAULT_HEALTH,
            speed: DEFAULT_SPEED,
            run_factor: DEFAULT_RUN_FACTOR,
            paces: 0.0,
            is_moving: false,
            is_rotating: false,
            lock_controls: false,
            walk_cue: false,
            run_cue: false,
            listeners: Vec::new(),
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            x: self.x,
            y: self.y,
            direction: self.direction,
        }
    }

    /// Registers `callback` for every event of `kind`.
    pub fn on(&mut self, kind: EventKind, callback: impl FnMut(&PlayerEvent) + 'static) {
        self.listeners.push((kind, Box::new(callback)));
    }

    fn emit(&mut self, event: PlayerEvent) {
        let kind = event.kind();
        for (listening, callback) in &mut self.listeners {
            if *listening == kind {
                callback(&event);
            }
        }
    }

    pub fn damage(&mut self, amount: f64, source: DamageSource) {
        let was_alive = self.health > 0.0;
        self.health -= amount;
        self.emit(PlayerEvent::Damaged {
            source,
            amount,
            health: self.health,
        });
        if was_alive && self.health <= 0.0 {
            self.emit(PlayerEvent::Died { source });
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn rotate_h(&mut self, angle: f64) {
        self.direction = (self.direction + angle).rem_euclid(TAU);
    }

    pub fn rotate_v(&mut self, amount: f64) {
        self.direction_v = (self.direction_v + amount).clamp(-1.0, 1.0);
    }

    /// Moves `distance` along `direction + offset`, one axis at a time so the
    /// player slides along walls instead of sticking to them.
    pub fn walk<M: Occupancy + ?Sized>(&mut self, distance: f64, offset: f64, map: &M) {
        let (sin, cos) = (self.direction + offset).sin_cos();
        let dx = cos * distance;
        let dy = sin * distance;
        if is_open(map, self.x + dx, self.y) {
            self.x += dx;
        }
        if is_open(map, self.x, self.y + dy) {
            self.y += dy;
        }
        self.paces += distance;
    }

    /// Applies one frame of input. Mouse deltas are consumed.
    pub fn update<M: Occupancy + ?Sized>(
        &mut self,
        input: &mut InputState,
        map: &M,
        seconds: f64,
        audio: &mut dyn AudioSink,
    ) {
        if input.map || self.lock_controls {
            self.set_cues(false, false, audio);
            self.is_moving = false;
            self.is_rotating = false;
            return;
        }

        self.is_rotating = false;
        if input.rotate_x != 0.0 {
            self.rotate_h(input.rotate_x / 15.0 * PI * seconds);
            input.rotate_x = 0.0;
            self.is_rotating = true;
        }
        if input.rotate_y != 0.0 {
            self.rotate_v(input.rotate_y / 15.0 * PI * seconds);
            input.rotate_y = 0.0;
            self.is_rotating = true;
        }

        let Some((sign, offset)) = heading(input) else {
            self.set_cues(false, false, audio);
            self.is_moving = false;
            return;
        };

        self.is_moving = true;
        let speed = if input.run {
            self.speed * self.run_factor
        } else {
            self.speed
        };
        self.walk(sign * speed * seconds, offset, map);
        self.set_cues(!input.run, input.run, audio);
    }

    fn set_cues(&mut self, walking: bool, running: bool, audio: &mut dyn AudioSink) {
        if running != self.run_cue {
            if running {
                audio.play(SoundCue::Run, true, 1.0);
            } else {
                audio.stop(SoundCue::Run);
            }
            self.run_cue = running;
        }
        if walking != self.walk_cue {
            if walking {
                audio.play(SoundCue::Walk, true, 1.0);
            } else {
                audio.stop(SoundCue::Walk);
            }
            self.walk_cue = walking;
        }
    }
}

fn is_open<M: Occupancy + ?Sized>(map: &M, x: f64, y: f64) -> bool {
    map.cell(x, y).is_none_or(|value| value == 0)
}

/// Signed walk direction for the held keys, as (distance sign, angle offset).
/// Opposing keys that cancel out leave the player standing.
fn heading(input: &InputState) -> Option<(f64, f64)> {
    let strafe = input.left != input.right;
    let axial = input.forward != input.backward;
    match (axial, strafe) {
        (false, false) => None,
        (true, false) if input.forward => Some((1.0, 0.0)),
        (true, false) => Some((-1.0, 0.0)),
        (false, true) if input.left => Some((1.0, -FRAC_PI_2)),
        (false, true) => Some((1.0, FRAC_PI_2)),
        (true, true) => match (input.forward, input.left) {
            (true, true) => Some((1.0, -FRAC_PI_4)),
            (true, false) => Some((1.0, FRAC_PI_4)),
            (false, true) => Some((-1.0, FRAC_PI_4)),
            (false, false) => Some((-1.0, -FRAC_PI_4)),
        },
    }
}
