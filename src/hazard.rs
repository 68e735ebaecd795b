//! Boundary hazards of the arena: which grid sides are lethal to cross.
//!
//! Each side is `Hard` (crossing kills), `Permeable` (safe, for a randomly
//! drawn duration) or `Expiring` (safe, blinking for a fixed duration before
//! turning hard again). Time only moves when the host calls
//! [`Hazards::advance`] with the current session clock, so the lifecycle is a
//! pure function of the timestamps and the injected random source.

use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;

/// At most this many sides are non-hard at the same time.
pub const MAX_OPEN_SIDES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Bottom => 1,
            Side::Left => 2,
            Side::Right => 3,
        }
    }
}

/// Host-side state of one wall, with the timing needed to advance it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallState {
    Hard,
    Permeable { since: Duration, duration: Duration },
    Expiring { since: Duration },
}

impl WallState {
    pub fn kind(self) -> WallKind {
        match self {
            WallState::Hard => WallKind::Hard,
            WallState::Permeable { .. } => WallKind::Permeable,
            WallState::Expiring { .. } => WallKind::Expiring,
        }
    }
}

/// Wall state as seen on the wire and by the client mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallKind {
    #[default]
    #[serde(rename = "hard")]
    Hard,
    #[serde(rename = "green")]
    Permeable,
    #[serde(rename = "blink")]
    Expiring,
}

impl WallKind {
    pub fn is_lethal(self) -> bool {
        self == WallKind::Hard
    }
}

/// The `walls` object of a `snake_state` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WallKinds {
    pub top: WallKind,
    pub bottom: WallKind,
    pub left: WallKind,
    pub right: WallKind,
}

impl WallKinds {
    pub fn get(&self, side: Side) -> WallKind {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// The authoritative lifecycle of all four walls.
#[derive(Debug, Clone, PartialEq)]
pub struct Hazards {
    walls: [WallState; 4],
    next_event: Option<Duration>,
    expiring_duration: Duration,
    permeable_min: Duration,
    permeable_max: Duration,
}

impl Hazards {
    /// All walls hard; the first activation is scheduled one drawn interval after `now`.
    pub fn new<R: Rng + ?Sized>(config: &ArenaConfig, now: Duration, rng: &mut R) -> Self {
        let mut hazards = Self::dormant(config);
        hazards.next_event = Some(now + hazards.draw_duration(rng));
        hazards
    }

    /// All walls hard and no activation ever scheduled.
    pub fn dormant(config: &ArenaConfig) -> Self {
        Self {
            walls: [WallState::Hard; 4],
            next_event: None,
            expiring_duration: config.expiring_duration,
            permeable_min: config.permeable_min,
            permeable_max: config.permeable_max,
        }
    }

    pub fn state(&self, side: Side) -> WallState {
        self.walls[side.index()]
    }

    pub fn kind(&self, side: Side) -> WallKind {
        self.state(side).kind()
    }

    pub fn is_lethal(&self, side: Side) -> bool {
        self.kind(side).is_lethal()
    }

    pub fn kinds(&self) -> WallKinds {
        WallKinds {
            top: self.kind(Side::Top),
            bottom: self.kind(Side::Bottom),
            left: self.kind(Side::Left),
            right: self.kind(Side::Right),
        }
    }

    /// Number of sides currently permeable or expiring.
    pub fn open_count(&self) -> usize {
        self.walls
            .iter()
            .filter(|w| !matches!(w, WallState::Hard))
            .count()
    }

    /// When the next activation may happen, if one is scheduled.
    pub fn next_event(&self) -> Option<Duration> {
        self.next_event
    }

    /// Override one wall. Used for scripted scenarios.
    pub fn force(&mut self, side: Side, state: WallState) {
        self.walls[side.index()] = state;
    }

    /// Schedule (or cancel) the next activation.
    pub fn schedule(&mut self, at: Option<Duration>) {
        self.next_event = at;
    }

    fn draw_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let lo = self.permeable_min.as_secs_f64();
        let hi = self.permeable_max.as_secs_f64();
        if hi <= lo {
            return self.permeable_min;
        }
        Duration::from_secs_f64(rng.random_range(lo..=hi))
    }

    /// Move every wall forward to `now`:
    /// permeable walls past their duration start expiring, expiring walls past
    /// the blink duration turn hard, and when fewer than two sides are open
    /// and the scheduled event is due a random hard side opens.
    pub fn advance<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) {
        for wall in self.walls.iter_mut() {
            match *wall {
                WallState::Permeable { since, duration } if now.saturating_sub(since) >= duration => {
                    *wall = WallState::Expiring { since: now };
                }
                WallState::Expiring { since }
                    if now.saturating_sub(since) >= self.expiring_duration =>
                {
                    *wall = WallState::Hard;
                }
                _ => {}
            }
        }

        let Some(due) = self.next_event else {
            return;
        };
        if self.open_count() >= MAX_OPEN_SIDES || now < due {
            return;
        }

        let hard: Vec<Side> = Side::ALL
            .into_iter()
            .filter(|&s| self.state(s) == WallState::Hard)
            .collect();
        if let Some(&side) = hard.choose(rng) {
            let duration = self.draw_duration(rng);
            log::debug!("wall {:?} opens for {:?}", side, duration);
            self.walls[side.index()] = WallState::Permeable {
                since: now,
                duration,
            };
        }
        self.next_event = Some(now + self.draw_duration(rng));
    }
}
