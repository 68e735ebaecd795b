use std::time::Duration;

use crate::ship::ShipType;

pub const BOARD_SIZE: usize = 10;
pub const NUM_SHIPS: usize = 5;
pub const SHIPS: [ShipType; NUM_SHIPS] = [
    ShipType::new("Carrier", 5),
    ShipType::new("Battleship", 4),
    ShipType::new("Cruiser", 3),
    ShipType::new("Submarine", 3),
    ShipType::new("Destroyer", 2),
];

/// Total number of ship segments used in the standard configuration.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Default TCP port for `versus host` / `versus join`.
pub const DEFAULT_PORT: u16 = 5000;

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "VERSUS_LOG";

/// Convert a ship name string to the canonical static name used in the
/// configuration. Returns `None` if the name does not match any defined ship.
pub fn ship_name_static(name: &str) -> Option<&'static str> {
    SHIPS
        .iter()
        .find(|def| def.name() == name)
        .map(|def| def.name())
}

/// Rule deciding who fires next once a shot has been resolved.
///
/// Both peers must run the same policy; the attacker and the defender each
/// apply it to their own `my_turn` flag after every `fire`/`result` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPolicy {
    /// The turn passes to the other side after every shot.
    #[default]
    AlternateEveryShot,
    /// The attacker keeps firing while it keeps hitting.
    KeepOnHit,
}

impl TurnPolicy {
    /// Whether the attacker fires again after a shot with the given outcome.
    pub fn attacker_keeps_turn(self, hit: bool) -> bool {
        match self {
            TurnPolicy::AlternateEveryShot => false,
            TurnPolicy::KeepOnHit => hit,
        }
    }
}

/// Tunables for the arena (dual-snake) game.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaConfig {
    pub rows: usize,
    pub cols: usize,
    /// Tick interval while both scores are zero.
    pub base_interval: Duration,
    /// Lower bound for the tick interval.
    pub min_interval: Duration,
    /// Interval reduction per point of the leading score.
    pub speed_step: Duration,
    /// How long a wall blinks before turning hard again.
    pub expiring_duration: Duration,
    /// Range for both the permeable duration and the gap between hazard events.
    pub permeable_min: Duration,
    pub permeable_max: Duration,
    /// End the match after this many ticks, awarding it on score.
    pub max_ticks: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            rows: 18,
            cols: 30,
            base_interval: Duration::from_millis(120),
            min_interval: Duration::from_millis(50),
            speed_step: Duration::from_millis(7),
            expiring_duration: Duration::from_secs(2),
            permeable_min: Duration::from_secs(6),
            permeable_max: Duration::from_secs(10),
            max_ticks: None,
        }
    }
}

impl ArenaConfig {
    pub const MIN_ROWS: usize = 4;
    pub const MIN_COLS: usize = 8;

    /// Clamp out-of-range values so the config is safe to simulate with.
    pub fn validated(mut self) -> Self {
        if self.rows < Self::MIN_ROWS {
            log::warn!("arena rows {} below minimum, clamping to {}", self.rows, Self::MIN_ROWS);
            self.rows = Self::MIN_ROWS;
        }
        if self.cols < Self::MIN_COLS {
            log::warn!("arena cols {} below minimum, clamping to {}", self.cols, Self::MIN_COLS);
            self.cols = Self::MIN_COLS;
        }
        if self.min_interval > self.base_interval {
            self.min_interval = self.base_interval;
        }
        if self.permeable_min > self.permeable_max {
            std::mem::swap(&mut self.permeable_min, &mut self.permeable_max);
        }
        self
    }

    /// `max(min_interval, base_interval - speed_step * max_score)`.
    pub fn tick_interval(&self, max_score: u32) -> Duration {
        let reduction = self.speed_step.saturating_mul(max_score);
        self.base_interval
            .saturating_sub(reduction)
            .max(self.min_interval)
    }
}

/// Settings for a [`crate::PeerNode`].
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub arena: ArenaConfig,
    pub turn_policy: TurnPolicy,
    /// Host fires first in the combat game (the host announces this in `start`).
    pub host_moves_first: bool,
    /// Delay between two passes of the foreground loop.
    pub frame_interval: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            turn_policy: TurnPolicy::default(),
            host_moves_first: true,
            frame_interval: Duration::from_millis(16),
        }
    }
}
