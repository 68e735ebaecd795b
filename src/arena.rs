//! Real-time dual-snake arena.
//!
//! [`ArenaHost`] is the only place the simulation advances: it owns both
//! agents, the food, the scores and the walls, and emits a full
//! `snake_state` snapshot after every tick. [`ArenaMirror`] is the client's
//! read-only copy, replaced wholesale by each snapshot it receives.

use std::collections::VecDeque;
use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ArenaConfig;
use crate::error::SessionError;
use crate::hazard::{Hazards, Side, WallKinds};
use crate::protocol::{Coord, Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "U")]
    Up,
    #[serde(rename = "D")]
    Down,
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// One step from `from` on a `rows` x `cols` torus, plus the side crossed
    /// when the step wraps around.
    pub fn step(self, from: Coord, rows: usize, cols: usize) -> (Coord, Option<Side>) {
        let (r, c) = from;
        match self {
            Direction::Up if r == 0 => ((rows - 1, c), Some(Side::Top)),
            Direction::Up => ((r - 1, c), None),
            Direction::Down if r + 1 >= rows => ((0, c), Some(Side::Bottom)),
            Direction::Down => ((r + 1, c), None),
            Direction::Left if c == 0 => ((r, cols - 1), Some(Side::Left)),
            Direction::Left => ((r, c - 1), None),
            Direction::Right if c + 1 >= cols => ((r, 0), Some(Side::Right)),
            Direction::Right => ((r, c + 1), None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArenaStatus {
    Ongoing,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Host,
    Client,
    Draw,
}

impl From<Role> for Winner {
    fn from(role: Role) -> Self {
        match role {
            Role::Host => Winner::Host,
            Role::Client => Winner::Client,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub host: u32,
    pub client: u32,
}

impl Scores {
    pub fn get(&self, agent: Role) -> u32 {
        match agent {
            Role::Host => self.host,
            Role::Client => self.client,
        }
    }

    fn bump(&mut self, agent: Role) {
        match agent {
            Role::Host => self.host += 1,
            Role::Client => self.client += 1,
        }
    }

    pub fn max(&self) -> u32 {
        self.host.max(self.client)
    }
}

/// One snake: body segments head first, plus current and requested heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    body: VecDeque<Coord>,
    direction: Direction,
    desired: Direction,
}

impl Agent {
    /// `body` must be non-empty; its first element is the head.
    pub fn new(body: impl IntoIterator<Item = Coord>, direction: Direction) -> Self {
        Self {
            body: body.into_iter().collect(),
            direction,
            desired: direction,
        }
    }

    pub fn head(&self) -> Coord {
        self.body[0]
    }

    pub fn body(&self) -> &VecDeque<Coord> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn desired(&self) -> Direction {
        self.desired
    }

    pub fn contains(&self, cell: Coord) -> bool {
        self.body.contains(&cell)
    }

    pub fn segments(&self) -> Vec<Coord> {
        self.body.iter().copied().collect()
    }

    pub fn set_desired(&mut self, dir: Direction) {
        self.desired = dir;
    }

    /// Adopt the desired heading unless it would reverse onto the neck.
    fn turn(&mut self) {
        if self.desired != self.direction.opposite() {
            self.direction = self.desired;
        }
    }

    /// Keep only the segments strictly before `index`; a cut at the head
    /// leaves the head alone.
    pub fn truncate_at(&mut self, index: usize) {
        self.body.truncate(index.max(1));
    }

    fn hits_itself(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|&c| c == head)
    }
}

/// Everything a presentation layer or steering logic needs to draw or judge
/// the arena. Both the host and the client mirror expose one.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaView {
    pub rows: usize,
    pub cols: usize,
    pub host: Vec<Coord>,
    pub client: Vec<Coord>,
    pub food: Coord,
    pub scores: Scores,
    pub status: ArenaStatus,
    pub winner: Option<Winner>,
    pub walls: WallKinds,
    pub tick_interval: Duration,
}

impl ArenaView {
    pub fn body(&self, agent: Role) -> &[Coord] {
        match agent {
            Role::Host => &self.host,
            Role::Client => &self.client,
        }
    }

    /// Heading implied by the first two segments, if the agent has a neck.
    pub fn heading(&self, agent: Role) -> Option<Direction> {
        let body = self.body(agent);
        let (head, neck) = (*body.first()?, *body.get(1)?);
        Direction::ALL
            .into_iter()
            .find(|d| d.step(neck, self.rows, self.cols).0 == head)
    }
}

/// Authoritative arena simulation, run by the host only.
#[derive(Debug, Clone)]
pub struct ArenaHost {
    config: ArenaConfig,
    host: Agent,
    client: Agent,
    food: Coord,
    scores: Scores,
    status: ArenaStatus,
    winner: Option<Winner>,
    hazards: Hazards,
    tick_interval: Duration,
    next_tick_at: Duration,
    ticks: u64,
}

impl ArenaHost {
    /// Start a new match at session time `now`.
    ///
    /// The host snake occupies the first four columns of the middle row heading
    /// right, the client snake the last four heading left.
    pub fn new<R: Rng + ?Sized>(config: ArenaConfig, now: Duration, rng: &mut R) -> Self {
        let config = config.validated();
        let row = config.rows / 2;
        let cols = config.cols;
        let host = Agent::new((0..4).rev().map(|c| (row, c)), Direction::Right);
        let client = Agent::new((cols - 4..cols).map(|c| (row, c)), Direction::Left);
        let hazards = Hazards::new(&config, now, rng);
        let mut arena = Self::from_parts(config, host, client, (0, 0), hazards, now);
        arena.food = arena.spawn_food(rng).unwrap_or((0, 0));
        arena
    }

    /// Assemble an arena from explicit pieces. The first tick is due at `now`.
    pub fn from_parts(
        config: ArenaConfig,
        host: Agent,
        client: Agent,
        food: Coord,
        hazards: Hazards,
        now: Duration,
    ) -> Self {
        let tick_interval = config.tick_interval(0);
        Self {
            config,
            host,
            client,
            food,
            scores: Scores::default(),
            status: ArenaStatus::Ongoing,
            winner: None,
            hazards,
            tick_interval,
            next_tick_at: now,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn agent(&self, agent: Role) -> &Agent {
        match agent {
            Role::Host => &self.host,
            Role::Client => &self.client,
        }
    }

    fn agent_mut(&mut self, agent: Role) -> &mut Agent {
        match agent {
            Role::Host => &mut self.host,
            Role::Client => &mut self.client,
        }
    }

    pub fn food(&self) -> Coord {
        self.food
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn status(&self) -> ArenaStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn hazards(&self) -> &Hazards {
        &self.hazards
    }

    pub fn hazards_mut(&mut self) -> &mut Hazards {
        &mut self.hazards
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn view(&self) -> ArenaView {
        ArenaView {
            rows: self.config.rows,
            cols: self.config.cols,
            host: self.host.segments(),
            client: self.client.segments(),
            food: self.food,
            scores: self.scores,
            status: self.status,
            winner: self.winner,
            walls: self.hazards.kinds(),
            tick_interval: self.tick_interval,
        }
    }

    /// Record a requested heading; it is applied (or rejected as a reversal)
    /// at the next tick.
    pub fn propose_direction(&mut self, agent: Role, dir: Direction) {
        self.agent_mut(agent).set_desired(dir);
    }

    /// The `snake_init` message that seeds the client mirror.
    pub fn init_message(&self) -> Message {
        Message::SnakeInit {
            rows: self.config.rows,
            cols: self.config.cols,
            h_snake: self.host.segments(),
            c_snake: self.client.segments(),
            food: self.food,
        }
    }

    /// Full `snake_state` snapshot of the current state.
    pub fn snapshot(&self) -> Message {
        Message::SnakeState {
            h_snake: self.host.segments(),
            c_snake: self.client.segments(),
            food: self.food,
            scores: self.scores,
            status: self.status,
            winner: self.winner,
            walls: self.hazards.kinds(),
            tick: self.tick_interval.as_secs_f64(),
        }
    }

    /// Apply a message from the client.
    pub fn handle(&mut self, msg: Message) -> Result<(), SessionError> {
        match msg {
            Message::SnakeDir { dir } => {
                self.client.set_desired(dir);
                Ok(())
            }
            Message::Quit => {
                log::info!("client left the arena");
                self.status = ArenaStatus::Over;
                self.winner = Some(Winner::Host);
                Ok(())
            }
            other => Err(other.unexpected("hosting the arena")),
        }
    }

    /// Run a tick if one is due at `now`, returning the snapshot to broadcast.
    pub fn poll<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> Option<Message> {
        if self.status != ArenaStatus::Ongoing || now < self.next_tick_at {
            return None;
        }
        let snapshot = self.step(now, rng);
        self.next_tick_at = now + self.tick_interval;
        Some(snapshot)
    }

    fn spawn_food<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord> {
        let free: Vec<Coord> = (0..self.config.rows)
            .flat_map(|r| (0..self.config.cols).map(move |c| (r, c)))
            .filter(|&cell| !self.host.contains(cell) && !self.client.contains(cell))
            .collect();
        free.choose(rng).copied()
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn step<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> Message {
        if self.status != ArenaStatus::Ongoing {
            return self.snapshot();
        }
        let (rows, cols) = (self.config.rows, self.config.cols);

        self.host.turn();
        self.client.turn();

        let host_prev = self.host.head();
        let client_prev = self.client.head();
        let (host_head, host_crossed) = self.host.direction.step(host_prev, rows, cols);
        let (client_head, client_crossed) = self.client.direction.step(client_prev, rows, cols);

        let host_ate = host_head == self.food;
        let client_ate = client_head == self.food;

        for (agent, head, ate) in [
            (Role::Host, host_head, host_ate),
            (Role::Client, client_head, client_ate),
        ] {
            let body = &mut self.agent_mut(agent).body;
            body.push_front(head);
            if ate {
                self.scores.bump(agent);
            } else {
                body.pop_back();
            }
        }

        self.tick_interval = self.config.tick_interval(self.scores.max());

        if host_ate || client_ate {
            if let Some(cell) = self.spawn_food(rng) {
                self.food = cell;
            }
        }

        let lethal = |side: Option<Side>| side.is_some_and(|s| self.hazards.is_lethal(s));
        let host_dead = lethal(host_crossed) || self.host.hits_itself();
        let client_dead = lethal(client_crossed) || self.client.hits_itself();

        if host_head != client_head {
            if let Some(idx) = self.client.body.iter().position(|&c| c == host_head) {
                log::debug!("host cuts client at segment {}", idx);
                self.client.truncate_at(idx);
            }
            if let Some(idx) = self.host.body.iter().position(|&c| c == client_head) {
                log::debug!("client cuts host at segment {}", idx);
                self.host.truncate_at(idx);
            }
        }

        let winner = match (host_dead, client_dead) {
            (true, true) => Some(Winner::Draw),
            (true, false) => Some(Winner::Client),
            (false, true) => Some(Winner::Host),
            (false, false) => None,
        };
        if winner.is_some() {
            log::info!("arena over after {} ticks: {:?}", self.ticks + 1, winner);
            self.status = ArenaStatus::Over;
            self.winner = winner;
        }

        self.hazards.advance(now, rng);
        self.ticks += 1;
        if self.status == ArenaStatus::Ongoing
            && self.config.max_ticks.is_some_and(|max| self.ticks >= max)
        {
            let winner = match self.scores.host.cmp(&self.scores.client) {
                std::cmp::Ordering::Greater => Winner::Host,
                std::cmp::Ordering::Less => Winner::Client,
                std::cmp::Ordering::Equal => Winner::Draw,
            };
            log::info!("arena tick limit reached: {:?}", winner);
            self.status = ArenaStatus::Over;
            self.winner = Some(winner);
        }
        self.snapshot()
    }
}

/// The client's read-only copy of the arena.
#[derive(Debug, Clone, Default)]
pub struct ArenaMirror {
    view: Option<ArenaView>,
    /// The host sent `quit`, possibly before `snake_init`.
    forfeited: bool,
}

impl ArenaMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until `snake_init` arrives.
    pub fn view(&self) -> Option<&ArenaView> {
        self.view.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.forfeited
            || self
                .view
                .as_ref()
                .is_some_and(|v| v.status == ArenaStatus::Over)
    }

    /// Winner as far as the mirror knows. A `quit` from the host counts for
    /// the client even when no arena was ever seeded.
    pub fn winner(&self) -> Option<Winner> {
        if self.forfeited {
            return Some(Winner::Client);
        }
        self.view.as_ref().and_then(|v| v.winner)
    }

    /// The `snake_dir` message asking the host to turn our agent.
    pub fn propose_direction(&self, dir: Direction) -> Message {
        Message::SnakeDir { dir }
    }

    /// Apply a message from the host.
    pub fn handle(&mut self, msg: Message) -> Result<(), SessionError> {
        match msg {
            Message::SnakeInit {
                rows,
                cols,
                h_snake,
                c_snake,
                food,
            } => {
                if rows == 0 || cols == 0 || h_snake.is_empty() || c_snake.is_empty() {
                    return Err(SessionError::violation("snake_init with an empty arena"));
                }
                self.view = Some(ArenaView {
                    rows,
                    cols,
                    host: h_snake,
                    client: c_snake,
                    food,
                    scores: Scores::default(),
                    status: ArenaStatus::Ongoing,
                    winner: None,
                    walls: WallKinds::default(),
                    tick_interval: Duration::ZERO,
                });
                Ok(())
            }
            Message::SnakeState {
                h_snake,
                c_snake,
                food,
                scores,
                status,
                winner,
                walls,
                tick,
            } => {
                let view = self
                    .view
                    .as_mut()
                    .ok_or_else(|| SessionError::violation("snake_state before snake_init"))?;
                view.host = h_snake;
                view.client = c_snake;
                view.food = food;
                view.scores = scores;
                view.status = status;
                view.winner = winner;
                view.walls = walls;
                view.tick_interval = Duration::try_from_secs_f64(tick).unwrap_or_default();
                Ok(())
            }
            Message::Quit => {
                log::info!("host left the arena");
                self.forfeited = true;
                if let Some(view) = self.view.as_mut() {
                    view.status = ArenaStatus::Over;
                    view.winner = Some(Winner::Client);
                }
                Ok(())
            }
            other => Err(other.unexpected("mirroring the arena")),
        }
    }
}
