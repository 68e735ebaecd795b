use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use versus::{
    Agent, ArenaConfig, ArenaHost, ArenaMirror, ArenaStatus, Direction, Hazards, Message, Role,
    SessionError, Side, WallState, Winner,
};

fn config() -> ArenaConfig {
    ArenaConfig::default()
}

fn host_right() -> Agent {
    Agent::new([(5, 5), (5, 4), (5, 3), (5, 2)], Direction::Right)
}

fn client_left() -> Agent {
    Agent::new([(10, 20), (10, 21), (10, 22), (10, 23)], Direction::Left)
}

fn arena(host: Agent, client: Agent, food: (usize, usize)) -> ArenaHost {
    let config = config();
    let hazards = Hazards::dormant(&config);
    ArenaHost::from_parts(config, host, client, food, hazards, Duration::ZERO)
}

#[test]
fn test_plain_move_preserves_lengths() {
    let mut rng = SmallRng::seed_from_u64(1);
    let mut arena = arena(host_right(), client_left(), (0, 0));
    arena.step(Duration::ZERO, &mut rng);

    assert_eq!(arena.agent(Role::Host).segments(), vec![(5, 6), (5, 5), (5, 4), (5, 3)]);
    assert_eq!(
        arena.agent(Role::Client).segments(),
        vec![(10, 19), (10, 20), (10, 21), (10, 22)]
    );
    assert_eq!(arena.scores().host, 0);
    assert_eq!(arena.food(), (0, 0));
    assert_eq!(arena.status(), ArenaStatus::Ongoing);
}

#[test]
fn test_eating_grows_scores_and_moves_food() {
    let mut rng = SmallRng::seed_from_u64(2);
    let mut arena = arena(host_right(), client_left(), (5, 6));
    let base = arena.tick_interval();
    arena.step(Duration::ZERO, &mut rng);

    let host = arena.agent(Role::Host);
    assert_eq!(host.len(), 5);
    assert_eq!(host.head(), (5, 6));
    assert_eq!(arena.scores().host, 1);
    assert_eq!(arena.scores().client, 0);
    assert_eq!(arena.agent(Role::Client).len(), 4);
    let food = arena.food();
    assert!(!arena.agent(Role::Host).contains(food));
    assert!(!arena.agent(Role::Client).contains(food));
    assert_eq!(arena.tick_interval(), base - config().speed_step);
}

#[test]
fn test_reversal_is_ignored() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut arena = arena(host_right(), client_left(), (0, 0));
    arena.propose_direction(Role::Host, Direction::Left);
    arena.step(Duration::ZERO, &mut rng);
    assert_eq!(arena.agent(Role::Host).head(), (5, 6));
    assert_eq!(arena.agent(Role::Host).direction(), Direction::Right);

    arena.propose_direction(Role::Host, Direction::Up);
    arena.step(Duration::ZERO, &mut rng);
    assert_eq!(arena.agent(Role::Host).head(), (4, 6));

    arena.propose_direction(Role::Host, Direction::Down);
    arena.step(Duration::ZERO, &mut rng);
    assert_eq!(arena.agent(Role::Host).head(), (3, 6));
}

fn host_at_top() -> Agent {
    Agent::new([(0, 5), (1, 5), (2, 5), (3, 5)], Direction::Up)
}

#[test]
fn test_crossing_hard_wall_is_fatal() {
    let mut rng = SmallRng::seed_from_u64(4);
    let mut arena = arena(host_at_top(), client_left(), (0, 0));
    arena.step(Duration::ZERO, &mut rng);
    assert_eq!(arena.status(), ArenaStatus::Over);
    assert_eq!(arena.winner(), Some(Winner::Client));
}

#[test]
fn test_crossing_open_wall_is_safe() {
    for state in [
        WallState::Permeable { since: Duration::ZERO, duration: Duration::from_secs(60) },
        WallState::Expiring { since: Duration::ZERO },
    ] {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut arena = arena(host_at_top(), client_left(), (0, 0));
        arena.hazards_mut().force(Side::Top, state);
        arena.step(Duration::ZERO, &mut rng);
        assert_eq!(arena.status(), ArenaStatus::Ongoing);
        assert_eq!(arena.agent(Role::Host).head(), (config().rows - 1, 5));
    }
}

#[test]
fn test_both_fatal_is_draw() {
    let mut rng = SmallRng::seed_from_u64(6);
    let rows = config().rows;
    let client = Agent::new(
        [(rows - 1, 20), (rows - 2, 20), (rows - 3, 20), (rows - 4, 20)],
        Direction::Down,
    );
    let mut arena = arena(host_at_top(), client, (0, 0));
    arena.step(Duration::ZERO, &mut rng);
    assert_eq!(arena.status(), ArenaStatus::Over);
    assert_eq!(arena.winner(), Some(Winner::Draw));
}

#[test]
fn test_self_collision_is_fatal() {
    let mut rng = SmallRng::seed_from_u64(7);
    let host = Agent::new([(5, 5), (5, 6), (6, 6), (6, 5), (6, 4)], Direction::Left);
    let mut arena = arena(host, client_left(), (0, 0));
    arena.propose_direction(Role::Host, Direction::Down);
    arena.step(Duration::ZERO, &mut rng);
    assert_eq!(arena.status(), ArenaStatus::Over);
    assert_eq!(arena.winner(), Some(Winner::Client));
}

#[test]
fn test_head_into_opponent_body_truncates_it() {
    let mut rng = SmallRng::seed_from_u64(8);
    let host = Agent::new([(5, 6), (5, 5), (5, 4), (5, 3)], Direction::Right);
    let client = Agent::new([(6, 7), (5, 7), (4, 7), (3, 7)], Direction::Down);
    let mut arena = arena(host, client, (0, 0));
    arena.step(Duration::ZERO, &mut rng);

    // The client moved to (7,7) first, so (5,7) is its segment 2.
    assert_eq!(arena.agent(Role::Client).segments(), vec![(7, 7), (6, 7)]);
    assert_eq!(arena.agent(Role::Host).len(), 4);
    assert_eq!(arena.status(), ArenaStatus::Ongoing);
    assert_eq!(arena.winner(), None);
}

#[test]
fn test_head_on_head_does_not_truncate() {
    let mut rng = SmallRng::seed_from_u64(9);
    let host = Agent::new([(5, 5), (5, 4), (5, 3), (5, 2)], Direction::Right);
    let client = Agent::new([(5, 7), (5, 8), (5, 9), (5, 10)], Direction::Left);
    let mut arena = arena(host, client, (0, 0));
    arena.step(Duration::ZERO, &mut rng);
    assert_eq!(arena.agent(Role::Host).head(), (5, 6));
    assert_eq!(arena.agent(Role::Client).head(), (5, 6));
    assert_eq!(arena.agent(Role::Host).len(), 4);
    assert_eq!(arena.agent(Role::Client).len(), 4);
    assert_eq!(arena.status(), ArenaStatus::Ongoing);
}

#[test]
fn test_truncate_at_head_keeps_head() {
    let mut agent = host_right();
    agent.truncate_at(0);
    assert_eq!(agent.segments(), vec![(5, 5)]);
    let mut agent = host_right();
    agent.truncate_at(3);
    assert_eq!(agent.segments(), vec![(5, 5), (5, 4), (5, 3)]);
}

#[test]
fn test_tick_interval_bounded_below() {
    let config = config();
    assert_eq!(config.tick_interval(0), config.base_interval);
    assert_eq!(config.tick_interval(2), config.base_interval - config.speed_step * 2);
    assert_eq!(config.tick_interval(1_000), config.min_interval);
}

#[test]
fn test_poll_respects_cadence() {
    let mut rng = SmallRng::seed_from_u64(10);
    let mut arena = arena(host_right(), client_left(), (0, 0));
    assert!(arena.poll(Duration::ZERO, &mut rng).is_some());
    let interval = arena.tick_interval();
    assert!(arena.poll(interval - Duration::from_millis(1), &mut rng).is_none());
    assert!(arena.poll(interval, &mut rng).is_some());
    assert_eq!(arena.ticks(), 2);
}

#[test]
fn test_new_arena_layout() {
    let mut rng = SmallRng::seed_from_u64(11);
    let config = config();
    let arena = ArenaHost::new(config.clone(), Duration::ZERO, &mut rng);
    let row = config.rows / 2;
    assert_eq!(arena.agent(Role::Host).segments(), vec![(row, 3), (row, 2), (row, 1), (row, 0)]);
    let c = config.cols;
    assert_eq!(
        arena.agent(Role::Client).segments(),
        vec![(row, c - 4), (row, c - 3), (row, c - 2), (row, c - 1)]
    );
    assert!(!arena.agent(Role::Host).contains(arena.food()));
    assert!(!arena.agent(Role::Client).contains(arena.food()));
    assert!(arena.hazards().next_event().is_some());
    match arena.init_message() {
        Message::SnakeInit { rows, cols, h_snake, .. } => {
            assert_eq!((rows, cols), (config.rows, config.cols));
            assert_eq!(h_snake.len(), 4);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_client_messages() {
    let mut rng = SmallRng::seed_from_u64(12);
    let mut arena = arena(host_right(), client_left(), (0, 0));
    arena.handle(Message::SnakeDir { dir: Direction::Up }).unwrap();
    assert_eq!(arena.agent(Role::Client).desired(), Direction::Up);
    arena.step(Duration::ZERO, &mut rng);
    assert_eq!(arena.agent(Role::Client).head(), (9, 20));

    assert!(matches!(
        arena.handle(Message::PlaceDone),
        Err(SessionError::ProtocolViolation(_))
    ));

    arena.handle(Message::Quit).unwrap();
    assert_eq!(arena.status(), ArenaStatus::Over);
    assert_eq!(arena.winner(), Some(Winner::Host));
    assert!(arena.poll(Duration::from_secs(10), &mut rng).is_none());
}

#[test]
fn test_tick_limit_awards_on_score() {
    let mut rng = SmallRng::seed_from_u64(13);
    let config = ArenaConfig { max_ticks: Some(1), ..config() };
    let hazards = Hazards::dormant(&config);
    let mut arena =
        ArenaHost::from_parts(config, host_right(), client_left(), (10, 19), hazards, Duration::ZERO);
    arena.step(Duration::ZERO, &mut rng);
    assert_eq!(arena.status(), ArenaStatus::Over);
    assert_eq!(arena.winner(), Some(Winner::Client));
}

#[test]
fn test_mirror_follows_snapshots() {
    let mut rng = SmallRng::seed_from_u64(14);
    let mut host = arena(host_right(), client_left(), (0, 0));
    let mut mirror = ArenaMirror::new();

    assert!(matches!(
        mirror.handle(host.snapshot()),
        Err(SessionError::ProtocolViolation(_))
    ));
    mirror.handle(host.init_message()).unwrap();
    assert_eq!(mirror.view().unwrap().host, host.agent(Role::Host).segments());

    let snapshot = host.step(Duration::ZERO, &mut rng);
    mirror.handle(snapshot).unwrap();
    let view = mirror.view().unwrap();
    assert_eq!(view.host, host.agent(Role::Host).segments());
    assert_eq!(view.client, host.agent(Role::Client).segments());
    let drift = view.tick_interval.as_secs_f64() - host.tick_interval().as_secs_f64();
    assert!(drift.abs() < 1e-6);
    assert_eq!(view.heading(Role::Host), Some(Direction::Right));
    assert_eq!(
        mirror.propose_direction(Direction::Down),
        Message::SnakeDir { dir: Direction::Down }
    );

    mirror.handle(Message::Quit).unwrap();
    assert!(mirror.is_over());
    assert_eq!(mirror.view().unwrap().winner, Some(Winner::Client));
}

#[test]
fn test_mirror_quit_before_init_ends_session() {
    let mut mirror = ArenaMirror::new();
    assert!(!mirror.is_over());
    assert_eq!(mirror.winner(), None);

    mirror.handle(Message::Quit).unwrap();
    assert!(mirror.is_over());
    assert!(mirror.view().is_none());
    assert_eq!(mirror.winner(), Some(Winner::Client));
}
