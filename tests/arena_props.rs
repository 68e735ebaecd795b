use std::time::Duration;

use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use versus::{
    ArenaConfig, ArenaHost, ArenaStatus, Coord, Direction, Role, MAX_OPEN_SIDES,
};

fn adjacent(a: Coord, b: Coord, rows: usize, cols: usize) -> bool {
    Direction::ALL
        .into_iter()
        .any(|d| d.step(b, rows, cols).0 == a)
}

fn contiguous(body: &[Coord], rows: usize, cols: usize) -> bool {
    body.windows(2).all(|w| adjacent(w[0], w[1], rows, cols))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arena_invariants_hold_every_tick(seed in any::<u64>(), ticks in 1usize..200) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let config = ArenaConfig::default();
        let (rows, cols) = (config.rows, config.cols);
        let mut arena = ArenaHost::new(config, Duration::ZERO, &mut rng);
        let mut now = Duration::ZERO;

        for _ in 0..ticks {
            for role in [Role::Host, Role::Client] {
                if rng.random_bool(0.3) {
                    let dir = Direction::ALL[rng.random_range(0..4)];
                    arena.propose_direction(role, dir);
                }
            }
            let before = arena.scores();
            let lens = (arena.agent(Role::Host).len(), arena.agent(Role::Client).len());
            arena.step(now, &mut rng);
            now += arena.tick_interval();

            let after = arena.scores();
            prop_assert!(after.host >= before.host && after.host <= before.host + 1);
            prop_assert!(after.client >= before.client && after.client <= before.client + 1);
            prop_assert!(arena.agent(Role::Host).len() <= lens.0 + 1);
            prop_assert!(arena.agent(Role::Client).len() <= lens.1 + 1);
            for role in [Role::Host, Role::Client] {
                let body = arena.agent(role).segments();
                prop_assert!(!body.is_empty());
                prop_assert!(contiguous(&body, rows, cols));
                prop_assert!(body.iter().all(|&(r, c)| r < rows && c < cols));
            }
            prop_assert!(arena.hazards().open_count() <= MAX_OPEN_SIDES);
            prop_assert!(arena.tick_interval() >= arena.config().min_interval);

            if arena.status() == ArenaStatus::Over {
                prop_assert!(arena.winner().is_some());
                break;
            }
            let food = arena.food();
            prop_assert!(!arena.agent(Role::Host).contains(food));
            prop_assert!(!arena.agent(Role::Client).contains(food));
            prop_assert_eq!(arena.winner(), None);
        }
    }

    #[test]
    fn reversal_never_applies(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut arena = ArenaHost::new(ArenaConfig::default(), Duration::ZERO, &mut rng);
        let heading = arena.agent(Role::Host).direction();
        arena.propose_direction(Role::Host, heading.opposite());
        arena.step(Duration::ZERO, &mut rng);
        prop_assert_eq!(arena.agent(Role::Host).direction(), heading);
    }
}
