use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use versus::{Board, BoardError, Cell, Orientation, BOARD_SIZE, NUM_SHIPS, SHIPS};

fn random_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new();
    board.place_remaining_randomly(&mut rng).unwrap();
    let attacks = rng.random_range(0..BOARD_SIZE * 3);
    for _ in 0..attacks {
        let r = rng.random_range(0..BOARD_SIZE);
        let c = rng.random_range(0..BOARD_SIZE);
        board.receive_attack(r, c).unwrap();
    }
    board
}

/// Mostly on or near the board, sometimes anywhere in `usize`.
fn coordinate() -> impl Strategy<Value = usize> {
    prop_oneof![
        4 => 0..BOARD_SIZE + 2,
        1 => (usize::MAX - BOARD_SIZE)..=usize::MAX,
        1 => any::<usize>(),
    ]
}

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn place_fails_iff_out_of_bounds_or_overlapping(
        seed in any::<u64>(),
        index in 0..NUM_SHIPS,
        row in coordinate(),
        col in coordinate(),
        orient in orientation(),
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new();
        // Pre-place a random subset of the other ships.
        for i in (0..NUM_SHIPS).filter(|&i| i != index) {
            if rng.random() {
                let (r, c, o) = board.random_placement(&mut rng, i).unwrap();
                board.place(i, r, c, o).unwrap();
            }
        }
        let size = SHIPS[index].size();
        let cells: Vec<Option<(usize, usize)>> = (0..size)
            .map(|k| match orient {
                Orientation::Horizontal => col.checked_add(k).map(|c| (row, c)),
                Orientation::Vertical => row.checked_add(k).map(|r| (r, col)),
            })
            .collect();
        let in_bounds = cells
            .iter()
            .all(|cell| cell.is_some_and(|(r, c)| r < BOARD_SIZE && c < BOARD_SIZE));
        let cells: Vec<(usize, usize)> = cells.into_iter().flatten().collect();
        let overlaps = in_bounds && cells.iter().any(|&(r, c)| board.grid()[r][c] == Cell::Ship);
        let ships_before = board.ships().len();
        let ship_cells_before = board.grid().iter().flatten().filter(|c| **c == Cell::Ship).count();

        let result = board.place(index, row, col, orient);
        if !in_bounds {
            prop_assert_eq!(result.clone(), Err(BoardError::ShipOutOfBounds));
        } else if overlaps {
            prop_assert_eq!(result.clone(), Err(BoardError::ShipOverlaps));
        } else {
            prop_assert_eq!(result.clone(), Ok(()));
        }
        let ship_cells_after = board.grid().iter().flatten().filter(|c| **c == Cell::Ship).count();
        if result.is_ok() {
            prop_assert_eq!(board.ships().len(), ships_before + 1);
            prop_assert_eq!(ship_cells_after, ship_cells_before + size);
        } else {
            prop_assert_eq!(board.ships().len(), ships_before);
            prop_assert_eq!(ship_cells_after, ship_cells_before);
        }
    }

    #[test]
    fn repeated_attack_is_idempotent(seed in any::<u64>(), row in 0..BOARD_SIZE, col in 0..BOARD_SIZE) {
        let mut board = random_board(seed);
        board.receive_attack(row, col).unwrap();
        let snapshot = board.clone();
        let again = board.receive_attack(row, col).unwrap();
        prop_assert!(again.repeated);
        prop_assert!(!again.hit);
        prop_assert_eq!(again.sunk, None);
        prop_assert_eq!(board, snapshot);
    }

    #[test]
    fn all_sunk_iff_every_ship_fully_hit(seed in any::<u64>()) {
        let board = random_board(seed);
        let expected = board.ships().iter().all(|s| s.hits() == s.ship_type().size());
        prop_assert_eq!(board.all_sunk(), expected);
    }
}
