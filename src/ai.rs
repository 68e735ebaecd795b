// Decision logic for the automatic player: probability-density targeting in
// combat and greedy steering in the arena.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::arena::{ArenaView, Direction};
use crate::board::TargetBoard;
use crate::config::{BOARD_SIZE, NUM_SHIPS};
use crate::protocol::{Coord, Role};
use crate::ship::Orientation;

type Matrix = [[f64; BOARD_SIZE]; BOARD_SIZE];

/// Placements covering more observed hits get this much more weight per hit,
/// so that squares next to confirmed hits stand out.
const HIT_BIAS: f64 = 10.0;

/// Lower temperature biases sampling towards the most likely cells.
const TEMPERATURE: f64 = 0.5;

/// Relative likelihood that each unresolved square holds part of a ship not yet
/// reported sunk. Resolved squares are zero. The matrix sums to one unless
/// every square is resolved.
pub fn calc_pdf(known: &TargetBoard, remaining_lengths: &[usize; NUM_SHIPS]) -> Matrix {
    let mut matrix = [[0.0f64; BOARD_SIZE]; BOARD_SIZE];

    for &len in remaining_lengths.iter().filter(|&&len| len > 0 && len <= BOARD_SIZE) {
        for orient in [Orientation::Horizontal, Orientation::Vertical] {
            let (max_row, max_col) = match orient {
                Orientation::Vertical => (BOARD_SIZE - len + 1, BOARD_SIZE),
                Orientation::Horizontal => (BOARD_SIZE, BOARD_SIZE - len + 1),
            };
            for r in 0..max_row {
                for c in 0..max_col {
                    let cells = (0..len).map(|k| match orient {
                        Orientation::Vertical => (r + k, c),
                        Orientation::Horizontal => (r, c + k),
                    });
                    if cells.clone().any(|(rr, cc)| known.is_miss(rr, cc)) {
                        continue;
                    }
                    let n_hits = cells.clone().filter(|&(rr, cc)| known.is_hit(rr, cc)).count();
                    let weight = HIT_BIAS.powi(n_hits as i32);
                    for (rr, cc) in cells {
                        if !known.is_resolved(rr, cc) {
                            matrix[rr][cc] += weight;
                        }
                    }
                }
            }
        }
    }

    normalize(matrix, known)
}

fn normalize(mut matrix: Matrix, known: &TargetBoard) -> Matrix {
    let total: f64 = matrix.iter().flatten().sum();
    if total == 0.0 {
        // Nothing fits any more (e.g. inconsistent sunk reports): spread the
        // mass evenly over what is left.
        let open: Vec<Coord> = known.unresolved().collect();
        if !open.is_empty() {
            let uniform = 1.0 / open.len() as f64;
            for (r, c) in open {
                matrix[r][c] = uniform;
            }
        }
        return matrix;
    }
    for v in matrix.iter_mut().flatten() {
        *v /= total;
    }
    matrix
}

/// Sample a coordinate from a probability matrix sharpened by `temperature`.
/// Returns `None` when the matrix has no mass.
pub fn sample_pdf<R: Rng + ?Sized>(pdf: &Matrix, temperature: f64, rng: &mut R) -> Option<Coord> {
    let mut adjusted = [[0.0f64; BOARD_SIZE]; BOARD_SIZE];
    let mut total = 0.0;
    for r in 0..BOARD_SIZE {
        for c in 0..BOARD_SIZE {
            let v = pdf[r][c].powf(1.0 / temperature);
            adjusted[r][c] = v;
            total += v;
        }
    }
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let threshold: f64 = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last = None;
    for r in 0..BOARD_SIZE {
        for c in 0..BOARD_SIZE {
            if adjusted[r][c] <= 0.0 {
                continue;
            }
            cumulative += adjusted[r][c];
            last = Some((r, c));
            if threshold < cumulative {
                return last;
            }
        }
    }
    last
}

/// Pick the next target for `known`, or `None` once every square is resolved.
pub fn calc_pdf_and_guess<R: Rng + ?Sized>(known: &TargetBoard, rng: &mut R) -> Option<Coord> {
    let pdf = calc_pdf(known, &known.remaining_lengths());
    sample_pdf(&pdf, TEMPERATURE, rng).or_else(|| {
        let open: Vec<Coord> = known.unresolved().collect();
        open.choose(rng).copied()
    })
}

fn is_safe(view: &ArenaView, body: &[Coord], dir: Direction, from: Coord) -> Option<Coord> {
    let (next, crossed) = dir.step(from, view.rows, view.cols);
    if crossed.is_some_and(|side| view.walls.get(side).is_lethal()) {
        return None;
    }
    // The tail moves away this tick unless we eat.
    let solid = if next == view.food {
        body
    } else {
        &body[..body.len().saturating_sub(1)]
    };
    if solid.contains(&next) {
        return None;
    }
    Some(next)
}

fn distance(a: Coord, b: Coord) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Greedy heading for agent `me`: stay alive first, keep an exit open next,
/// then close in on the food.
pub fn steer(view: &ArenaView, me: Role) -> Option<Direction> {
    let body = view.body(me);
    let head = *body.first()?;
    let heading = view.heading(me);

    Direction::ALL
        .into_iter()
        .filter(|&d| heading != Some(d.opposite()))
        .filter_map(|d| is_safe(view, body, d, head).map(|next| (d, next)))
        .map(|(d, next)| {
            let exits = Direction::ALL
                .into_iter()
                .filter(|&d2| d2 != d.opposite())
                .filter(|&d2| is_safe(view, body, d2, next).is_some())
                .count();
            let trapped = exits == 0;
            let keep = heading != Some(d);
            (trapped, distance(next, view.food), keep, d)
        })
        .min()
        .map(|(_, _, _, d)| d)
        .or(heading)
}
