use rand::{seq::SliceRandom, Rng};

use crate::grid::{Grid, GridPosition};
use crate::snake::Snake;

const MAX_SAMPLE_ATTEMPTS: usize = 64;

/// Picks a random free cell for the next piece of food.
///
/// Samples uniformly and rejects cells on the snake. Once the sampling budget
/// is spent (crowded boards), falls back to choosing among the enumerated free
/// cells. Returns `None` only when the snake covers the whole grid.
pub fn spawn_food<R: Rng>(snake: &Snake, grid: Grid, rng: &mut R) -> Option<GridPosition> {
    if grid.width <= 0 || grid.height <= 0 {
        return None;
    }

    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let candidate = GridPosition::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
        if !snake.occupies(candidate) {
            return Some(candidate);
        }
    }

    let choices: Vec<GridPosition> = grid.cells().filter(|pos| !snake.occupies(*pos)).collect();
    choices.choose(rng).copied()
}
