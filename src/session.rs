use rand::Rng;

use crate::config::GameConfig;
use crate::error::StartError;
use crate::food::spawn_food;
use crate::grid::{Grid, GridPosition};
use crate::snake::{Direction, Snake};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No tick was due.
    Idle,
    Paused,
    Moved,
    FoodEaten { food: GridPosition },
    GameOver(DeathReason),
    /// The snake covers every cell, so no food can be placed.
    BoardFilled,
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickOutcome::GameOver(_) | TickOutcome::BoardFilled)
    }
}

/// State of one game, from start until game over. Restarting builds a new one.
#[derive(Clone, Debug)]
pub struct GameSession {
    grid: Grid,
    snake: Snake,
    food: GridPosition,
    paused: bool,
    player: String,
    initial_length: usize,
}

impl GameSession {
    pub fn new<R: Rng>(player: &str, config: &GameConfig, rng: &mut R) -> Result<Self, StartError> {
        let grid = config.grid();
        let snake = Snake::new(config.start_head(), config.initial_length, Direction::Right);
        let food = spawn_food(&snake, grid, rng).ok_or(StartError::NoRoomForFood)?;

        Ok(GameSession {
            grid,
            snake,
            food,
            paused: false,
            player: player.to_string(),
            initial_length: config.initial_length,
        })
    }

    /// Advances the simulation by exactly one step.
    ///
    /// Order of checks: walls, then food, then the body. Food is never placed
    /// on the body, so a head entering the food cell cannot also be a
    /// self-collision.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> TickOutcome {
        if self.paused {
            return TickOutcome::Paused;
        }

        let new_head = self.snake.next_head();

        if !self.grid.contains(new_head) {
            return TickOutcome::GameOver(DeathReason::WallCollision);
        }

        if new_head == self.food {
            self.snake.grow_to(new_head);
            return match spawn_food(&self.snake, self.grid, rng) {
                Some(food) => {
                    self.food = food;
                    TickOutcome::FoodEaten { food }
                }
                None => TickOutcome::BoardFilled,
            };
        }

        if self.snake.hits_body(new_head) {
            return TickOutcome::GameOver(DeathReason::SelfCollision);
        }

        self.snake.move_to(new_head);
        TickOutcome::Moved
    }

    /// Runs up to `elapsed_ticks` ticks, stopping early on a terminal outcome,
    /// and reports the last outcome.
    pub fn advance<R: Rng>(mut self, elapsed_ticks: u32, rng: &mut R) -> (GameSession, TickOutcome) {
        let mut outcome = TickOutcome::Idle;

        for _ in 0..elapsed_ticks {
            outcome = self.tick(rng);
            if outcome.is_terminal() {
                break;
            }
        }

        (self, outcome)
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.snake.set_direction(direction);
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn score(&self) -> u32 {
        self.snake.len().saturating_sub(self.initial_length) as u32
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> GridPosition {
        self.food
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    #[cfg(test)]
    pub(crate) fn place_food(&mut self, food: GridPosition) {
        self.food = food;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn new_session(rng: &mut StdRng) -> GameSession {
        GameSession::new("Ann", &GameConfig::default(), rng).unwrap()
    }

    // Food parked somewhere off the snake's path along row 10.
    fn park_food(session: &mut GameSession) {
        session.place_food(GridPosition::new(0, 0));
    }

    #[test]
    fn test_new_session_starting_state() {
        let mut rng = StdRng::seed_from_u64(1);
        let session = new_session(&mut rng);

        let body: Vec<_> = session.snake().body().iter().copied().collect();
        assert_eq!(body, vec![GridPosition::new(10, 10), GridPosition::new(9, 10), GridPosition::new(8, 10)]);
        assert_eq!(session.snake().get_direction(), Right);
        assert_eq!(session.score(), 0);
        assert!(!session.is_paused());
        assert!(!session.snake().occupies(session.food()));
    }

    #[test]
    fn test_five_ticks_move_head_right() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut session = new_session(&mut rng);
        park_food(&mut session);

        for _ in 0..5 {
            assert_eq!(session.tick(&mut rng), TickOutcome::Moved);
        }

        assert_eq!(session.snake().head(), GridPosition::new(15, 10));
        assert_eq!(session.snake().len(), 3);
    }

    #[test]
    fn test_eating_food_grows_and_respawns() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = new_session(&mut rng);
        session.place_food(GridPosition::new(11, 10));

        let outcome = session.tick(&mut rng);

        let new_food = match outcome {
            TickOutcome::FoodEaten { food } => food,
            other => panic!("expected FoodEaten, got {:?}", other),
        };
        assert_eq!(session.snake().len(), 4);
        assert_eq!(session.snake().head(), GridPosition::new(11, 10));
        assert_ne!(new_food, GridPosition::new(11, 10));
        assert!(!session.snake().occupies(new_food));
        assert_eq!(session.food(), new_food);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_leaving_the_grid_is_game_over() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut session = new_session(&mut rng);
        park_food(&mut session);

        // Head at x=10, cells 11..=19 are still on the board.
        for _ in 0..9 {
            assert_eq!(session.tick(&mut rng), TickOutcome::Moved);
        }
        assert_eq!(session.snake().head(), GridPosition::new(19, 10));
        assert_eq!(session.tick(&mut rng), TickOutcome::GameOver(DeathReason::WallCollision));
    }

    #[test]
    fn test_turning_into_body_is_game_over() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = new_session(&mut rng);
        park_food(&mut session);

        // Grow to five segments so the loop below closes on a middle segment.
        session.place_food(GridPosition::new(11, 10));
        session.tick(&mut rng);
        session.place_food(GridPosition::new(12, 10));
        session.tick(&mut rng);
        park_food(&mut session);

        session.set_direction(Down);
        assert_eq!(session.tick(&mut rng), TickOutcome::Moved);
        session.set_direction(Left);
        assert_eq!(session.tick(&mut rng), TickOutcome::Moved);
        session.set_direction(Up);
        assert_eq!(session.tick(&mut rng), TickOutcome::GameOver(DeathReason::SelfCollision));
    }

    #[test]
    fn test_reversing_into_neck_is_game_over() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut session = new_session(&mut rng);
        park_food(&mut session);

        session.set_direction(Left);
        assert_eq!(session.tick(&mut rng), TickOutcome::GameOver(DeathReason::SelfCollision));
    }

    #[test]
    fn test_head_may_enter_the_tail_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut session = new_session(&mut rng);
        session.place_food(GridPosition::new(11, 10));
        session.tick(&mut rng);
        park_food(&mut session);

        // Body: (11,10) (10,10) (9,10) (8,10). Circle back onto the tail cell.
        session.set_direction(Down);
        session.tick(&mut rng);
        session.set_direction(Left);
        session.tick(&mut rng);
        session.set_direction(Up);
        // Tail is at (10,10) now, which is exactly where the head is heading.
        assert_eq!(session.snake().body().back(), Some(&GridPosition::new(10, 10)));
        assert_eq!(session.tick(&mut rng), TickOutcome::Moved);
        assert_eq!(session.snake().head(), GridPosition::new(10, 10));
    }

    #[test]
    fn test_paused_tick_changes_nothing() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut session = new_session(&mut rng);
        let before: Vec<_> = session.snake().body().iter().copied().collect();

        assert!(session.toggle_pause());
        assert_eq!(session.tick(&mut rng), TickOutcome::Paused);

        let after: Vec<_> = session.snake().body().iter().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_advance_stops_at_terminal_outcome() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = new_session(&mut rng);
        park_food(&mut session);

        let (session, outcome) = session.advance(50, &mut rng);
        assert_eq!(outcome, TickOutcome::GameOver(DeathReason::WallCollision));
        assert_eq!(session.snake().head(), GridPosition::new(19, 10));

        let (_, outcome) = session.advance(0, &mut rng);
        assert_eq!(outcome, TickOutcome::Idle);
    }

    #[test]
    fn test_random_walk_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(10);
        let directions = [Up, Down, Left, Right];

        for _ in 0..50 {
            let mut session = new_session(&mut rng);
            loop {
                let dir = directions[rng.gen_range(0..directions.len())];
                session.set_direction(dir);
                let before = session.snake().len();

                match session.tick(&mut rng) {
                    TickOutcome::GameOver(_) | TickOutcome::BoardFilled => break,
                    TickOutcome::FoodEaten { .. } => assert_eq!(session.snake().len(), before + 1),
                    _ => assert_eq!(session.snake().len(), before),
                }

                let grid = session.grid();
                assert!(session.snake().body().iter().all(|seg| grid.contains(*seg)));
                assert!(!session.snake().occupies(session.food()));
            }
        }
    }
}
