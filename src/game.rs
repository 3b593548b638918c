use std::{thread::sleep, time::{Duration, Instant}};

use crate::{Coords, TermInt};
use crate::error::{AppError, StartError};
use crate::grid::Grid;
use crate::ledger::ScoreStore;
use crate::lifecycle::{GameOverChoice, Input, Lifecycle, Phase};
use crate::session::TickOutcome;
use crate::snake::Direction::*;
use crate::term::TermManager;

use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use rand::rngs::ThreadRng;

const POLL_INTERVAL_MS: u64 = 5;
const CELL_WIDTH: TermInt = 2;
const PANEL_GAP: TermInt = 3;
const PANEL_WIDTH: TermInt = 28;
const MAX_NAME_LEN: usize = 20;

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

enum TitleAction {
    Start(String),
    Leaderboard,
    Quit,
}

enum PlayEnd {
    /// Back to the title screen.
    Exited,
    Terminated,
    Quit,
}

pub struct SnakeGame<S: ScoreStore> {
    term: TermManager,
    lifecycle: Lifecycle<S, ThreadRng>,
    board_size: Coords,
}

impl<S: ScoreStore> SnakeGame<S> {
    pub fn new(lifecycle: Lifecycle<S, ThreadRng>) -> Result<Self, AppError> {
        let term = TermManager::new()?;
        let grid = lifecycle.config().grid();
        let board_size = board_size(grid).ok_or(AppError::BoardTooLarge { width: grid.width, height: grid.height })?;
        Ok(SnakeGame { term, lifecycle, board_size })
    }

    /// Runs until the player quits, then restores the terminal and saves scores.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.check_terminal_size()?;
        self.term.setup()?;

        let result = self.run_screens();
        let restored = self.term.restore();
        let saved = self.lifecycle.shutdown();

        result?;
        restored?;
        saved?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn run_screens(&mut self) -> Result<(), AppError> {
        let mut name = String::new();

        loop {
            match self.title_screen(&mut name)? {
                TitleAction::Quit => return Ok(()),
                TitleAction::Leaderboard => self.leaderboard_screen()?,
                TitleAction::Start(player) => {
                    match self.lifecycle.handle_input(Input::StartRequested(player)) {
                        Ok(()) => {}
                        Err(AppError::Start(e @ StartError::BlankName)) => {
                            self.term.show_message(&[&*e.to_string(), "", "Press any key"])?;
                            self.term.read_key_blocking()?;
                            continue;
                        }
                        Err(e) => return Err(e),
                    }

                    match self.play()? {
                        PlayEnd::Exited => continue,
                        PlayEnd::Terminated | PlayEnd::Quit => return Ok(()),
                    }
                }
            }
        }
    }

    fn check_terminal_size(&self) -> Result<(), AppError> {
        let needed = (
            self.board_size.0 + PANEL_GAP + PANEL_WIDTH,
            self.board_size.1.max(self.lifecycle.config().top_players as TermInt + 6),
        );
        let actual = self.term.get_terminal_size();

        if actual.0 < needed.0 || actual.1 < needed.1 {
            return Err(AppError::TerminalTooSmall { actual, needed });
        }
        Ok(())
    }

    fn title_screen(&mut self, name: &mut String) -> Result<TitleAction, AppError> {
        self.term.clear()?;
        self.term.set_message_center((self.board_size.0 / 2, self.board_size.1 / 2));
        self.term.draw_borders((0, 0), self.board_size)?;
        self.draw_panel()?;

        let lines = [
            "S N A K E",
            "",
            "Arrow keys or WASD to move",
            "Space to pause",
            "Esc to leave a game",
            "Esc here or Ctrl+C to quit",
            "",
            "Tab to see all players",
            "",
            "Type your name, then Enter",
        ];
        for (i, line) in lines.iter().enumerate() {
            self.term.print_str_at((3, 2 + i as TermInt), line, self.board_size.0 - 4)?;
        }

        let name_row = 3 + lines.len() as TermInt;
        loop {
            self.term.print_str_at((3, name_row), &format!("> {}_", name), self.board_size.0 - 4)?;
            self.term.flush()?;

            let key = self.term.read_key_blocking()?;
            if let Some(action) = title_key(&key, name) {
                return Ok(action);
            }
        }
    }

    fn leaderboard_screen(&mut self) -> Result<(), AppError> {
        self.term.clear()?;
        let ledger = self.lifecycle.stored_ledger()?;
        let (width, height) = self.term.get_terminal_size();

        self.term.print_str_at((2, 1), "All players", width - 2)?;

        if ledger.is_empty() {
            self.term.print_str_at((2, 3), "No scores yet", width - 2)?;
        }

        let rows = height.saturating_sub(5) as usize;
        for (i, (name, score)) in ledger.all().iter().take(rows).enumerate() {
            let line = format!("{:>3}. {}: {}", i + 1, name, score);
            self.term.print_str_at((2, 3 + i as TermInt), &line, width - 2)?;
        }

        self.term.print_str_at((2, height - 1), "Press any key to go back", width - 2)?;
        self.term.flush()?;
        self.term.read_key_blocking()?;
        Ok(())
    }

    fn play(&mut self) -> Result<PlayEnd, AppError> {
        self.draw_play_screen()?;

        let interval = self.lifecycle.config().tick_interval();
        let mut last_tick = Instant::now();

        loop {
            sleep(Duration::from_millis(POLL_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                if is_ctrl_c(&key_ev) {
                    return Ok(PlayEnd::Quit);
                }

                match play_input(&key_ev) {
                    Some(Input::ExitRequested) => {
                        self.lifecycle.handle_input(Input::ExitRequested)?;
                        return Ok(PlayEnd::Exited);
                    }
                    Some(Input::TogglePause) => {
                        self.lifecycle.handle_input(Input::TogglePause)?;
                        self.show_pause_state()?;
                    }
                    Some(input) => self.lifecycle.handle_input(input)?,
                    None => {}
                }
            }

            let elapsed_ticks = (last_tick.elapsed().as_millis() / interval.as_millis()) as u32;
            if elapsed_ticks == 0 {
                continue;
            }
            last_tick += interval * elapsed_ticks;

            let outcome = self.lifecycle.on_timer(elapsed_ticks)?;
            match outcome {
                TickOutcome::Idle | TickOutcome::Paused => {}
                TickOutcome::Moved | TickOutcome::FoodEaten { .. } => {
                    self.draw_board()?;
                    self.draw_panel()?;
                    self.term.flush()?;
                }
                TickOutcome::GameOver(_) | TickOutcome::BoardFilled => {
                    let choice = self.game_over(outcome)?;
                    self.lifecycle.resolve_game_over(choice)?;

                    if choice == GameOverChoice::Terminate {
                        return Ok(PlayEnd::Terminated);
                    }
                    self.draw_play_screen()?;
                    last_tick = Instant::now();
                }
            }
        }
    }

    fn game_over(&mut self, outcome: TickOutcome) -> Result<GameOverChoice, AppError> {
        let win = outcome == TickOutcome::BoardFilled;
        let (player, score) = match self.lifecycle.session() {
            Some(session) => (session.player().to_string(), session.score()),
            None => return Ok(GameOverChoice::Terminate),
        };
        let best = self.lifecycle.ledger().best(&player).unwrap_or(score);

        if !win {
            let body: Vec<Coords> = self.lifecycle.session()
                .map(|session| session.snake().body().iter().map(|pos| cell_coords(pos.x, pos.y)).collect())
                .unwrap_or_default();
            for pos in body {
                self.print_cell(pos, DEAD_SNAKE_CHAR)?;
            }
        }
        self.draw_panel()?;

        let s = if win {"You won!"} else {"Game over!"};
        self.term.show_message(&[
            s,
            &*format!("Score: {}", score),
            &*format!("Best: {}", best),
            "",
            "Play again? (y/n)",
        ])?;

        loop {
            let key = self.term.read_key_blocking()?;
            if is_ctrl_c(&key) {
                return Ok(GameOverChoice::Terminate);
            }
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => return Ok(GameOverChoice::Restart),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(GameOverChoice::Terminate),
                _ => {}
            }
        }
    }

    fn show_pause_state(&mut self) -> Result<(), AppError> {
        self.draw_panel()?;

        match self.lifecycle.phase() {
            Phase::Paused => self.term.show_message(&["Paused", "Press Space to resume", "or Esc to leave"])?,
            _ => self.term.hide_message()?,
        }
        Ok(())
    }

    fn draw_play_screen(&mut self) -> Result<(), AppError> {
        self.term.clear()?;
        self.term.set_message_center((self.board_size.0 / 2, self.board_size.1 / 2));
        self.term.draw_borders((0, 0), self.board_size)?;
        self.draw_board()?;
        self.draw_panel()?;
        self.term.flush()?;
        Ok(())
    }

    fn draw_board(&mut self) -> Result<(), AppError> {
        let session = match self.lifecycle.session() {
            Some(session) => session,
            None => return Ok(()),
        };
        let grid = session.grid();
        let food = session.food();
        let head_char = session.snake().head_char();
        let body: Vec<Coords> = session.snake().body().iter().map(|pos| cell_coords(pos.x, pos.y)).collect();

        for y in 0..grid.height {
            for x in 0..grid.width {
                self.print_cell(cell_coords(x, y), ' ')?;
            }
        }

        self.print_cell(cell_coords(food.x, food.y), FOOD_CHAR)?;

        for (i, pos) in body.iter().enumerate() {
            let ch = if i == 0 {head_char} else {SNAKE_BODY_CHAR};
            self.print_cell(*pos, ch)?;
        }
        Ok(())
    }

    /// Player, score and the top of the ledger, to the right of the board.
    fn draw_panel(&mut self) -> Result<(), AppError> {
        let x = self.board_size.0 + PANEL_GAP;
        let (player, score) = match self.lifecycle.session() {
            Some(session) => (session.player().to_string(), session.score().to_string()),
            None => ("-".to_string(), "-".to_string()),
        };

        let status = match self.lifecycle.phase() {
            Phase::Running => "playing",
            Phase::Paused => "paused",
            Phase::GameOver => "game over",
            Phase::NotStarted | Phase::Terminated => "",
        };

        let mut lines = vec![
            format!("Player: {}", player),
            format!("Score: {}", score),
            status.to_string(),
            String::new(),
            "Top players".to_string(),
        ];
        let top = self.lifecycle.top_players();
        let rows = self.lifecycle.config().top_players;
        for i in 0..rows {
            lines.push(match top.get(i) {
                Some((name, score)) => format!("{:>2}. {}: {}", i + 1, name, score),
                None => String::new(),
            });
        }

        for (i, line) in lines.iter().enumerate() {
            self.term.print_str_at((x, 1 + i as TermInt), line, PANEL_WIDTH)?;
        }
        Ok(())
    }

    fn print_cell(&mut self, pos: Coords, ch: char) -> Result<(), AppError> {
        for dx in 0..CELL_WIDTH {
            self.term.print_at((pos.0 + dx, pos.1), ch)?;
        }
        Ok(())
    }
}

/// Outer size of the bordered board, or `None` if it does not fit terminal coordinates.
fn board_size(grid: Grid) -> Option<Coords> {
    let width = TermInt::try_from(grid.width).ok()?.checked_mul(CELL_WIDTH)?.checked_add(2)?;
    let height = TermInt::try_from(grid.height).ok()?.checked_add(2)?;
    Some((width, height))
}

/// Key mapping while a game is on screen. Ctrl+C is handled by the caller.
fn play_input(key: &KeyEvent) -> Option<Input> {
    match key.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Input::Move(Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Input::Move(Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Input::Move(Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Input::Move(Right)),
        KeyCode::Char(' ') => Some(Input::TogglePause),
        KeyCode::Esc => Some(Input::ExitRequested),
        _ => None,
    }
}

/// Name entry on the title screen. There is no game to leave here, so Esc quits.
fn title_key(key: &KeyEvent, name: &mut String) -> Option<TitleAction> {
    if is_ctrl_c(key) {
        return Some(TitleAction::Quit);
    }

    match key.code {
        KeyCode::Enter => return Some(TitleAction::Start(name.clone())),
        KeyCode::Tab => return Some(TitleAction::Leaderboard),
        KeyCode::Esc => return Some(TitleAction::Quit),
        KeyCode::Backspace => {
            name.pop();
        }
        KeyCode::Char(c) if !c.is_control() && name.chars().count() < MAX_NAME_LEN => name.push(c),
        _ => {}
    }
    None
}

/// Terminal position of a grid cell, inside the board border.
fn cell_coords(x: i32, y: i32) -> Coords {
    (1 + x as TermInt * CELL_WIDTH, 1 + y as TermInt)
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_are_two_columns_wide() {
        assert_eq!(cell_coords(0, 0), (1, 1));
        assert_eq!(cell_coords(19, 19), (39, 20));
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_board_size_fits_terminal_coordinates() {
        assert_eq!(board_size(Grid::new(20, 20)), Some((42, 22)));
        assert_eq!(board_size(Grid::new(40000, 20)), None);
        assert_eq!(board_size(Grid::new(20, 70000)), None);
        assert_eq!(board_size(Grid::new(-1, 20)), None);
    }

    #[test]
    fn test_play_keys_map_to_inputs() {
        assert_eq!(play_input(&key(KeyCode::Up)), Some(Input::Move(Up)));
        assert_eq!(play_input(&key(KeyCode::Char('a'))), Some(Input::Move(Left)));
        assert_eq!(play_input(&key(KeyCode::Char(' '))), Some(Input::TogglePause));
        assert_eq!(play_input(&key(KeyCode::Esc)), Some(Input::ExitRequested));
        assert_eq!(play_input(&key(KeyCode::Char('q'))), None);
    }

    #[test]
    fn test_title_keys_edit_name_and_quit() {
        let mut name = String::new();
        assert!(title_key(&key(KeyCode::Char('A')), &mut name).is_none());
        assert!(title_key(&key(KeyCode::Char('n')), &mut name).is_none());
        assert!(title_key(&key(KeyCode::Char('x')), &mut name).is_none());
        assert!(title_key(&key(KeyCode::Backspace), &mut name).is_none());
        assert_eq!(name, "An");

        assert!(matches!(title_key(&key(KeyCode::Enter), &mut name), Some(TitleAction::Start(n)) if n == "An"));
        assert!(matches!(title_key(&key(KeyCode::Tab), &mut name), Some(TitleAction::Leaderboard)));
        assert!(matches!(title_key(&key(KeyCode::Esc), &mut name), Some(TitleAction::Quit)));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(title_key(&ctrl_c, &mut name), Some(TitleAction::Quit)));
        assert_eq!(name, "An");
    }

    #[test]
    fn test_ctrl_c_detection() {
        assert!(is_ctrl_c(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_ctrl_c(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
