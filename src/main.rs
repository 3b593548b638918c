mod config;
mod error;
mod food;
mod game;
mod grid;
mod ledger;
mod lifecycle;
mod session;
mod snake;
mod term;

use std::{fs::File, path::Path, process::ExitCode};

use log::{error, info};
use simplelog::{Config, WriteLogger};

use crate::config::{GameConfig, CONFIG_FILE};
use crate::error::AppError;
use crate::ledger::JsonFileStore;
use crate::lifecycle::Lifecycle;

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The terminal has been restored by now, or was never taken over
            error!("{}", e);
            eprintln!("snake: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = GameConfig::load(Path::new(CONFIG_FILE))?;

    // stdout belongs to the game screen, so logs go to a file
    WriteLogger::init(config.log_level(), Config::default(), File::create(&config.log_file)?)?;
    info!("Starting snake on a {}x{} grid", config.grid_width, config.grid_height);

    let store = JsonFileStore::new(config.scores_file.clone());
    info!("Scores are kept in {}", store.path().display());

    let lifecycle = Lifecycle::new(config, store, rand::thread_rng())?;
    let mut game = game::SnakeGame::new(lifecycle)?;
    game.run()?;

    info!("Bye");
    Ok(())
}
