use std::{fs, io::ErrorKind, path::{Path, PathBuf}, str::FromStr, time::Duration};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{Grid, GridPosition};

pub const CONFIG_FILE: &str = "snake_config.json";

// Keeps the rendered board well inside terminal coordinates.
pub const MAX_GRID_SIDE: i32 = 200;
pub const MAX_TOP_PLAYERS: usize = 100;

pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_width: i32,
    pub grid_height: i32,
    pub tick_ms: u64,
    pub initial_length: usize,
    pub start_x: i32,
    pub start_y: i32,
    pub scores_file: PathBuf,
    pub log_file: PathBuf,
    pub top_players: usize,
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            tick_ms: 100,
            initial_length: 3,
            start_x: 10,
            start_y: 10,
            scores_file: PathBuf::from("scores.json"),
            log_file: PathBuf::from("snake.log"),
            top_players: 10,
            log_level: "debug".to_string(),
        }
    }
}

impl GameConfig {
    /// Reads the config file if there is one, otherwise falls back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(GameConfig::default()),
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };

        let config: GameConfig = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height)
    }

    pub fn start_head(&self) -> GridPosition {
        GridPosition::new(self.start_x, self.start_y)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Unknown names fall back to `Info`; `validate` rejects them up front.
    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

impl Validate for GameConfig {
    fn validate(&self) -> Result<(), String> {
        if self.grid_width < 5 || self.grid_height < 5 {
            return Err(format!(
                "Grid must be at least 5x5, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }
        if self.grid_width > MAX_GRID_SIDE || self.grid_height > MAX_GRID_SIDE {
            return Err(format!(
                "Grid must be at most {max}x{max}, got {}x{}",
                self.grid_width, self.grid_height, max = MAX_GRID_SIDE
            ));
        }
        if self.tick_ms == 0 {
            return Err("Tick interval must be positive".to_string());
        }
        if self.initial_length == 0 {
            return Err("Initial snake length must be at least 1".to_string());
        }
        if self.initial_length >= self.grid().cell_count() {
            return Err(format!(
                "Initial snake length {} leaves no room for food",
                self.initial_length
            ));
        }

        // The body trails to the left of the head.
        let tail_x = self.start_x - (self.initial_length as i32 - 1);
        let grid = self.grid();
        if !grid.contains(self.start_head()) || !grid.contains(GridPosition::new(tail_x, self.start_y)) {
            return Err(format!(
                "Starting snake at ({}, {}) with length {} does not fit on the grid",
                self.start_x, self.start_y, self.initial_length
            ));
        }
        if self.top_players == 0 || self.top_players > MAX_TOP_PLAYERS {
            return Err(format!(
                "Top players count must be between 1 and {}, got {}",
                MAX_TOP_PLAYERS, self.top_players
            ));
        }
        if LevelFilter::from_str(&self.log_level).is_err() {
            return Err(format!("Unknown log level {:?}", self.log_level));
        }
        Ok(())
    }
}
