use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to access score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("score file {path} is not a valid score table: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode scores for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("enter your name before starting the game")]
    BlankName,

    #[error("a game is already in progress")]
    AlreadyRunning,

    #[error("no free cell left for food")]
    NoRoomForFood,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Start(#[from] StartError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to set up logging: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("a {width}x{height} grid is too large to draw")]
    BoardTooLarge { width: i32, height: i32 },

    #[error("terminal is {actual:?}, need at least {needed:?} (columns, rows)")]
    TerminalTooSmall { actual: (u16, u16), needed: (u16, u16) },
}
