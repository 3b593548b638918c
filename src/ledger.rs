use std::{collections::BTreeMap, fs, io::ErrorKind, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Best score per player name. Names are case-sensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreLedger {
    scores: BTreeMap<String, u32>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the higher of the stored and the new score.
    pub fn record_score(&mut self, name: &str, score: u32) {
        self.scores
            .entry(name.to_string())
            .and_modify(|best| *best = (*best).max(score))
            .or_insert(score);
    }

    pub fn best(&self, name: &str) -> Option<u32> {
        self.scores.get(name).copied()
    }

    /// Highest scores first. Equal scores are ordered by name.
    pub fn top_n(&self, n: usize) -> Vec<(String, u32)> {
        let mut entries: Vec<(String, u32)> = self.scores.iter().map(|(name, score)| (name.clone(), *score)).collect();
        // Stable sort over the map's name order keeps ties alphabetical.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }

    pub fn all(&self) -> Vec<(String, u32)> {
        self.top_n(self.scores.len())
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

pub trait ScoreStore {
    fn load(&self) -> Result<ScoreLedger, LedgerError>;
    fn save(&mut self, ledger: &ScoreLedger) -> Result<(), LedgerError>;
}

/// Keeps the ledger as a JSON object of `name -> score`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> Result<ScoreLedger, LedgerError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ScoreLedger::new()),
            Err(source) => return Err(LedgerError::Io { path: self.path.clone(), source }),
        };

        serde_json::from_str(&json).map_err(|source| LedgerError::Parse { path: self.path.clone(), source })
    }

    fn save(&mut self, ledger: &ScoreLedger) -> Result<(), LedgerError> {
        let json = serde_json::to_string(ledger)
            .map_err(|source| LedgerError::Encode { path: self.path.clone(), source })?;

        fs::write(&self.path, json).map_err(|source| LedgerError::Io { path: self.path.clone(), source })
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    pub saved: Option<ScoreLedger>,
    pub save_count: usize,
}

#[cfg(test)]
impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<ScoreLedger, LedgerError> {
        Ok(self.saved.clone().unwrap_or_default())
    }

    fn save(&mut self, ledger: &ScoreLedger) -> Result<(), LedgerError> {
        self.saved = Some(ledger.clone());
        self.save_count += 1;
        Ok(())
    }
}
