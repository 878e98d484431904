//! High score leaderboard
//!
//! Top 10 rounds by descending score. Storage belongs to the host; this type
//! only sorts, trims and (de)serializes.

use serde::{Deserialize, Serialize};

use crate::config::GameMode;
use crate::session::{FinalScore, ResultSink, RoundResult};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: FinalScore,
    pub mode: GameMode,
    /// Camera still from the end of the round (data URL)
    pub photo: Option<String>,
    /// When achieved (ms)
    pub timestamp: f64,
}

impl From<RoundResult> for HighScoreEntry {
    fn from(result: RoundResult) -> Self {
        Self {
            score: result.score,
            mode: result.mode,
            photo: result.photo,
            timestamp: result.timestamp_ms,
        }
    }
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: FinalScore) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must match or beat the lowest entry
        self.entries
            .last()
            .map(|e| score.value() >= e.score.value())
            .unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: FinalScore) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.insertion_point(score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    fn insertion_point(&self, score: FinalScore) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| score.value() >= e.score.value())
    }

    /// Add a round to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Sorted descending; a new entry ranks ahead of the ones it ties
        let rank = match self.insertion_point(entry.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("High score #{rank} ({} entries)", self.entries.len());
        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<FinalScore> {
        self.entries.first().map(|e| e.score)
    }

    /// Best score recorded for one mode
    pub fn best_for(&self, mode: GameMode) -> Option<FinalScore> {
        self.entries.iter().find(|e| e.mode == mode).map(|e| e.score)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a stored board; entries are re-sorted and trimmed in case the
    /// store was edited by hand
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores
            .entries
            .sort_by(|a, b| b.score.value().total_cmp(&a.score.value()));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }
}

impl ResultSink for HighScores {
    fn submit(&mut self, result: RoundResult) {
        if self.add(result.into()).is_none() {
            log::debug!("Round did not make the leaderboard");
        }
    }
}
