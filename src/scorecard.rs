//! Finished-hole results
//!
//! Kept in memory for the score display, best 10 results.

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// Maximum number of results to keep
pub const MAX_RESULTS: usize = 10;

/// A single completed hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleResult {
    pub difficulty: Difficulty,
    /// Strokes taken, including the one that dropped
    pub shots: u32,
}

/// Ranked results, fewest shots first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Scorecard {
    pub entries: Vec<HoleResult>,
}

impl Scorecard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a result would make the card
    pub fn qualifies(&self, shots: u32) -> bool {
        if shots == 0 {
            return false;
        }
        if self.entries.len() < MAX_RESULTS {
            return true;
        }
        self.entries.last().is_none_or(|e| shots < e.shots)
    }

    /// Record a result. Returns the rank achieved (1-indexed), if any.
    ///
    /// Ties rank behind earlier results.
    pub fn record(&mut self, difficulty: Difficulty, shots: u32) -> Option<usize> {
        if !self.qualifies(shots) {
            log::debug!("{shots} shots on {} did not make the card", difficulty.as_str());
            return None;
        }

        let entry = HoleResult { difficulty, shots };
        let pos = self.entries.iter().position(|e| shots < e.shots);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_RESULTS);
        log::info!("Recorded {} on {} at rank {rank}", stroke_label(shots), difficulty.as_str());

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fewest shots on a given difficulty
    pub fn best(&self, difficulty: Difficulty) -> Option<u32> {
        self.entries
            .iter()
            .filter(|e| e.difficulty == difficulty)
            .map(|e| e.shots)
            .min()
    }
}

/// Score text for a stroke count
pub fn stroke_label(shots: u32) -> String {
    if shots == 1 {
        "1 stroke".to_string()
    } else {
        format!("{shots} strokes")
    }
}
