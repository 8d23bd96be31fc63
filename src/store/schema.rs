use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Key holding the whole `UserStats` record.
pub const STATS_KEY: &str = "user_stats_v1";

/// Where an unreadable stats blob is parked before stats are reset.
pub const CORRUPT_STATS_KEY: &str = "user_stats_v1.corrupt";

const PUZZLE_CACHE_PREFIX: &str = "puzzle_cache_";

pub fn puzzle_cache_key(date: NaiveDate) -> String {
    format!("{PUZZLE_CACHE_PREFIX}{}", date.format("%Y-%m-%d"))
}

/// Recovers the date from a puzzle cache key. Any other key yields `None`.
pub fn puzzle_cache_date(key: &str) -> Option<NaiveDate> {
    let date = key.strip_prefix(PUZZLE_CACHE_PREFIX)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    #[serde(rename = "result", alias = "outcome")]
    pub outcome: Outcome,
    pub points: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_points: u32,
    pub current_streak: u32,
    pub last_played_date: Option<NaiveDate>,
    pub play_history: Vec<HistoryEntry>,
}

impl UserStats {
    pub fn has_played_on(&self, date: NaiveDate) -> bool {
        self.last_played_date == Some(date)
    }

    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.play_history.last()
    }

    pub fn games_played(&self) -> usize {
        self.play_history.len()
    }

    pub fn wins(&self) -> usize {
        self.play_history
            .iter()
            .filter(|e| e.outcome == Outcome::Won)
            .count()
    }

    pub fn win_rate(&self) -> f64 {
        if self.play_history.is_empty() {
            0.0
        } else {
            self.wins() as f64 / self.play_history.len() as f64
        }
    }

    /// The last `n` history entries, oldest first.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        let start = self.play_history.len().saturating_sub(n);
        &self.play_history[start..]
    }

    pub fn record(&mut self, date: NaiveDate, outcome: Outcome, points: u32) {
        match outcome {
            Outcome::Won => {
                self.total_points = self.total_points.saturating_add(points);
                self.current_streak = self.current_streak.saturating_add(1);
            }
            Outcome::Lost => self.current_streak = 0,
        }
        self.last_played_date = Some(date);
        self.play_history.push(HistoryEntry {
            date,
            outcome,
            points,
        });
    }
}
