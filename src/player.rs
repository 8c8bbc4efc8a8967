//! Persisted player record
//!
//! The simulation only ever sees a snapshot of this record and emits
//! deltas; the record itself is owned by the store. Period rollover
//! (zeroing daily/weekly counters when the stored stamp goes stale) is
//! applied here at load time, never during a frame.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Day and ISO-week indices used as rollover stamps.
///
/// Days count from the Unix epoch. Weeks start on Monday; the epoch fell
/// on a Thursday, so shifting by three days aligns the week boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub day: u64,
    pub week: u64,
}

impl Period {
    pub fn current() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::from_unix_seconds(secs)
    }

    pub fn from_unix_seconds(secs: u64) -> Self {
        let day = secs / 86_400;
        Self {
            day,
            week: (day + 3) / 7,
        }
    }
}

/// Everything the store keeps per player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub total_currency: u64,
    pub best_score: u32,
    pub daily_best: u32,
    pub weekly_best: u32,
    /// Currency earned today, clamped to the daily cap at accrual time.
    pub daily_earnings: u32,
    pub last_reset_day: u64,
    pub week_id: u64,
    pub ad_watch_count: u32,
}

impl PlayerRecord {
    /// Fresh record stamped with the given period.
    pub fn new(period: Period) -> Self {
        Self {
            total_currency: 0,
            best_score: 0,
            daily_best: 0,
            weekly_best: 0,
            daily_earnings: 0,
            last_reset_day: period.day,
            week_id: period.week,
            ad_watch_count: 0,
        }
    }

    /// Zero the counters belonging to any period that has rolled over and
    /// restamp. Returns true if anything changed (the caller should save).
    pub fn apply_rollover(&mut self, now: Period) -> bool {
        let mut changed = false;
        if self.last_reset_day != now.day {
            self.daily_earnings = 0;
            self.daily_best = 0;
            self.last_reset_day = now.day;
            changed = true;
        }
        if self.week_id != now.week {
            self.weekly_best = 0;
            self.week_id = now.week;
            changed = true;
        }
        changed
    }

    /// Raise the all-time/daily/weekly bests to at least `score`.
    pub fn record_score(&mut self, score: u32) {
        self.best_score = self.best_score.max(score);
        self.daily_best = self.daily_best.max(score);
        self.weekly_best = self.weekly_best.max(score);
    }
}
