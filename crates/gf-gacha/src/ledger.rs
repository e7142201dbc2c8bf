//! Session statistics and pull history

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pool::Card;
use crate::rarity::Rarity;

/// Default history cap
pub const DEFAULT_MAX_HISTORY: usize = 1_000;

/// One draw as recorded in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRecord {
    /// 1-based, monotonic within a session
    pub sequence: u64,
    pub card: Card,
    /// Pity counter after this draw was observed
    pub pity_counter: u32,
}

/// Per-tier draw counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub ssr: u64,
    pub sr: u64,
    pub r: u64,
}

impl TierCounts {
    pub fn get(&self, rarity: Rarity) -> u64 {
        match rarity {
            Rarity::Ssr => self.ssr,
            Rarity::Sr => self.sr,
            Rarity::R => self.r,
        }
    }

    pub fn increment(&mut self, rarity: Rarity) {
        match rarity {
            Rarity::Ssr => self.ssr += 1,
            Rarity::Sr => self.sr += 1,
            Rarity::R => self.r += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.ssr + self.sr + self.r
    }
}

/// Aggregate counts, featured tally and bounded history for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsLedger {
    total_pulls: u64,
    tier_counts: TierCounts,
    /// Featured card id → copies obtained
    featured_counts: IndexMap<String, u64>,
    /// Chronological (append) order
    history: VecDeque<PullRecord>,
}

impl StatisticsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty ledger tracking the given featured ids at zero
    pub fn with_featured<I, S>(featured: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ledger = Self::new();
        ledger.track_featured(featured);
        ledger
    }

    /// Start tracking featured ids that are not tracked yet; existing tallies are kept
    pub fn track_featured<I, S>(&mut self, featured: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in featured {
            self.featured_counts.entry(id.into()).or_insert(0);
        }
    }

    pub fn total_pulls(&self) -> u64 {
        self.total_pulls
    }

    pub fn tier_counts(&self) -> &TierCounts {
        &self.tier_counts
    }

    pub fn count(&self, rarity: Rarity) -> u64 {
        self.tier_counts.get(rarity)
    }

    pub fn featured_counts(&self) -> &IndexMap<String, u64> {
        &self.featured_counts
    }

    /// Retained history, oldest first
    pub fn history(&self) -> &VecDeque<PullRecord> {
        &self.history
    }

    /// Up to `limit` most recent records, newest first
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &PullRecord> {
        self.history.iter().rev().take(limit)
    }

    /// Count one draw of the given tier; returns its sequence number
    pub fn count_draw(&mut self, rarity: Rarity) -> u64 {
        self.total_pulls += 1;
        self.tier_counts.increment(rarity);
        self.total_pulls
    }

    /// Bump the tally for a tracked featured id; untracked ids are ignored
    pub fn tally_featured(&mut self, card_id: &str) -> bool {
        match self.featured_counts.get_mut(card_id) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    /// Append a record; past `max_history` only the newest half is retained
    pub fn push_history(&mut self, record: PullRecord, max_history: usize) {
        self.history.push_back(record);
        if self.history.len() > max_history {
            let retain = max_history / 2;
            let evict = self.history.len() - retain;
            self.history.drain(..evict);
        }
    }

    /// Invariant: total pulls equals the sum of tier counts
    pub fn is_consistent(&self) -> bool {
        self.total_pulls == self.tier_counts.total()
    }
}
