//! Session snapshot - the unit of persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gf_gacha::{PityState, StatisticsLedger};

/// Active pool, pity counter and statistics of one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    /// Session identifier
    pub session_id: Uuid,
    /// Pool draws are taken from (unset on a fresh session)
    pub active_pool_id: Option<String>,
    /// Draws since the last SSR
    pub pity_counter: PityState,
    /// Counts, featured tally and history
    pub stats: StatisticsLedger,
    /// Last successful persist
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSnapshot {
    /// Fresh session: no pool, zeroed pity and statistics
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            active_pool_id: None,
            pity_counter: PityState::new(),
            stats: StatisticsLedger::new(),
            updated_at: None,
        }
    }

    /// Zero pity and statistics, tracking `featured` at zero
    pub fn reset<I, S>(&mut self, featured: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pity_counter.reset();
        self.stats = StatisticsLedger::with_featured(featured);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_gacha::Rarity;

    #[test]
    fn test_fresh_snapshot() {
        let snapshot = SessionSnapshot::new();
        assert!(snapshot.active_pool_id.is_none());
        assert_eq!(snapshot.pity_counter.counter(), 0);
        assert_eq!(snapshot.stats.total_pulls(), 0);
    }

    #[test]
    fn test_reset_reseeds_featured() {
        let mut snapshot = SessionSnapshot::new();
        snapshot.pity_counter.observe(false);
        snapshot.stats.count_draw(Rarity::R);
        snapshot.stats.track_featured(["old"]);

        snapshot.reset(["X", "Y"]);
        assert_eq!(snapshot.pity_counter.counter(), 0);
        assert_eq!(snapshot.stats.total_pulls(), 0);
        let ids: Vec<_> = snapshot.stats.featured_counts().keys().cloned().collect();
        assert_eq!(ids, vec!["X".to_string(), "Y".to_string()]);
    }

    #[test]
    fn test_partial_snapshot_deserializes() {
        let snapshot: SessionSnapshot =
            serde_json::from_str(r#"{"active_pool_id": "limited_01", "pity_counter": 12}"#)
                .unwrap();
        assert_eq!(snapshot.active_pool_id.as_deref(), Some("limited_01"));
        assert_eq!(snapshot.pity_counter.counter(), 12);
        assert_eq!(snapshot.stats.total_pulls(), 0);
    }
}
