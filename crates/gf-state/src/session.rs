//! Session controller - orchestrates draws, persistence and reporting
//!
//! ```text
//! Uninitialized ──load_catalog / set_active_pool──> Ready(pool)
//! Ready(pool) ──pull_once / pull_batch / reset──> Ready(pool)
//! Ready(pool) ──set_active_pool(other)──> Ready(other)
//! ```
//!
//! Every mutating operation persists the snapshot before returning, except
//! that a batch persists once after its last draw.

use serde::{Deserialize, Serialize};

use gf_core::{GfError, GfResult};
use gf_gacha::{
    DrawEngine, GachaConfig, Pool, PoolCatalog, PoolSummary, PullRecord, Rarity,
};

use crate::report::{self, CardTally, StatisticsView};
use crate::snapshot::SessionSnapshot;
use crate::store::SnapshotStore;

/// Controller lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No pool data, or no pool selected
    Uninitialized,
    /// Draws come from the named pool
    Ready(String),
}

/// Result of a batch draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// The most recent records of the batch, oldest first
    pub records: Vec<PullRecord>,
    /// Draws actually performed after clamping
    pub actual_count: u32,
    pub returned_count: usize,
}

/// Owns one session: catalog, draw engine, snapshot and its store
pub struct SessionController<S: SnapshotStore> {
    config: GachaConfig,
    /// `None` until pool data has been loaded
    catalog: Option<PoolCatalog>,
    engine: DrawEngine,
    snapshot: SessionSnapshot,
    store: S,
}

impl<S: SnapshotStore> SessionController<S> {
    /// Create a controller, restoring the stored snapshot when one exists
    pub fn new(config: GachaConfig, mut store: S) -> Self {
        let snapshot = match store.load() {
            Ok(Some(snapshot)) => {
                log::info!(
                    "Restored session {} ({} pulls)",
                    snapshot.session_id,
                    snapshot.stats.total_pulls()
                );
                snapshot
            }
            Ok(None) => SessionSnapshot::new(),
            Err(e) => {
                log::warn!("Session snapshot unavailable, starting fresh: {e}");
                SessionSnapshot::new()
            }
        };

        Self {
            engine: DrawEngine::new(&config),
            config,
            catalog: None,
            snapshot,
            store,
        }
    }

    /// Create and immediately load pool data
    pub fn with_catalog(config: GachaConfig, store: S, catalog: PoolCatalog) -> Self {
        let mut controller = Self::new(config, store);
        controller.load_catalog(catalog);
        controller
    }

    /// Seed RNG for reproducible sessions
    pub fn seed(&mut self, seed: u64) {
        self.engine.seed(seed);
    }

    pub fn config(&self) -> &GachaConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> Option<&PoolCatalog> {
        self.catalog.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match self.active_pool() {
            Some(pool) => SessionState::Ready(pool.id.clone()),
            None => SessionState::Uninitialized,
        }
    }

    pub fn active_pool(&self) -> Option<&Pool> {
        let pool_id = self.snapshot.active_pool_id.as_deref()?;
        self.catalog.as_ref()?.get(pool_id)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POOL DATA
    // ═══════════════════════════════════════════════════════════════════════════

    /// Load or refresh pool data
    ///
    /// Statistics are kept. The snapshot's pool stays active when it still
    /// exists; otherwise the first pool is activated with a fresh ledger.
    /// Featured ids of the active pool gain zero tallies if untracked.
    pub fn load_catalog(&mut self, catalog: PoolCatalog) {
        log::info!("Loaded pool catalog with {} pools", catalog.len());

        let current = self.snapshot.active_pool_id.clone();
        let keep_current = current.as_deref().is_some_and(|id| catalog.contains(id));
        if !keep_current {
            if let Some(default_id) = catalog.default_pool_id() {
                if let Some(stale) = &current {
                    log::warn!("Pool {stale} no longer exists, switching to {default_id}");
                }
                let featured = catalog
                    .get(default_id)
                    .map(|p| p.featured.clone())
                    .unwrap_or_default();
                self.snapshot.active_pool_id = Some(default_id.to_string());
                self.snapshot.reset(featured);
            }
        }

        if let Some(pool) = self
            .snapshot
            .active_pool_id
            .as_deref()
            .and_then(|id| catalog.get(id))
        {
            self.snapshot.stats.track_featured(pool.featured.iter().cloned());
        }

        self.catalog = Some(catalog);
        self.persist();
    }

    /// Insert or replace a single pool
    pub fn upsert_pool(&mut self, pool: Pool) {
        let mut catalog = self.catalog.take().unwrap_or_default();
        catalog.upsert(pool);
        self.load_catalog(catalog);
    }

    /// Drop all pool data; draws fail until data is loaded again
    pub fn clear_catalog(&mut self) {
        self.catalog = None;
        log::info!("Pool catalog cleared");
    }

    pub fn list_pools(&self) -> Vec<PoolSummary> {
        self.catalog
            .as_ref()
            .map(PoolCatalog::summaries)
            .unwrap_or_default()
    }

    /// Switch the active pool
    ///
    /// With `auto_reset`, switching to a different pool starts a fresh
    /// ledger; otherwise statistics carry over.
    pub fn set_active_pool(&mut self, pool_id: &str, auto_reset: bool) -> GfResult<&Pool> {
        let featured = self
            .catalog
            .as_ref()
            .ok_or(GfError::DataNotLoaded)?
            .lookup(pool_id)?
            .featured
            .clone();

        let switching = self.snapshot.active_pool_id.as_deref() != Some(pool_id);
        self.snapshot.active_pool_id = Some(pool_id.to_string());

        if auto_reset && switching {
            log::info!("Switched to pool {pool_id}, statistics reset");
            self.snapshot.reset(featured);
        } else {
            log::info!("Active pool {pool_id}, statistics kept");
            self.snapshot.stats.track_featured(featured);
        }

        self.persist();
        self.catalog
            .as_ref()
            .ok_or(GfError::DataNotLoaded)?
            .lookup(pool_id)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DRAWS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Draw one card
    pub fn pull_once(&mut self) -> GfResult<PullRecord> {
        self.ensure_ready()?;
        self.draw_one(false)
    }

    /// Draw `count` cards (clamped to `[1, max_batch]`) with one persist at the end
    ///
    /// Only the last `return_limit` records are returned; state ends up
    /// exactly as after the same number of [`Self::pull_once`] calls.
    pub fn pull_batch(&mut self, count: u32, return_limit: usize) -> GfResult<BatchOutcome> {
        self.ensure_ready()?;

        let max = self.config.max_batch().max(1);
        let actual = count.clamp(1, max);
        if actual != count {
            log::debug!("Batch count {count} clamped to {actual}");
        }

        let mut records = Vec::with_capacity(return_limit.min(actual as usize));
        for i in 0..actual {
            let record = self.draw_one(true)?;
            if ((actual - i) as usize) <= return_limit {
                records.push(record);
            }
        }
        self.persist();

        log::debug!("Batch of {actual} complete, returning {}", records.len());
        Ok(BatchOutcome {
            returned_count: records.len(),
            records,
            actual_count: actual,
        })
    }

    /// One draw against the active pool; persists unless `defer_persist`
    fn draw_one(&mut self, defer_persist: bool) -> GfResult<PullRecord> {
        let pool_id = self
            .snapshot
            .active_pool_id
            .as_deref()
            .ok_or(GfError::DataNotLoaded)?;
        let pool = self
            .catalog
            .as_ref()
            .ok_or(GfError::DataNotLoaded)?
            .get(pool_id)
            .ok_or(GfError::DataNotLoaded)?;

        let record = self.engine.draw(
            pool,
            &mut self.snapshot.pity_counter,
            &mut self.snapshot.stats,
        );

        if !defer_persist {
            self.persist();
        }
        Ok(record)
    }

    fn ensure_ready(&self) -> GfResult<()> {
        match self.state() {
            SessionState::Ready(_) => Ok(()),
            SessionState::Uninitialized => Err(GfError::DataNotLoaded),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATISTICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn statistics(&self) -> StatisticsView {
        StatisticsView::from_ledger(&self.snapshot.stats, self.snapshot.pity_counter.counter())
    }

    /// Most recent records, newest first; `None` returns all retained records
    pub fn history(&self, limit: Option<usize>) -> Vec<PullRecord> {
        let limit = limit.unwrap_or(usize::MAX);
        self.snapshot.stats.recent(limit).cloned().collect()
    }

    /// Per-card counts of one tier over the retained history
    pub fn tier_breakdown(&self, rarity: Rarity) -> Vec<CardTally> {
        report::tier_breakdown(self.snapshot.stats.history(), rarity)
    }

    /// Zero pity and statistics for the active pool
    pub fn reset(&mut self) {
        let featured = self
            .active_pool()
            .map(|p| p.featured.clone())
            .unwrap_or_default();
        self.snapshot.reset(featured);
        log::info!("Session {} reset", self.snapshot.session_id);
        self.persist();
    }

    /// Plain-text summary of the session
    pub fn export_report(&self) -> String {
        let recent_limit = self.config.limits.recent_history;
        report::render_report(
            self.active_pool().map(|p| p.name.as_str()),
            self.config.mode,
            &self.statistics(),
            self.snapshot.stats.recent(recent_limit),
            recent_limit,
        )
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PERSISTENCE
    // ═══════════════════════════════════════════════════════════════════════════

    fn persist(&mut self) {
        self.snapshot.updated_at = Some(chrono::Utc::now());
        if let Err(e) = self.store.save(&self.snapshot) {
            log::warn!("Session not persisted, continuing in memory: {e}");
        }
    }
}
