//! Derived statistics and the exported text report

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use gf_gacha::{PullRecord, Rarity, SessionMode, StatisticsLedger};

/// Rate as a percentage with two decimals; `0.00%` when nothing was drawn
pub fn format_rate(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", count as f64 / total as f64 * 100.0)
}

/// Count and formatted rate of one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStat {
    pub rarity: Rarity,
    pub count: u64,
    pub rate: String,
}

/// Read-only statistics for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsView {
    pub total_pulls: u64,
    /// Top tier first
    pub tiers: Vec<TierStat>,
    pub featured_counts: IndexMap<String, u64>,
    pub pity_counter: u32,
}

impl StatisticsView {
    pub fn from_ledger(ledger: &StatisticsLedger, pity_counter: u32) -> Self {
        let total = ledger.total_pulls();
        let tiers = Rarity::ALL
            .iter()
            .map(|&rarity| {
                let count = ledger.count(rarity);
                TierStat {
                    rarity,
                    count,
                    rate: format_rate(count, total),
                }
            })
            .collect();

        Self {
            total_pulls: total,
            tiers,
            featured_counts: ledger.featured_counts().clone(),
            pity_counter,
        }
    }

    pub fn tier(&self, rarity: Rarity) -> Option<&TierStat> {
        self.tiers.iter().find(|t| t.rarity == rarity)
    }
}

/// How often one card appears among a tier's retained draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTally {
    pub card_id: String,
    pub name: String,
    pub count: u64,
    /// Share of the tier's retained draws
    pub share: String,
}

/// Per-card counts for one tier, in order of first appearance
pub fn tier_breakdown<'a>(
    history: impl IntoIterator<Item = &'a PullRecord>,
    rarity: Rarity,
) -> Vec<CardTally> {
    let mut counts: IndexMap<(String, String), u64> = IndexMap::new();
    for record in history {
        if record.card.rarity == rarity {
            *counts
                .entry((record.card.id.clone(), record.card.name.clone()))
                .or_insert(0) += 1;
        }
    }

    let tier_total: u64 = counts.values().sum();
    counts
        .into_iter()
        .map(|((card_id, name), count)| CardTally {
            card_id,
            name,
            count,
            share: format_rate(count, tier_total),
        })
        .collect()
}

/// Render the plain-text session report
///
/// `recent` must already be newest first.
pub fn render_report<'a>(
    pool_name: Option<&str>,
    mode: SessionMode,
    stats: &StatisticsView,
    recent: impl IntoIterator<Item = &'a PullRecord>,
    recent_limit: usize,
) -> String {
    let mut text = String::new();

    text.push_str("===== Gacha Statistics Report =====\n");
    text.push_str(&format!("Pool: {}\n", pool_name.unwrap_or("(none selected)")));
    text.push_str(&format!("Mode: {}\n", mode.label()));
    text.push_str(&format!("Total pulls: {}\n", stats.total_pulls));
    for tier in &stats.tiers {
        text.push_str(&format!("{}: {} ({})\n", tier.rarity, tier.count, tier.rate));
    }
    text.push_str(&format!("Current pity: {}\n", stats.pity_counter));

    text.push_str("\n===== Featured SSR Obtained =====\n");
    for (id, count) in &stats.featured_counts {
        text.push_str(&format!("{id}: {count}\n"));
    }

    text.push_str(&format!("\n===== Last {recent_limit} Pulls =====\n"));
    for record in recent.into_iter().take(recent_limit) {
        text.push_str(&format!(
            "#{} [{}] {}\n",
            record.sequence, record.card.rarity, record.card.name
        ));
    }

    text
}
