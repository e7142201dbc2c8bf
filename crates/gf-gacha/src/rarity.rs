//! Rarity tiers and pity escalation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gf_core::{GfError, GfResult};

/// Tolerance used when checking that base probabilities sum to 1
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Rarity tier identifier, ordered from top tier to lowest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    /// Top tier, the only pity-escalated tier
    #[serde(rename = "SSR")]
    Ssr,
    /// Mid tier
    #[serde(rename = "SR")]
    Sr,
    /// Lowest tier
    #[serde(rename = "R")]
    R,
}

impl Rarity {
    /// All tiers, top first
    pub const ALL: [Rarity; 3] = [Rarity::Ssr, Rarity::Sr, Rarity::R];

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Ssr => "SSR",
            Rarity::Sr => "SR",
            Rarity::R => "R",
        }
    }

    pub fn is_top(self) -> bool {
        self == Rarity::Ssr
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Rarity {
    type Err = GfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SSR" => Ok(Rarity::Ssr),
            "SR" => Ok(Rarity::Sr),
            "R" => Ok(Rarity::R),
            other => Err(GfError::InvalidConfig(format!("Unknown rarity: {other}"))),
        }
    }
}

/// A configured rarity tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityTier {
    pub rarity: Rarity,
    /// Display name
    pub name: String,
    /// Display color (hex)
    pub color: String,
    /// Base probability in [0, 1]
    pub probability: f64,
}

impl RarityTier {
    pub fn new(rarity: Rarity, probability: f64, color: impl Into<String>) -> Self {
        Self {
            rarity,
            name: rarity.label().to_string(),
            color: color.into(),
            probability,
        }
    }
}

/// Pity escalation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PityConfig {
    /// Counter value at which the top-tier probability starts to grow
    pub soft_pity_threshold: u32,
    /// The draw numbered `hard_pity_threshold` since the last top-tier hit is guaranteed
    pub hard_pity_threshold: u32,
    /// Probability added per draw past the soft threshold
    pub pity_increase_per_draw: f64,
}

impl Default for PityConfig {
    fn default() -> Self {
        Self {
            soft_pity_threshold: 74,
            hard_pity_threshold: 90,
            pity_increase_per_draw: 0.06,
        }
    }
}

/// Immutable rarity configuration: tiers, base probabilities and pity parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityTable {
    pub tiers: Vec<RarityTier>,
    pub pity: PityConfig,
}

impl Default for RarityTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                RarityTier::new(Rarity::Ssr, 0.02, "#FFD700"),
                RarityTier::new(Rarity::Sr, 0.10, "#9B59B6"),
                RarityTier::new(Rarity::R, 0.88, "#3498DB"),
            ],
            pity: PityConfig::default(),
        }
    }
}

impl RarityTable {
    /// Look up a configured tier
    pub fn tier(&self, rarity: Rarity) -> Option<&RarityTier> {
        self.tiers.iter().find(|t| t.rarity == rarity)
    }

    /// Base probability of a tier (0 when not configured)
    pub fn base(&self, rarity: Rarity) -> f64 {
        self.tier(rarity).map(|t| t.probability).unwrap_or(0.0)
    }

    /// Effective top-tier probability for a pity counter read before the draw
    pub fn top_probability(&self, pity_counter: u32) -> f64 {
        let pity = &self.pity;
        let mut p = self.base(Rarity::Ssr);

        if pity_counter >= pity.soft_pity_threshold {
            let extra = pity_counter - pity.soft_pity_threshold;
            p += f64::from(extra) * pity.pity_increase_per_draw;
        }

        if pity_counter.saturating_add(1) >= pity.hard_pity_threshold {
            p = 1.0;
        }

        p.min(1.0)
    }

    /// Decide a tier from a uniform roll in [0, 1)
    ///
    /// Only the top tier escalates; the mid tier keeps its base width and the
    /// lowest tier absorbs whatever remains of the unit interval.
    pub fn tier_for_roll(&self, pity_counter: u32, roll: f64) -> Rarity {
        let top = self.top_probability(pity_counter);
        if roll < top {
            Rarity::Ssr
        } else if roll < top + self.base(Rarity::Sr) {
            Rarity::Sr
        } else {
            Rarity::R
        }
    }

    /// Effective probability of every tier, top first
    ///
    /// Reports the masses implied by [`Self::tier_for_roll`], so the values
    /// always sum to 1 even when the top tier has grown past its base share.
    pub fn resolve_probabilities(&self, pity_counter: u32) -> Vec<(Rarity, f64)> {
        let top = self.top_probability(pity_counter);
        let mid = self.base(Rarity::Sr).min(1.0 - top).max(0.0);
        let low = (1.0 - top - mid).max(0.0);
        vec![(Rarity::Ssr, top), (Rarity::Sr, mid), (Rarity::R, low)]
    }

    /// Check tier coverage, probability ranges and pity thresholds
    pub fn validate(&self) -> GfResult<()> {
        for rarity in Rarity::ALL {
            let count = self.tiers.iter().filter(|t| t.rarity == rarity).count();
            if count != 1 {
                return Err(GfError::InvalidConfig(format!(
                    "Tier {rarity} must be configured exactly once (found {count})"
                )));
            }
        }

        for tier in &self.tiers {
            if !(0.0..=1.0).contains(&tier.probability) {
                return Err(GfError::InvalidConfig(format!(
                    "Tier {} probability out of range: {}",
                    tier.rarity, tier.probability
                )));
            }
        }

        let sum: f64 = self.tiers.iter().map(|t| t.probability).sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(GfError::InvalidConfig(format!(
                "Tier probabilities must sum to 1.0 (got {sum})"
            )));
        }

        if self.pity.hard_pity_threshold <= self.pity.soft_pity_threshold {
            return Err(GfError::InvalidConfig(format!(
                "Hard pity ({}) must exceed soft pity ({})",
                self.pity.hard_pity_threshold, self.pity.soft_pity_threshold
            )));
        }

        if self.pity.pity_increase_per_draw < 0.0 {
            return Err(GfError::InvalidConfig(
                "Pity increase per draw must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_table_is_valid() {
        let table = RarityTable::default();
        assert!(table.validate().is_ok());
        assert_eq!(table.base(Rarity::Ssr), 0.02);
    }

    #[test]
    fn test_below_soft_pity_is_base() {
        let table = RarityTable::default();
        for pity in 0..table.pity.soft_pity_threshold {
            assert_eq!(table.top_probability(pity), 0.02);
        }
    }

    #[test]
    fn test_soft_pity_is_linear_and_monotonic() {
        let table = RarityTable::default();
        let soft = table.pity.soft_pity_threshold;
        let hard = table.pity.hard_pity_threshold;

        let mut previous = 0.0;
        for pity in soft..=hard - 2 {
            let expected = 0.02 + f64::from(pity - soft) * 0.06;
            let p = table.top_probability(pity);
            assert_abs_diff_eq!(p, expected, epsilon = 1e-12);
            assert!(p >= previous);
            previous = p;
        }

        assert_eq!(table.top_probability(soft), 0.02);
    }

    #[test]
    fn test_pity_80_scenario() {
        let table = RarityTable::default();
        assert_abs_diff_eq!(table.top_probability(80), 0.38, epsilon = 1e-12);
    }

    #[test]
    fn test_hard_pity_guarantees_top() {
        let table = RarityTable::default();
        for pity in [89, 90, 120, u32::MAX] {
            assert_eq!(table.top_probability(pity), 1.0);
            assert_eq!(table.tier_for_roll(pity, 0.999_999), Rarity::Ssr);
        }
    }

    #[test]
    fn test_tier_for_roll_boundaries() {
        let table = RarityTable::default();
        assert_eq!(table.tier_for_roll(0, 0.0), Rarity::Ssr);
        assert_eq!(table.tier_for_roll(0, 0.019), Rarity::Ssr);
        assert_eq!(table.tier_for_roll(0, 0.02), Rarity::Sr);
        assert_eq!(table.tier_for_roll(0, 0.119), Rarity::Sr);
        assert_eq!(table.tier_for_roll(0, 0.121), Rarity::R);

        // SR ends at the accumulated sum, not the decimal literal 0.12
        let mid_end = table.base(Rarity::Ssr) + table.base(Rarity::Sr);
        assert_eq!(table.tier_for_roll(0, mid_end - 1e-9), Rarity::Sr);
        assert_eq!(table.tier_for_roll(0, mid_end), Rarity::R);
    }

    #[test]
    fn test_resolved_probabilities_sum_to_one() {
        let table = RarityTable::default();
        for pity in [0, 50, 74, 80, 88, 89] {
            let resolved = table.resolve_probabilities(pity);
            let sum: f64 = resolved.iter().map(|(_, p)| p).sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
            assert_eq!(resolved[0].0, Rarity::Ssr);
        }

        // Mid tier keeps its base width until the top tier crowds it out
        let resolved = table.resolve_probabilities(88);
        assert_abs_diff_eq!(resolved[0].1, 0.86, epsilon = 1e-12);
        assert_abs_diff_eq!(resolved[1].1, 0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(resolved[2].1, 0.04, epsilon = 1e-9);

        let guaranteed = table.resolve_probabilities(89);
        assert_eq!(guaranteed[1].1, 0.0);
        assert_eq!(guaranteed[2].1, 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let mut table = RarityTable::default();
        table.tiers[2].probability = 0.90;
        assert!(table.validate().is_err());

        let mut table = RarityTable::default();
        table.pity.hard_pity_threshold = table.pity.soft_pity_threshold;
        assert!(table.validate().is_err());

        let mut table = RarityTable::default();
        table.tiers.pop();
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_rarity_parse() {
        assert_eq!("ssr".parse::<Rarity>().unwrap(), Rarity::Ssr);
        assert_eq!(" SR ".parse::<Rarity>().unwrap(), Rarity::Sr);
        assert!("UR".parse::<Rarity>().is_err());
    }
}
