//! Draw engine - tier decision, card selection and per-draw bookkeeping

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::GachaConfig;
use crate::ledger::{PullRecord, StatisticsLedger};
use crate::pity::PityState;
use crate::pool::{Card, Pool};
use crate::rarity::{Rarity, RarityTable};

/// Decides draw outcomes and applies their state updates
///
/// The only source of randomness is the engine's own RNG, so two engines
/// seeded alike produce identical sequences for identical inputs.
pub struct DrawEngine {
    /// Tiers and pity parameters
    table: RarityTable,
    /// Chance a top-tier draw comes from the featured subset
    featured_rate: f64,
    /// History cap applied on every draw
    max_history: usize,
    /// Random number generator
    rng: ChaCha8Rng,
}

impl DrawEngine {
    pub fn new(config: &GachaConfig) -> Self {
        Self {
            table: config.rarity.clone(),
            featured_rate: config.featured_rate,
            max_history: config.limits.max_history,
            rng: ChaCha8Rng::from_os_rng(),
        }
    }

    /// Seed RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn table(&self) -> &RarityTable {
        &self.table
    }

    /// Roll a tier for a counter read before this draw's increment
    pub fn decide_tier(&mut self, pity_counter: u32) -> Rarity {
        let roll: f64 = self.rng.random();
        let rarity = self.table.tier_for_roll(pity_counter, roll);
        log::debug!(
            "Tier roll {roll:.4} at pity {pity_counter} (p_top {:.4}) → {rarity}",
            self.table.top_probability(pity_counter)
        );
        rarity
    }

    /// Pick a concrete card of the decided tier
    ///
    /// Never fails: a tier with no catalog entry yields a placeholder card.
    pub fn select_card(&mut self, pool: &Pool, rarity: Rarity) -> Card {
        let candidates = pool.cards_of(rarity);
        if candidates.is_empty() {
            let card = Card::placeholder(rarity, self.rng.random_range(1000..=9999));
            log::warn!(
                "Pool {} has no {rarity} cards, using placeholder {}",
                pool.id,
                card.id
            );
            return card;
        }

        if rarity.is_top()
            && !pool.featured.is_empty()
            && self.rng.random::<f64>() < self.featured_rate
        {
            let featured = pool.featured_cards();
            if let Some(card) = featured.choose(&mut self.rng) {
                return (*card).clone();
            }
            log::warn!(
                "Pool {} declares featured ids but has no featured SSR cards",
                pool.id
            );
        }

        candidates
            .choose(&mut self.rng)
            .map(|card| (*card).clone())
            .unwrap_or_else(|| Card::placeholder(rarity, 0))
    }

    /// Perform one complete draw against `pool`, updating pity and ledger
    ///
    /// Order: decide tier → select card → count → observe pity → featured
    /// tally (top tier only) → append history.
    pub fn draw(
        &mut self,
        pool: &Pool,
        pity: &mut PityState,
        ledger: &mut StatisticsLedger,
    ) -> PullRecord {
        let rarity = self.decide_tier(pity.counter());
        let card = self.select_card(pool, rarity);

        let sequence = ledger.count_draw(rarity);
        pity.observe(rarity.is_top());

        if rarity.is_top() && pool.is_featured_id(&card.id) {
            ledger.tally_featured(&card.id);
        }

        let record = PullRecord {
            sequence,
            card,
            pity_counter: pity.counter(),
        };
        ledger.push_history(record.clone(), self.max_history);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn featured_pool() -> Pool {
        Pool::new("poolA", "Featured Banner")
            .with_card(Card::new("X", "Xenia", Rarity::Ssr).featured())
            .with_card(Card::new("Y", "Yvaine", Rarity::Ssr).featured())
            .with_card(Card::new("sr_1", "Sable", Rarity::Sr))
            .with_card(Card::new("r_1", "Rook", Rarity::R))
            .with_featured("X")
            .with_featured("Y")
    }

    fn engine(seed: u64) -> DrawEngine {
        let mut engine = DrawEngine::new(&GachaConfig::default());
        engine.seed(seed);
        engine
    }

    #[test]
    fn test_hard_pity_draw_resets_counter() {
        let mut engine = engine(7);
        let pool = featured_pool();
        let mut pity = PityState::with_counter(89);
        let mut ledger = StatisticsLedger::with_featured(["X", "Y"]);

        let record = engine.draw(&pool, &mut pity, &mut ledger);
        assert_eq!(record.card.rarity, Rarity::Ssr);
        assert_eq!(pity.counter(), 0);
        assert_eq!(record.pity_counter, 0);
        assert_eq!(ledger.count(Rarity::Ssr), 1);
    }

    #[test]
    fn test_featured_tally_increments_selected_card_only() {
        let config = GachaConfig {
            featured_rate: 1.0,
            ..GachaConfig::default()
        };
        let pool = featured_pool().with_card(Card::new("Z", "Zephyr", Rarity::Ssr));

        for seed in 0..20 {
            let mut engine = DrawEngine::new(&config);
            engine.seed(seed);
            let mut ledger = StatisticsLedger::with_featured(["X", "Y"]);
            let mut pity = PityState::with_counter(89);

            let record = engine.draw(&pool, &mut pity, &mut ledger);
            assert!(record.card.id == "X" || record.card.id == "Y");
            let (hit, other) = if record.card.id == "X" { ("X", "Y") } else { ("Y", "X") };

            assert_eq!(ledger.featured_counts()[hit], 1);
            assert_eq!(ledger.featured_counts()[other], 0);
            assert!(!ledger.featured_counts().contains_key("Z"));
            assert_eq!(ledger.featured_counts().len(), 2);
        }
    }

    #[test]
    fn test_non_featured_top_draw_leaves_tally() {
        let config = GachaConfig {
            featured_rate: 0.0,
            ..GachaConfig::default()
        };
        let pool = Pool::new("poolZ", "Single SSR")
            .with_card(Card::new("X", "Xenia", Rarity::Ssr).featured())
            .with_card(Card::new("Z", "Zephyr", Rarity::Ssr))
            .with_featured("X");
        let mut engine = DrawEngine::new(&config);
        engine.seed(4);

        for _ in 0..30 {
            let mut ledger = StatisticsLedger::with_featured(["X"]);
            let mut pity = PityState::with_counter(89);
            let record = engine.draw(&pool, &mut pity, &mut ledger);
            let expected = u64::from(record.card.id == "X");
            assert_eq!(ledger.featured_counts()["X"], expected);
            assert!(!ledger.featured_counts().contains_key("Z"));
        }
    }

    #[test]
    fn test_non_top_draw_increments_pity() {
        let mut engine = engine(1);
        let pool = featured_pool();
        let mut ledger = StatisticsLedger::new();
        let mut pity = PityState::new();

        for _ in 0..200 {
            let before = pity.counter();
            let record = engine.draw(&pool, &mut pity, &mut ledger);
            if record.card.rarity.is_top() {
                assert_eq!(pity.counter(), 0);
            } else {
                assert_eq!(pity.counter(), before + 1);
            }
            assert!(pity.counter() < 90);
        }
        assert_eq!(ledger.total_pulls(), 200);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_missing_tier_yields_placeholder() {
        let mut engine = engine(3);
        let pool = Pool::new("empty", "Empty Banner");

        let card = engine.select_card(&pool, Rarity::Sr);
        assert!(card.id.starts_with("MOCK_SR_"));
        let suffix: u32 = card.id.trim_start_matches("MOCK_SR_").parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
        assert!(!card.is_featured);
        assert!(card.image_url.is_none());
    }

    #[test]
    fn test_dangling_featured_falls_back_to_all_top_cards() {
        let mut engine = engine(11);
        let pool = Pool::new("broken", "Broken Banner")
            .with_card(Card::new("ssr_a", "Aria", Rarity::Ssr))
            .with_featured("ghost");

        for _ in 0..20 {
            let card = engine.select_card(&pool, Rarity::Ssr);
            assert_eq!(card.id, "ssr_a");
        }
    }

    #[test]
    fn test_featured_rate_one_always_picks_featured() {
        let config = GachaConfig {
            featured_rate: 1.0,
            ..GachaConfig::default()
        };
        let mut engine = DrawEngine::new(&config);
        engine.seed(5);
        let pool = featured_pool().with_card(Card::new("Z", "Zephyr", Rarity::Ssr));

        for _ in 0..50 {
            let card = engine.select_card(&pool, Rarity::Ssr);
            assert!(card.id == "X" || card.id == "Y");
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let pool = featured_pool();
        let mut a = engine(2024);
        let mut b = engine(2024);
        let (mut pa, mut pb) = (PityState::new(), PityState::new());
        let (mut la, mut lb) = (StatisticsLedger::new(), StatisticsLedger::new());

        for _ in 0..300 {
            a.draw(&pool, &mut pa, &mut la);
            b.draw(&pool, &mut pb, &mut lb);
        }
        assert_eq!(pa, pb);
        assert_eq!(la, lb);
    }
}
