//! Cards, pools and the pool catalog

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use gf_core::{GfError, GfResult};

use crate::rarity::Rarity;

/// Pool category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    /// Always available
    #[default]
    Permanent,
    /// Event banner
    Event,
    /// Time-limited banner
    Limited,
}

impl PoolType {
    pub fn label(self) -> &'static str {
        match self {
            PoolType::Permanent => "permanent",
            PoolType::Event => "event",
            PoolType::Limited => "limited",
        }
    }
}

/// A drawable card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Unique within its pool
    #[serde(rename = "card_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    /// Owning pool
    #[serde(default)]
    pub pool_id: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Card {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rarity,
            pool_id: None,
            is_featured: false,
            image_url: None,
        }
    }

    /// Mark as featured
    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Stand-in for a tier the catalog has no entry for
    pub fn placeholder(rarity: Rarity, suffix: u32) -> Self {
        Self::new(
            format!("MOCK_{}_{suffix}", rarity.label()),
            format!("Placeholder {} card", rarity.label()),
            rarity,
        )
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with("MOCK_")
    }
}

/// A draw pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    #[serde(rename = "pool_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pool_type: PoolType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    /// Featured top-tier card ids
    #[serde(default, rename = "featured_ssr", alias = "featured")]
    pub featured: Vec<String>,
    #[serde(default)]
    pub library_id: Option<String>,
}

/// Pool listing entry for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub pool_id: String,
    pub name: String,
    pub pool_type: PoolType,
    pub description: String,
    pub card_count: usize,
    pub featured: Vec<String>,
}

impl Pool {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pool_type: PoolType::Permanent,
            description: String::new(),
            cards: Vec::new(),
            featured: Vec::new(),
            library_id: None,
        }
    }

    pub fn with_type(mut self, pool_type: PoolType) -> Self {
        self.pool_type = pool_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_card(mut self, mut card: Card) -> Self {
        card.pool_id = Some(self.id.clone());
        self.cards.push(card);
        self
    }

    /// Declare a featured top-tier card id
    pub fn with_featured(mut self, card_id: impl Into<String>) -> Self {
        self.featured.push(card_id.into());
        self
    }

    /// Catalog identifier, `LIB_<pool_id>` unless set
    pub fn library_id(&self) -> String {
        self.library_id
            .clone()
            .unwrap_or_else(|| format!("LIB_{}", self.id))
    }

    /// All cards of a tier; empty means the catalog has no entry for it
    pub fn cards_of(&self, rarity: Rarity) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.rarity == rarity).collect()
    }

    /// Is this id in the declared featured set?
    pub fn is_featured_id(&self, card_id: &str) -> bool {
        self.featured.iter().any(|id| id == card_id)
    }

    /// Top-tier cards eligible for the featured sub-roll
    pub fn featured_cards(&self) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|c| c.rarity.is_top() && (c.is_featured || self.is_featured_id(&c.id)))
            .collect()
    }

    /// Featured ids that do not name a top-tier card of this pool
    pub fn dangling_featured_ids(&self) -> Vec<&str> {
        self.featured
            .iter()
            .filter(|id| {
                !self
                    .cards
                    .iter()
                    .any(|c| c.rarity.is_top() && &c.id == *id)
            })
            .map(String::as_str)
            .collect()
    }

    pub fn summary(&self) -> PoolSummary {
        PoolSummary {
            pool_id: self.id.clone(),
            name: self.name.clone(),
            pool_type: self.pool_type,
            description: self.description.clone(),
            card_count: self.cards.len(),
            featured: self.featured.clone(),
        }
    }

    /// Fill in card ownership
    fn normalize(mut self) -> Self {
        for card in &mut self.cards {
            if card.pool_id.is_none() {
                card.pool_id = Some(self.id.clone());
            }
        }
        self
    }
}

/// On-disk catalog document
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    pools: Vec<Pool>,
}

/// All known pools, in load order
#[derive(Debug, Clone, Default)]
pub struct PoolCatalog {
    pools: IndexMap<String, Pool>,
}

impl PoolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pools(pools: impl IntoIterator<Item = Pool>) -> Self {
        let mut catalog = Self::new();
        for pool in pools {
            catalog.upsert(pool);
        }
        catalog
    }

    /// Parse a `{"pools": [...]}` document
    pub fn from_json_str(json: &str) -> GfResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)
            .map_err(|e| GfError::Serialization(format!("Invalid pool catalog: {e}")))?;
        Ok(Self::from_pools(doc.pools))
    }

    pub fn from_reader<R: Read>(reader: R) -> GfResult<Self> {
        let doc: CatalogDocument = serde_json::from_reader(reader)
            .map_err(|e| GfError::Serialization(format!("Invalid pool catalog: {e}")))?;
        Ok(Self::from_pools(doc.pools))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> GfResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Serialize back to the document format
    pub fn to_json(&self) -> GfResult<String> {
        let doc = CatalogDocument {
            pools: self.pools.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Insert or replace a pool, keeping its original position on replace
    pub fn upsert(&mut self, pool: Pool) {
        let pool = pool.normalize();
        for id in pool.dangling_featured_ids() {
            log::warn!(
                "Pool {} declares featured id {} with no matching SSR card",
                pool.id,
                id
            );
        }
        self.pools.insert(pool.id.clone(), pool);
    }

    pub fn clear(&mut self) {
        self.pools.clear();
    }

    pub fn get(&self, pool_id: &str) -> Option<&Pool> {
        self.pools.get(pool_id)
    }

    /// Like [`Self::get`] but reports a missing pool as an error
    pub fn lookup(&self, pool_id: &str) -> GfResult<&Pool> {
        self.get(pool_id)
            .ok_or_else(|| GfError::PoolNotFound(pool_id.to_string()))
    }

    pub fn contains(&self, pool_id: &str) -> bool {
        self.pools.contains_key(pool_id)
    }

    /// First loaded pool
    pub fn default_pool_id(&self) -> Option<&str> {
        self.pools.keys().next().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    pub fn summaries(&self) -> Vec<PoolSummary> {
        self.pools.values().map(Pool::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
