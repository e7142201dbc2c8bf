//! # gf-gacha - Draw engine for GachaForge
//!
//! Simulates randomized card draws with a soft/hard pity guarantee.
//!
//! ## Architecture
//!
//! ```text
//! GachaConfig
//!     │
//!     ├── RarityTable (tiers, base probabilities, PityConfig)
//!     └── PullLimits / SessionMode
//!           │
//!           v
//! DrawEngine ──reads──> PoolCatalog / Pool
//!     │
//!     └──mutates──> PityState + StatisticsLedger → PullRecord
//! ```
//!
//! The top tier is the only escalated tier. Once the pity counter reaches the
//! soft threshold its probability grows linearly per draw, and the draw at the
//! hard threshold is guaranteed.

pub mod config;
pub mod engine;
pub mod ledger;
pub mod pity;
pub mod pool;
pub mod rarity;

pub use config::*;
pub use engine::*;
pub use ledger::*;
pub use pity::*;
pub use pool::*;
pub use rarity::*;
