//! # gf-state - Session state for GachaForge
//!
//! Wraps the draw engine in a session: active pool selection, snapshot
//! persistence after each mutation, derived statistics and the text report.
//!
//! ```text
//! SessionController<S: SnapshotStore>
//!     ├── PoolCatalog (optional until loaded)
//!     ├── DrawEngine
//!     ├── SessionSnapshot ──save/load──> S (MemoryStore | JsonFileStore)
//!     └── StatisticsView / render_report / Response<T>
//! ```

pub mod report;
pub mod response;
pub mod session;
pub mod snapshot;
pub mod store;

pub use report::*;
pub use response::*;
pub use session::*;
pub use snapshot::*;
pub use store::*;
