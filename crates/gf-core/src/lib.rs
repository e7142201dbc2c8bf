//! gf-core: Shared error taxonomy for GachaForge
//!
//! Every GachaForge crate reports failures through [`GfError`]; transport
//! layers turn them into a reason code plus message via [`GfError::code`].

mod error;

pub use error::*;
