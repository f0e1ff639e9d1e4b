//! Configuration types
//!
//! Channel configuration can be loaded from a TOML subset (human-edited
//! node config) or from a postcard blob (with the `serde` feature).

#[cfg(feature = "serde")]
pub mod store;
pub mod toml;
pub mod types;

pub use types::*;
