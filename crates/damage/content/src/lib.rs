//! Data-driven damage content and loaders.
//!
//! This crate reads the static definitions the damage pipeline consumes:
//! - Damage types, groups, containers, and resistance sets (RON)
//! - Global modifier tunables (TOML)
//! - Pipeline configuration (TOML)
//!
//! Content is handed to `damage-runtime` and never appears in entity state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, PrototypeLoader, Tunables, TunablesLoader};
