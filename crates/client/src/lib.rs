//! Composition root for the damage simulation.
//!
//! Loads content through `damage-content`, wires the `damage-runtime` systems
//! together, and drives a short scripted session that exercises every stage
//! of the pipeline.

pub mod config;
pub mod session;

pub use config::SimConfig;
pub use session::{EntityReport, Session, SessionReport};
