//! Domain types, validation, and pure aggregation for the classpoints
//! engine.
//!
//! This crate has zero internal dependencies so it can be used by the
//! storage layer, the engine facade, and any future CLI tooling alike.

pub mod avatar;
pub mod error;
pub mod stats;
pub mod transaction;
pub mod types;
pub mod user;
