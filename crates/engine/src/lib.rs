//! The operations facade over the roster store.
//!
//! [`ClassEngine`] exposes the six mutating operations (identity resolution,
//! sign-out, avatar save, points ledger, role promotion, display-name
//! update) and the two read views (leaderboard, class stats). The
//! presentation layer calls these and renders the returned plain data.

pub mod avatar;
pub mod config;
pub mod engine;
pub mod identity;
pub mod ledger;
pub mod roles;
pub mod views;

pub use config::EngineConfig;
pub use engine::ClassEngine;
pub use ledger::PointsReceipt;
