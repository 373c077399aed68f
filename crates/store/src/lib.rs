//! The roster store: durable users + transaction log behind a tiered
//! persistence chain.
//!
//! Tier order is primary-first (PostgreSQL when configured, then the JSON
//! file cache); a fixed seed roster guarantees the store is never empty.

pub mod error;
pub mod file;
pub mod memory;
pub mod postgres;
pub mod roster;
pub mod seed;
pub mod tier;
pub mod tiered;

pub use error::StoreError;
pub use file::FileTier;
pub use memory::MemoryTier;
pub use postgres::PostgresTier;
pub use roster::{ListOrder, RosterStore, TransactionFilter};
pub use seed::seed_roster;
pub use tier::{RosterData, RosterTier};
pub use tiered::{Persistence, TieredStore, DEFAULT_TIER_TIMEOUT};
