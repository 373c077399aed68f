//! In-process publish/subscribe for roster events.

pub mod bus;

pub use bus::{EventBus, RosterEvent};
