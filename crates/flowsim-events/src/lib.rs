//! Agent event pub/sub: exact-string subscriptions, one-tick-delayed
//! delivery. See [`bus::EventBus`] for the full contract.

mod bus;

pub use bus::EventBus;
