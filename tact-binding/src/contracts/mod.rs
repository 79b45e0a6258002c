//! Generated bindings for concrete contracts

pub mod payouts;

pub use payouts::{Payouts, PayoutsMessage, init_data, payouts_errors};
