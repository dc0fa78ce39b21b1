//! Dietz - broker account-statement performance analyzer
//!
//! This library parses broker statement exports containing daily valuation
//! snapshots and cash movements, reconciles the movements against the
//! valuation series, and derives cash-flow-adjusted performance figures
//! (Modified Dietz percentage and chained time-weighted return).

pub mod error;
pub mod importers;
pub mod reports;
pub mod statement;
pub mod utils;
