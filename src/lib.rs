//! Aggregates the payments of a construction project into a single ledger.
//!
//! A project record holds general payments plus sites, workers and materials, each of which may
//! carry its own payments. The `ledger` module normalizes those four collections into
//! `LedgerEntry` values, totals them per category, and filters, orders and projects them into
//! reports. The `store` module fetches the collections from a document store.

pub mod args;
pub mod attendance;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod store;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, Result};
