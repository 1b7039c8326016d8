//! Plaid: bank-data aggregation API adapter.
//!
//! DESIGN
//! ======
//! Handlers never talk to Plaid directly. They go through the [`PlaidApi`]
//! trait held in `AppState`, which is a [`PlaidClient`] in production and a
//! mock in tests.

pub mod client;
pub mod config;
pub mod types;

pub use client::PlaidClient;
pub use config::PlaidConfig;
pub use types::{PlaidApi, PlaidError};
