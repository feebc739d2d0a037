//! Typed stores for the records an OAuth client keeps between requests.
pub mod keyed;
pub mod kv;
pub mod session;
pub mod state;

pub use sauth_common::store::{memory::MemoryStore, Store};

/// Upper bound on the lifetime of stored state and session records, in seconds.
pub const A_HUNDRED_DAYS: u64 = 60 * 60 * 24 * 100;
