//! Armory access: regional hosts, endpoint URLs, and the blocking fetcher.

mod client;
mod error;
pub mod urls;

pub use client::{ArmoryClient, ArmoryClientBuilder, Fetch, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use error::FetchError;
pub use urls::{Endpoint, Region};
