//! scopewatch library: fetch bug bounty scope exports, keep one snapshot per
//! program, and report eligible assets that changed between checks.

pub mod config;
pub mod diff;
pub mod eligibility;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod models;
pub mod platform;
pub mod storage;
pub mod watcher;

pub use error::{Result, ScopeError};
