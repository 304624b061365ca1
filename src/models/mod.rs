//! Data models for scopewatch.

mod scope;
mod snapshot;

pub use scope::{
    parse_bool, ScopeRow, ScopeSnapshot, REQUIRED_COLUMNS, URL_ASSET_TYPE,
};
pub use snapshot::SnapshotEntry;
