//! Purging of foreign runtime-library metadata.
//!
//! # Key Components
//!
//! - [`MetadataPurger`] - The weaver performing the purge
//! - [`PurgeContext`] - Per-run state handed through the purge operations
//! - [`PurgeConfig`] - Foreign library identifier and attribute removal set
//! - [`PurgeStats`] - What a run removed and reported
//!
//! # Policy
//!
//! Bookkeeping metadata (reference rows and attributes) is removed. Code that still
//! depends on the library is left intact and reported as warnings through
//! [`crate::metadata::diagnostics::Diagnostics`].

mod config;
mod purger;
mod stats;

pub use config::{
    PurgeConfig, DEFAULT_FOREIGN_LIBRARY, DEFAULT_REMOVABLE_ATTRIBUTES, WEAVER_NAME,
};
pub use purger::{detach_accessors, purge_each, MetadataPurger, PurgeContext};
pub use stats::PurgeStats;
