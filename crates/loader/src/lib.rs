//! Batched, deduplicating, per-request loader.
//!
//! This crate provides:
//! - [`BatchFn`] trait for fetching many values by key in one call
//! - [`Loader`] which coalesces individual `load` calls made within a short
//!   wait window into a single [`BatchFn::load`] call, deduplicates keys and
//!   caches every outcome for the loader's lifetime
//!
//! A loader is meant to live for exactly one inbound request.

pub mod batch;
pub mod error;
pub mod loader;

pub use batch::BatchFn;
pub use error::{LoaderError, Result};
pub use loader::{Loader, LoaderConfig};
