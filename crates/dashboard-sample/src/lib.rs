//! # Dashboard Sample Library
//!
//! Wires a `Dashboard` resource kind through the finalizer watcher. Exposed as a
//! library so the integration tests can drive the same system `main` runs.

pub mod handler;
pub mod lifecycle;
pub mod model;
pub mod registry;
