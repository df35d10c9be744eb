//! Analytical core of the battery-impact dashboard.
//!
//! The crate turns a flat table of encoded battery records into the
//! comparison statistics and chart-ready series the dashboard pages render:
//! per-feature distributional summaries, element-containment group
//! comparisons, projection-coordinate lookups, and trained-model result
//! lookups against an external record store.
//!
//! Rendering is deliberately absent. Everything here is synchronous and
//! recomputed per interaction against session-scoped caches ([`session`]).

pub mod config;
pub mod data;
pub mod error;
pub mod explore;
pub mod projection;
pub mod registry;
pub mod results;
pub mod session;
pub mod stats;
pub mod store;

pub use error::DashboardError;
