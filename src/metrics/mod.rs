//! Metrics for rotating connections
//!
//! Recorded through the `metrics` facade; they are no-ops until the
//! embedding application installs a recorder.

pub mod counters;
pub mod histograms;
pub mod labels;
