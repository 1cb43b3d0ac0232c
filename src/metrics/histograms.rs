//! Histogram metrics

use super::labels;
use std::time::Duration;

/// Wall time of one open call
pub fn open_duration(result: &'static str, duration: Duration) {
    ::metrics::histogram!(labels::OPEN_DURATION_SECONDS, "result" => result)
        .record(duration.as_secs_f64());
}
