//! Counter metrics

use super::labels;
use crate::connector::AttemptOutcome;
use crate::credential::Slot;

/// An open call finished
pub fn open_completed(result: &'static str) {
    ::metrics::counter!(labels::OPEN_TOTAL, "result" => result).increment(1);
}

/// A connect attempt finished
pub fn attempt(slot: Slot, outcome: AttemptOutcome) {
    ::metrics::counter!(
        labels::ATTEMPTS_TOTAL,
        "slot" => slot.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Primary credentials were rejected and the other slot is being tried
pub fn failover() {
    ::metrics::counter!(labels::FAILOVER_TOTAL).increment(1);
}

/// A refresh was requested
pub fn refresh(action: &'static str) {
    ::metrics::counter!(labels::REFRESH_TOTAL, "action" => action).increment(1);
}
