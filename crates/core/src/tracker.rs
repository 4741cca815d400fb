//! Consecutive unknown-command counting.

use tracing::debug;

/// Consecutive unknown commands tolerated before a fallback is forced.
pub const UNKNOWN_THRESHOLD: u32 = 3;

/// Counts consecutive unrecognized commands.
///
/// Once the count exceeds [`UNKNOWN_THRESHOLD`] the caller should force a
/// default resolution on the active conflict. Firing consumes the streak.
#[derive(Debug, Default, Clone)]
pub struct ErrorToleranceTracker {
    count: u32,
}

impl ErrorToleranceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn record_success(&mut self) {
        self.count = 0;
    }

    /// Returns `true` when a fallback should be forced.
    pub fn record_unknown(&mut self) -> bool {
        self.count += 1;
        if self.count > UNKNOWN_THRESHOLD {
            debug!(count = self.count, "unknown-command threshold exceeded");
            self.count = 0;
            return true;
        }
        false
    }

    /// Count an editor buffer that failed to parse.
    ///
    /// This never fires by itself, so the count may end above the
    /// threshold; the next unknown command then forces the fallback.
    pub fn record_rejected_edit(&mut self) {
        self.count += 1;
        debug!(count = self.count, "rejected edit counted");
    }
}
