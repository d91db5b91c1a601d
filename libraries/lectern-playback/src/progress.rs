//! Progress synchronizer - debounced, race-safe persistence policy
//!
//! Decides when a position is worth writing to the remote store: a
//! repeating timer while playing, a 2-second suppression window against
//! write amplification from timer, scrub and device time updates firing
//! together, and forced flushes on pause, seek completion, end-of-track
//! and session teardown. The actual store round trip is driven by the
//! facade; `record_saved` runs only after a successful acknowledgement so
//! a failed save retries with the same delta on the next eligible tick.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct ProgressSynchronizer {
    last_saved_time: f64,
    suppression_secs: f64,
    interval: Duration,
    next_due: Option<Instant>,
}

impl ProgressSynchronizer {
    pub fn new(interval: Duration, suppression_secs: f64) -> Self {
        Self {
            last_saved_time: 0.0,
            suppression_secs,
            interval,
            next_due: None,
        }
    }

    /// Reset for a new session. `restored_time` seeds the suppression
    /// baseline so restoring a position does not immediately re-save it.
    pub fn reset(&mut self, restored_time: f64) {
        self.last_saved_time = restored_time;
        self.next_due = None;
    }

    /// Arm the repeating timer; called on entering `Playing`.
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Cancel the timer; called immediately on leaving `Playing`.
    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn timer_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Schedule the next periodic save after a tick fired.
    pub fn rearm(&mut self, now: Instant) {
        if self.next_due.is_some() {
            self.next_due = Some(now + self.interval);
        }
    }

    /// Whether a save for this position should go to the network.
    ///
    /// No-op while the duration is unknown; unforced saves within the
    /// suppression window of the last acknowledged position are skipped.
    pub fn should_save(&self, current_time: f64, duration: f64, forced: bool) -> bool {
        if duration <= 0.0 {
            return false;
        }
        if !forced && (current_time - self.last_saved_time).abs() < self.suppression_secs {
            return false;
        }
        true
    }

    /// Record a successful acknowledgement.
    pub fn record_saved(&mut self, current_time: f64) {
        self.last_saved_time = current_time;
    }

    pub fn last_saved_time(&self) -> f64 {
        self.last_saved_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync() -> ProgressSynchronizer {
        ProgressSynchronizer::new(Duration::from_secs(5), 2.0)
    }

    #[test]
    fn suppresses_small_deltas() {
        let mut s = sync();
        assert!(s.should_save(10.0, 100.0, false));
        s.record_saved(10.0);

        assert!(!s.should_save(11.5, 100.0, false));
        assert!(s.should_save(12.0, 100.0, false));
        assert!(s.should_save(7.0, 100.0, false));
    }

    #[test]
    fn forced_save_bypasses_suppression() {
        let mut s = sync();
        s.record_saved(10.0);
        assert!(s.should_save(10.1, 100.0, true));
    }

    #[test]
    fn unknown_duration_is_a_noop_even_forced() {
        let s = sync();
        assert!(!s.should_save(10.0, 0.0, false));
        assert!(!s.should_save(10.0, 0.0, true));
    }

    #[test]
    fn failed_save_keeps_the_delta() {
        let mut s = sync();
        s.record_saved(10.0);
        // A failed round trip never calls record_saved, so the same
        // position stays eligible.
        assert!(s.should_save(13.0, 100.0, false));
        assert!(s.should_save(13.0, 100.0, false));
    }

    #[test]
    fn timer_armed_only_while_playing() {
        let mut s = sync();
        let now = Instant::now();
        assert!(!s.timer_due(now + Duration::from_secs(60)));

        s.arm(now);
        assert!(!s.timer_due(now + Duration::from_secs(4)));
        assert!(s.timer_due(now + Duration::from_secs(5)));

        s.rearm(now + Duration::from_secs(5));
        assert!(!s.timer_due(now + Duration::from_secs(9)));
        assert!(s.timer_due(now + Duration::from_secs(10)));

        s.disarm();
        assert!(!s.timer_due(now + Duration::from_secs(60)));
    }

    #[test]
    fn reset_seeds_baseline_from_restored_position() {
        let mut s = sync();
        s.reset(42.0);
        assert!(!s.should_save(42.5, 100.0, false));
        assert!(s.should_save(45.0, 100.0, false));
    }
}
