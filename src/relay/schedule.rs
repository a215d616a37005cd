//! Fixed-interval clock for the firmware-version sync.

use std::time::Duration;

/// Tracks when the maintenance action last ran against a monotonic
/// timestamp supplied by the caller.
///
/// `mark_fired` is called the instant the action is dispatched, before its
/// outcome is known, so a failed sync waits a full interval like any
/// other. A fire blocked by a down network is *not* marked, which keeps it
/// pending until the link comes back.
#[derive(Debug)]
pub struct ScheduleClock {
    interval: Duration,
    last_run: Duration,
}

impl ScheduleClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: Duration::ZERO,
        }
    }

    pub fn due(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_run) >= self.interval
    }

    pub fn mark_fired(&mut self, now: Duration) {
        self.last_run = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn fires_once_per_interval() {
        let mut clock = ScheduleClock::new(secs(60));
        assert!(!clock.due(secs(0)));
        assert!(!clock.due(secs(30)));
        assert!(clock.due(secs(61)));
        clock.mark_fired(secs(61));
        assert!(!clock.due(secs(90)));
        assert!(clock.due(secs(121)));
    }

    #[test]
    fn deferred_fire_stays_pending() {
        let mut clock = ScheduleClock::new(secs(60));
        // Due at 60, but suppose the caller could not fire: nothing marked.
        assert!(clock.due(secs(60)));
        assert!(clock.due(secs(70)));
        clock.mark_fired(secs(70));
        assert!(!clock.due(secs(100)));
    }

    #[test]
    fn failed_action_does_not_refire_early() {
        // The caller marks before knowing the outcome, so failure looks the
        // same as success to the clock.
        let mut clock = ScheduleClock::new(secs(60));
        clock.mark_fired(secs(60));
        assert!(!clock.due(secs(61)));
        assert!(clock.due(secs(120)));
    }
}
