//! Button trigger state shared between interrupt context and the main loop.

use core::cell::Cell;

use critical_section::Mutex;

/// A read request latched by the button edge interrupt.
///
/// The handler raises the flag; the main loop takes it, which clears it
/// before any debounce or sensor work starts. An edge arriving while a read
/// is being serviced re-raises the flag and is picked up on the next loop
/// iteration rather than being lost.
pub struct TriggerFlag {
    raised: Mutex<Cell<bool>>,
}

impl TriggerFlag {
    pub const fn new() -> Self {
        Self {
            raised: Mutex::new(Cell::new(false)),
        }
    }

    /// Latches a pending read request. Safe to call from interrupt context.
    pub fn raise(&self) {
        critical_section::with(|cs| self.raised.borrow(cs).set(true));
    }

    /// Returns whether a request was pending and clears it in the same
    /// critical section, so a concurrent edge is never dropped.
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.raised.borrow(cs).replace(false))
    }
}

impl Default for TriggerFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimum-interval policy between accepted triggers.
/// Requests arriving too early are dropped, not queued.
pub struct Debounce {
    interval_us: u64,
    last_accepted_us: Option<u64>,
}

impl Debounce {
    /// param interval_us: minimum spacing between accepted triggers
    pub fn new(interval_us: u64) -> Self {
        Self {
            interval_us,
            last_accepted_us: None,
        }
    }

    /// Decides whether a trigger observed at `now_us` is serviced.
    /// The first trigger is always accepted; afterwards a trigger is
    /// accepted once at least the full interval has elapsed since the last
    /// accepted one. Accepting records `now_us` as the new reference point.
    pub fn try_accept(&mut self, now_us: u64) -> bool {
        if let Some(last) = self.last_accepted_us {
            if now_us.saturating_sub(last) < self.interval_us {
                return false;
            }
        }
        self.last_accepted_us = Some(now_us);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: u64 = 2_000_000;

    #[test]
    fn first_trigger_is_accepted() {
        let mut debounce = Debounce::new(INTERVAL);
        assert!(debounce.try_accept(100));
    }

    #[test]
    fn early_triggers_are_dropped() {
        let mut debounce = Debounce::new(INTERVAL);
        assert!(debounce.try_accept(0));
        assert!(!debounce.try_accept(1));
        assert!(!debounce.try_accept(1_999_999));
    }

    #[test]
    fn exactly_the_interval_is_accepted() {
        let mut debounce = Debounce::new(INTERVAL);
        assert!(debounce.try_accept(500));
        assert!(debounce.try_accept(500 + INTERVAL));
    }

    #[test]
    fn dropped_triggers_do_not_move_the_reference_point() {
        let mut debounce = Debounce::new(INTERVAL);
        assert!(debounce.try_accept(0));
        // a rejected trigger near the end of the window must not push the
        // window out
        assert!(!debounce.try_accept(1_900_000));
        assert!(debounce.try_accept(2_000_000));
    }

    #[test]
    fn flag_take_clears_and_reports() {
        let flag = TriggerFlag::new();
        assert!(!flag.take());

        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn edge_during_service_is_deferred_not_lost() {
        let flag = TriggerFlag::new();
        flag.raise();

        // main loop observes and clears the flag before doing any work
        assert!(flag.take());

        // a second edge fires while the sensor read is in progress
        flag.raise();

        // it is still pending on the next loop iteration
        assert!(flag.take());
    }

    #[test]
    fn repeated_raises_coalesce_into_one_service() {
        let flag = TriggerFlag::new();
        flag.raise();
        flag.raise();
        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }
}
