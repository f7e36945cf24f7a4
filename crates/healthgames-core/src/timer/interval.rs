//! Repeating intervals and cancellable one-shot transitions.
//!
//! Both operate on caller-supplied timestamps. A stopped interval or a
//! cancelled transition never fires again, which is what keeps a torn-down
//! game from being mutated by a stale timer.

/// A repeating timer with a fixed period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    period_ms: u64,
    next_due_ms: Option<u64>,
}

impl Interval {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due_ms: None,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn is_running(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.next_due_ms
    }

    /// Arm the interval; the first period elapses at `now + period`.
    pub fn start(&mut self, now_ms: u64) {
        self.next_due_ms = Some(now_ms.saturating_add(self.period_ms));
    }

    pub fn stop(&mut self) {
        self.next_due_ms = None;
    }

    /// Returns `true` once per elapsed period.
    ///
    /// Each `true` moves the deadline forward by exactly one period, so
    /// calling this in a loop catches up after a late poll without drift.
    pub fn due(&mut self, now_ms: u64) -> bool {
        match self.next_due_ms {
            Some(due) if now_ms >= due => {
                self.next_due_ms = Some(due.saturating_add(self.period_ms));
                true
            }
            _ => false,
        }
    }
}

/// A single delayed transition that can be cancelled before it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<T> {
    slot: Option<(u64, T)>,
}

impl<T> Default for Scheduled<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> Scheduled<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` for `due_ms`, replacing anything still pending.
    pub fn schedule(&mut self, due_ms: u64, action: T) {
        self.slot = Some((due_ms, action));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.slot.take().map(|(_, action)| action)
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    pub fn due_at(&self) -> Option<u64> {
        self.slot.as_ref().map(|(due, _)| *due)
    }

    pub fn pending(&self) -> Option<&T> {
        self.slot.as_ref().map(|(_, action)| action)
    }

    /// Take the action if its deadline has passed.
    pub fn take_due(&mut self, now_ms: u64) -> Option<T> {
        match self.slot {
            Some((due, _)) if now_ms >= due => self.slot.take().map(|(_, action)| action),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_fires_once_per_period() {
        let mut interval = Interval::new(1_000);
        assert!(!interval.due(5_000));

        interval.start(0);
        assert!(!interval.due(999));
        assert!(interval.due(1_000));
        assert!(!interval.due(1_500));
        assert!(interval.due(2_000));
    }

    #[test]
    fn interval_catches_up_after_late_poll() {
        let mut interval = Interval::new(1_000);
        interval.start(0);
        let mut fired = 0;
        while interval.due(3_500) {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert!(interval.due(4_000));
    }

    #[test]
    fn stopped_interval_never_fires() {
        let mut interval = Interval::new(4_000);
        interval.start(0);
        interval.stop();
        assert!(!interval.is_running());
        assert!(!interval.due(100_000));
    }

    #[test]
    fn scheduled_fires_at_deadline() {
        let mut pending = Scheduled::new();
        pending.schedule(500, "reveal");
        assert_eq!(pending.take_due(499), None);
        assert_eq!(pending.take_due(500), Some("reveal"));
        assert!(!pending.is_pending());
    }

    #[test]
    fn cancelled_transition_is_gone() {
        let mut pending = Scheduled::new();
        pending.schedule(2_000, 7u8);
        assert_eq!(pending.cancel(), Some(7));
        assert_eq!(pending.take_due(10_000), None);
    }

    #[test]
    fn reschedule_replaces_pending() {
        let mut pending = Scheduled::new();
        pending.schedule(100, 1u8);
        pending.schedule(900, 2u8);
        assert_eq!(pending.due_at(), Some(900));
        assert_eq!(pending.take_due(100), None);
        assert_eq!(pending.take_due(900), Some(2));
    }
}
