//! Bounded nesting counters

use core::fmt;

use crate::config::{Nesting, NESTING_LIMIT_IRQ, NESTING_LIMIT_SCHED_LOCK};

/// Nonnegative counter of unmatched enter/lock calls with a hard ceiling
///
/// A rejected `enter` or `leave` leaves the depth exactly where it was.
/// Callers already holding nested levels rely on that: their later
/// `leave` calls still line up after a rejected `enter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NestingCounter<const LIMIT: Nesting> {
    depth: Nesting,
}

/// Interrupt nesting counter
pub type IrqNesting = NestingCounter<NESTING_LIMIT_IRQ>;

/// Scheduler lock nesting counter
pub type SchedLockNesting = NestingCounter<NESTING_LIMIT_SCHED_LOCK>;

impl<const LIMIT: Nesting> NestingCounter<LIMIT> {
    /// Ceiling of this counter
    pub const LIMIT: Nesting = LIMIT;

    /// Create a counter at depth 0
    pub const fn new() -> Self {
        Self { depth: 0 }
    }

    /// Current depth
    pub const fn depth(&self) -> Nesting {
        self.depth
    }

    /// Check if at least one level is held
    pub const fn is_nested(&self) -> bool {
        self.depth > 0
    }

    /// Check if another `enter` would be rejected
    pub const fn is_at_limit(&self) -> bool {
        self.depth >= LIMIT
    }

    /// Add one level; returns the new depth, or `None` at the ceiling
    pub fn enter(&mut self) -> Option<Nesting> {
        if self.is_at_limit() {
            return None;
        }
        self.depth += 1;
        Some(self.depth)
    }

    /// Drop one level; returns the new depth, or `None` if already at 0
    pub fn leave(&mut self) -> Option<Nesting> {
        self.depth = self.depth.checked_sub(1)?;
        Some(self.depth)
    }

    /// Force the depth back to 0
    pub fn reset(&mut self) {
        self.depth = 0;
    }
}

impl<const LIMIT: Nesting> fmt::Display for NestingCounter<LIMIT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.depth, LIMIT)
    }
}

#[cfg(feature = "defmt")]
impl<const LIMIT: Nesting> defmt::Format for NestingCounter<LIMIT> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}/{}", self.depth, LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_stops_at_limit() {
        let mut counter = NestingCounter::<3>::new();
        assert_eq!(counter.enter(), Some(1));
        assert_eq!(counter.enter(), Some(2));
        assert_eq!(counter.enter(), Some(3));
        assert!(counter.is_at_limit());

        assert_eq!(counter.enter(), None);
        assert_eq!(counter.depth(), 3);
    }

    #[test]
    fn leave_at_zero_is_rejected() {
        let mut counter = NestingCounter::<3>::new();
        assert_eq!(counter.leave(), None);
        assert_eq!(counter.depth(), 0);
        assert!(!counter.is_nested());
    }

    #[test]
    fn rejected_enter_keeps_later_leaves_matched() {
        let mut counter = NestingCounter::<2>::new();
        counter.enter();
        counter.enter();
        assert_eq!(counter.enter(), None);

        assert_eq!(counter.leave(), Some(1));
        assert_eq!(counter.leave(), Some(0));
        assert_eq!(counter.leave(), None);
    }

    #[test]
    fn kernel_counters_use_kernel_limits() {
        assert_eq!(IrqNesting::LIMIT, 250);
        assert_eq!(SchedLockNesting::LIMIT, 250);
    }
}
