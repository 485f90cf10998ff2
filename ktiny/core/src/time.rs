//! Tick counts

use core::fmt;

/// Number of system ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick(u64);

impl Tick {
    /// Zero ticks
    pub const ZERO: Self = Self(0);

    /// Largest representable tick count
    pub const MAX: Self = Self(u64::MAX);

    /// Create a tick count
    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Get the raw tick value
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Check if zero
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Earlier of two optional deadlines; `None` means no deadline at all
    pub fn earliest(a: Option<Tick>, b: Option<Tick>) -> Option<Tick> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

impl From<u64> for Tick {
    fn from(ticks: u64) -> Self {
        Self(ticks)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ticks", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Tick {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}ticks", self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_prefers_present_deadline() {
        let a = Some(Tick::new(10));
        let b = Some(Tick::new(3));
        assert_eq!(Tick::earliest(a, b), Some(Tick::new(3)));
        assert_eq!(Tick::earliest(a, None), a);
        assert_eq!(Tick::earliest(None, b), b);
        assert_eq!(Tick::earliest(None, None), None);
    }
}
