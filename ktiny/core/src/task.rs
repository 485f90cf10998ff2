//! Task identity
//!
//! Task control blocks, ready queues and stacks belong to the task
//! subsystem. The kernel core only compares identities.

use core::fmt;

/// Opaque handle naming one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(usize);

impl TaskId {
    /// Create a handle from the task subsystem's raw identifier
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Get the raw identifier
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Task({})", self.0);
    }
}
