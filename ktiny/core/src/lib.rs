#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # ktiny Core
//!
//! Shared vocabulary of the ktiny kernel: result codes, build configuration,
//! tick and task identifiers, the bounded nesting counter and the object
//! header every kernel primitive embeds.
//!
//! Nothing in this crate touches global state. The kernel crate owns the
//! singletons and decides when interrupts are masked.

use core::fmt;

pub mod config;
pub mod nesting;
pub mod object;
pub mod task;
pub mod time;

pub use config::*;
pub use nesting::*;
pub use object::*;
pub use task::*;
pub use time::*;

/// ktiny version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type returned by every fallible kernel operation
pub type KResult<T> = Result<T, KError>;

/// Error codes for kernel operations
///
/// Success is `Ok(())`; everything else is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KError {
    /// The kernel is already running
    KernelRunning,
    /// The kernel has not been started
    KernelNotRunning,
    /// `start` was called before a successful `init`
    NotInitialized,
    /// Scheduler lock nesting would exceed its ceiling
    LockNestingOverflow,
    /// Unlock without a matching lock
    SchedNotLocked,
    /// Operation is not allowed in interrupt context
    InIrq,
    /// Blocking operation attempted while the scheduler is locked
    PendSchedLocked,
    /// Object header does not carry the expected type tag
    ObjInvalid,
    /// Object was released through the wrong allocation path
    ObjInvalidAllocType,
}

/// Broad class of a [`KError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KErrorCategory {
    /// Operation called in the wrong global kernel state
    Lifecycle,
    /// Enter/lock ceiling exceeded or unmatched leave/unlock
    Nesting,
    /// Handle does not refer to a live object of the expected kind
    Verification,
    /// Operation called from a context that forbids it
    Context,
}

impl KError {
    /// Classify this error
    pub const fn category(self) -> KErrorCategory {
        match self {
            KError::KernelRunning | KError::KernelNotRunning | KError::NotInitialized => {
                KErrorCategory::Lifecycle
            }
            KError::LockNestingOverflow | KError::SchedNotLocked => KErrorCategory::Nesting,
            KError::ObjInvalid | KError::ObjInvalidAllocType => KErrorCategory::Verification,
            KError::InIrq | KError::PendSchedLocked => KErrorCategory::Context,
        }
    }
}

impl fmt::Display for KError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KError::KernelRunning => write!(f, "Kernel is already running"),
            KError::KernelNotRunning => write!(f, "Kernel is not running"),
            KError::NotInitialized => write!(f, "Kernel is not initialized"),
            KError::LockNestingOverflow => write!(f, "Scheduler lock nesting overflow"),
            KError::SchedNotLocked => write!(f, "Scheduler is not locked"),
            KError::InIrq => write!(f, "Not allowed in interrupt context"),
            KError::PendSchedLocked => write!(f, "Cannot block while scheduler is locked"),
            KError::ObjInvalid => write!(f, "Invalid kernel object"),
            KError::ObjInvalidAllocType => write!(f, "Invalid object allocation type"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KError {}

#[cfg(feature = "defmt")]
impl defmt::Format for KError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            KError::KernelRunning => defmt::write!(fmt, "KernelRunning"),
            KError::KernelNotRunning => defmt::write!(fmt, "KernelNotRunning"),
            KError::NotInitialized => defmt::write!(fmt, "NotInitialized"),
            KError::LockNestingOverflow => defmt::write!(fmt, "LockNestingOverflow"),
            KError::SchedNotLocked => defmt::write!(fmt, "SchedNotLocked"),
            KError::InIrq => defmt::write!(fmt, "InIrq"),
            KError::PendSchedLocked => defmt::write!(fmt, "PendSchedLocked"),
            KError::ObjInvalid => defmt::write!(fmt, "ObjInvalid"),
            KError::ObjInvalidAllocType => defmt::write!(fmt, "ObjInvalidAllocType"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(KError::KernelRunning.category(), KErrorCategory::Lifecycle);
        assert_eq!(KError::KernelNotRunning.category(), KErrorCategory::Lifecycle);
        assert_eq!(KError::LockNestingOverflow.category(), KErrorCategory::Nesting);
        assert_eq!(KError::SchedNotLocked.category(), KErrorCategory::Nesting);
        assert_eq!(KError::ObjInvalid.category(), KErrorCategory::Verification);
        assert_eq!(KError::InIrq.category(), KErrorCategory::Context);
    }
}
