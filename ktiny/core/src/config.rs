//! Build-time kernel configuration
//!
//! Feature switches gate fields and operations at compile time. The
//! constants below only mirror them so that diagnostics and the trace
//! target-info record can report how the kernel was built.

/// Nesting type used by both nesting counters
pub type Nesting = u8;

/// Ceiling of the interrupt nesting counter
pub const NESTING_LIMIT_IRQ: Nesting = 250;

/// Ceiling of the scheduler lock nesting counter
pub const NESTING_LIMIT_SCHED_LOCK: Nesting = 250;

/// Object headers carry and check a type tag
pub const OBJECT_VERIFY_ENABLED: bool = cfg!(feature = "object-verify");

/// Object headers track their allocation origin
pub const MMHEAP_ENABLED: bool = cfg!(feature = "mmheap");

/// Idle loop asks for the next expiry instead of ticking periodically
pub const TICKLESS_ENABLED: bool = cfg!(feature = "tickless");

/// Snapshot of how this kernel was built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelInfo {
    pub version: &'static str,
    pub irq_nesting_limit: Nesting,
    pub sched_lock_nesting_limit: Nesting,
    pub object_verify: bool,
    pub mmheap: bool,
    pub tickless: bool,
}

impl KernelInfo {
    /// Describe the current build
    pub const fn current() -> Self {
        Self {
            version: crate::VERSION,
            irq_nesting_limit: NESTING_LIMIT_IRQ,
            sched_lock_nesting_limit: NESTING_LIMIT_SCHED_LOCK,
            object_verify: OBJECT_VERIFY_ENABLED,
            mmheap: MMHEAP_ENABLED,
            tickless: TICKLESS_ENABLED,
        }
    }

    /// Pack the feature switches into one byte (bit 0 verify, 1 mmheap, 2 tickless)
    pub const fn feature_bits(&self) -> u8 {
        (self.object_verify as u8) | ((self.mmheap as u8) << 1) | ((self.tickless as u8) << 2)
    }
}

impl Default for KernelInfo {
    fn default() -> Self {
        Self::current()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for KernelInfo {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "KernelInfo{{ version: {}, irq_limit: {}, lock_limit: {}, features: {=u8:b} }}",
            self.version,
            self.irq_nesting_limit,
            self.sched_lock_nesting_limit,
            self.feature_bits()
        );
    }
}
