#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # ktiny Trace
//!
//! Software tracing for the ktiny kernel. The kernel reports lifecycle,
//! interrupt and scheduler events as small binary records; this crate
//! filters them and keeps the latest ones in a ring buffer that a debugger
//! or a host link can drain with [`read`].
//!
//! ```rust
//! use ktiny_trace::{global_filter, init, read, record, TraceRecord};
//!
//! init();
//! global_filter(TraceRecord::SchedLock, true);
//! record(TraceRecord::SchedLock, &[0, 1]);
//!
//! let entry = read().unwrap();
//! assert_eq!(entry.record, TraceRecord::SchedLock);
//! ```

mod buffer;
mod types;

pub use buffer::TraceBuffer;
pub use types::{TraceEntry, TraceHook, TraceRecord, PAYLOAD_MAX};

use core::cell::RefCell;
use critical_section::Mutex;
use ktiny_core::KernelInfo;

/// Capacity of the global trace buffer
pub const TRACE_CAPACITY: usize = 64;

// Global trace buffer instance
static TRACE_BUF: Mutex<RefCell<TraceBuffer<TRACE_CAPACITY>>> =
    Mutex::new(RefCell::new(TraceBuffer::new()));

/// Initialize the trace buffer
pub fn init() {
    critical_section::with(|cs| {
        TRACE_BUF.borrow_ref_mut(cs).init();
    });
}

/// Set global filter for a record type
pub fn global_filter(record: TraceRecord, enable: bool) {
    critical_section::with(|cs| {
        TRACE_BUF.borrow_ref_mut(cs).set_global_filter(record, enable);
    });
}

/// Set global filter mask directly
pub fn global_filter_mask(mask: u64) {
    critical_section::with(|cs| {
        TRACE_BUF.borrow_ref_mut(cs).set_global_filter_mask(mask);
    });
}

/// Store a record in the global buffer
///
/// Has the [`TraceHook`] signature, so the kernel can use it directly.
pub fn record(record: TraceRecord, payload: &[u8]) {
    critical_section::with(|cs| {
        TRACE_BUF.borrow_ref_mut(cs).record(record, payload);
    });
}

/// Take the oldest entry from the global buffer
pub fn read() -> Option<TraceEntry> {
    critical_section::with(|cs| TRACE_BUF.borrow_ref_mut(cs).read())
}

/// Get number of entries waiting in the global buffer
pub fn available() -> usize {
    critical_section::with(|cs| TRACE_BUF.borrow_ref(cs).available())
}

/// Get number of entries the global buffer has overwritten
pub fn dropped() -> u32 {
    critical_section::with(|cs| TRACE_BUF.borrow_ref(cs).dropped())
}

/// Emit the TargetInfo record describing this build
///
/// Payload: IRQ nesting limit, lock nesting limit, feature bits.
pub fn target_info(info: &KernelInfo) {
    record(
        TraceRecord::TargetInfo,
        &[
            info.irq_nesting_limit,
            info.sched_lock_nesting_limit,
            info.feature_bits(),
        ],
    );
}
