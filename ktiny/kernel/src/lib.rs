#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # ktiny Kernel
//!
//! Control plane of the ktiny preemptive kernel. It owns the invariants
//! every other subsystem relies on:
//!
//! - a single `Stopped -> Running` lifecycle
//! - interrupt nesting bookkeeping, with task switches deferred to the exit
//!   of the outermost handler
//! - a nestable scheduler lock whose final unlock applies deferred switches
//! - idle/self task identity and, with `tickless`, the next wake-up query
//!
//! Task selection and context switching are delegated to a [`Dispatch`]
//! implementation supplied by the port.
//!
//! ```rust
//! use ktiny_kernel::{Dispatch, Kernel, KResult, SwitchContext, TaskId};
//!
//! struct OneTask;
//!
//! impl Dispatch for OneTask {
//!     fn create_idle(&self) -> KResult<TaskId> { Ok(TaskId::new(0)) }
//!     fn highest_ready(&self) -> TaskId { TaskId::new(1) }
//!     fn start_first(&self, _first: TaskId) {}
//!     fn switch_to(&self, _from: TaskId, _to: TaskId, _ctx: SwitchContext) {}
//! }
//!
//! static PORT: OneTask = OneTask;
//! let kernel = Kernel::new();
//! kernel.init(&PORT).unwrap();
//! kernel.start().unwrap();
//! assert!(kernel.is_running());
//! kernel.sched_lock().unwrap();
//! kernel.sched_unlock().unwrap();
//! ```

mod idle;
mod kernel;
mod port;

pub use idle::{idle_entry, wait_for_interrupt};
pub use kernel::{Kernel, KnlState};
#[cfg(feature = "tickless")]
pub use port::TickSource;
pub use port::{Dispatch, SwitchContext};

pub use ktiny_core::*;
pub use ktiny_trace::{TraceHook, TraceRecord};

/// Global kernel instance
static KERNEL: Kernel = Kernel::new();

/// Get the global kernel
pub fn kernel() -> &'static Kernel {
    &KERNEL
}

/// Initialize the kernel
pub fn init(dispatch: &'static dyn Dispatch) -> KResult<()> {
    KERNEL.init(dispatch)
}

/// Start multitasking (does not return on hardware)
pub fn start() -> KResult<()> {
    KERNEL.start()
}

/// Check if kernel is running
pub fn is_running() -> bool {
    KERNEL.is_running()
}

/// Enter interrupt context
pub fn irq_enter() {
    KERNEL.irq_enter();
}

/// Leave interrupt context
pub fn irq_leave() {
    KERNEL.irq_leave();
}

/// Check if in interrupt context
pub fn is_in_irq() -> bool {
    KERNEL.is_in_irq()
}

/// Lock scheduler
pub fn sched_lock() -> KResult<()> {
    KERNEL.sched_lock()
}

/// Unlock scheduler
pub fn sched_unlock() -> KResult<()> {
    KERNEL.sched_unlock()
}

/// Check if scheduler is locked
pub fn is_sched_locked() -> bool {
    KERNEL.is_sched_locked()
}

/// Task-level scheduling point
pub fn sched() {
    KERNEL.sched();
}

/// Guard for operations that may block the caller
pub fn pend_allowed() -> KResult<()> {
    KERNEL.pend_allowed()
}

/// Create the idle task
pub fn idle_init() -> KResult<TaskId> {
    KERNEL.idle_init()
}

/// Check if `task` is the idle task
pub fn is_idle(task: TaskId) -> bool {
    KERNEL.is_idle(task)
}

/// Check if `task` is the calling task
pub fn is_self(task: TaskId) -> bool {
    KERNEL.is_self(task)
}

/// Install the source of pending deadlines
#[cfg(feature = "tickless")]
pub fn set_tick_source(source: &'static dyn TickSource) {
    KERNEL.set_tick_source(source);
}

/// Ticks until the nearest pending deadline
#[cfg(feature = "tickless")]
pub fn next_expires_get() -> Option<Tick> {
    KERNEL.next_expires_get()
}

/// Replace the trace hook of the global kernel
pub fn set_trace_hook(hook: TraceHook) {
    KERNEL.set_trace_hook(hook);
}
