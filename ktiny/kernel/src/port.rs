//! Collaborators the kernel core hands work to
//!
//! Task selection, context switching and timer bookkeeping live outside
//! this crate. A port implements these traits and passes a `'static`
//! instance to [`Kernel::init`](crate::Kernel::init).

use ktiny_core::{KResult, TaskId};
#[cfg(feature = "tickless")]
use ktiny_core::Tick;

/// Where a requested task switch is performed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchContext {
    /// Task level, e.g. after the final `sched_unlock`
    Task,
    /// Exit of the outermost interrupt handler
    Irq,
}

#[cfg(feature = "defmt")]
impl defmt::Format for SwitchContext {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SwitchContext::Task => defmt::write!(fmt, "Task"),
            SwitchContext::Irq => defmt::write!(fmt, "Irq"),
        }
    }
}

/// Scheduler dispatch: picks tasks and switches between them
///
/// Methods are called with interrupts masked, except
/// [`start_first`](Self::start_first). They may use the kernel's query
/// functions but must not call entry points that change kernel state.
pub trait Dispatch: Sync {
    /// Prepare the ready queue before the idle task is created
    fn prepare(&self) -> KResult<()> {
        Ok(())
    }

    /// Construct the idle task and return its handle
    fn create_idle(&self) -> KResult<TaskId>;

    /// Highest-priority task that is ready to run
    fn highest_ready(&self) -> TaskId;

    /// Hand the CPU to the first task
    ///
    /// Does not return on hardware. Host and simulation ports may return,
    /// in which case `start` reports success.
    fn start_first(&self, first: TaskId);

    /// Switch from the current task to `to`
    fn switch_to(&self, from: TaskId, to: TaskId, ctx: SwitchContext);
}

/// Source of pending deadlines for tickless idle
#[cfg(feature = "tickless")]
pub trait TickSource: Sync {
    /// Ticks until the nearest delayed task wakes up
    fn tick_next_expires(&self) -> Option<Tick>;

    /// Ticks until the nearest software timer fires
    fn timer_next_expires(&self) -> Option<Tick> {
        None
    }
}
