//! Kernel control plane
//!
//! One [`Kernel`] value holds the global lifecycle state, both nesting
//! counters and the current/next/idle task bookkeeping. Every entry point
//! mutates that state inside `critical_section::with`, so interrupts are
//! masked for the duration of each update and no other locking is needed.
//! The `RefCell` borrow is always released before a collaborator or the
//! trace hook is called.

use core::cell::RefCell;
use critical_section::{CriticalSection, Mutex};

use ktiny_core::{IrqNesting, KError, KResult, KernelInfo, Nesting, SchedLockNesting, TaskId};
#[cfg(feature = "tickless")]
use ktiny_core::Tick;
use ktiny_trace::{TraceHook, TraceRecord};

#[cfg(feature = "tickless")]
use crate::port::TickSource;
use crate::port::{Dispatch, SwitchContext};

/// Global kernel state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KnlState {
    #[default]
    Stopped,
    Running,
}

#[cfg(feature = "defmt")]
impl defmt::Format for KnlState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            KnlState::Stopped => defmt::write!(fmt, "Stopped"),
            KnlState::Running => defmt::write!(fmt, "Running"),
        }
    }
}

struct State {
    knl_state: KnlState,
    irq_nesting: IrqNesting,
    sched_lock: SchedLockNesting,
    curr_task: Option<TaskId>,
    next_task: Option<TaskId>,
    idle_task: Option<TaskId>,
    dispatch: Option<&'static dyn Dispatch>,
    #[cfg(feature = "tickless")]
    tick_source: Option<&'static dyn TickSource>,
    trace: TraceHook,
}

impl State {
    const fn new() -> Self {
        Self {
            knl_state: KnlState::Stopped,
            irq_nesting: IrqNesting::new(),
            sched_lock: SchedLockNesting::new(),
            curr_task: None,
            next_task: None,
            idle_task: None,
            dispatch: None,
            #[cfg(feature = "tickless")]
            tick_source: None,
            trace: ktiny_trace::record,
        }
    }

    fn is_running(&self) -> bool {
        self.knl_state == KnlState::Running
    }
}

/// The kernel control plane
pub struct Kernel {
    state: Mutex<RefCell<State>>,
}

impl Kernel {
    /// Create a stopped kernel with no collaborators installed
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State::new())),
        }
    }

    /// Replace the function that receives trace records
    pub fn set_trace_hook(&self, hook: TraceHook) {
        critical_section::with(|cs| {
            self.state.borrow_ref_mut(cs).trace = hook;
        });
    }

    /// Initialize the kernel
    ///
    /// Installs the dispatch collaborator, clears the nesting counters and
    /// task bookkeeping, lets the dispatcher prepare its ready queue and
    /// creates the idle task. Collaborator failures are returned unchanged
    /// and leave the kernel uninitialized.
    pub fn init(&self, dispatch: &'static dyn Dispatch) -> KResult<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.is_running() {
                return Err(KError::KernelRunning);
            }
            state.irq_nesting.reset();
            state.sched_lock.reset();
            state.curr_task = None;
            state.next_task = None;
            state.idle_task = None;
            state.dispatch = Some(dispatch);
            Ok(())
        })?;

        if let Err(err) = dispatch.prepare().and_then(|()| self.idle_init().map(drop)) {
            critical_section::with(|cs| {
                self.state.borrow_ref_mut(cs).dispatch = None;
            });
            #[cfg(feature = "defmt")]
            defmt::warn!("kernel init failed: {}", err);
            return Err(err);
        }

        let info = KernelInfo::current();
        self.emit(
            TraceRecord::TargetInfo,
            &[
                info.irq_nesting_limit,
                info.sched_lock_nesting_limit,
                info.feature_bits(),
            ],
        );
        self.emit(TraceRecord::KnlInit, &[]);
        Ok(())
    }

    /// Create the idle task through the installed dispatcher
    pub fn idle_init(&self) -> KResult<TaskId> {
        let dispatch = critical_section::with(|cs| self.state.borrow_ref(cs).dispatch)
            .ok_or(KError::NotInitialized)?;
        let idle = dispatch.create_idle()?;
        critical_section::with(|cs| {
            self.state.borrow_ref_mut(cs).idle_task = Some(idle);
        });
        Ok(idle)
    }

    /// Start multitasking
    ///
    /// Marks the kernel running and hands the highest-ready task to the
    /// dispatcher. On hardware this does not return.
    pub fn start(&self) -> KResult<()> {
        let (dispatch, first) = critical_section::with(|cs| {
            let dispatch = {
                let state = self.state.borrow_ref(cs);
                if state.is_running() {
                    return Err(KError::KernelRunning);
                }
                state.dispatch.ok_or(KError::NotInitialized)?
            };

            let first = dispatch.highest_ready();
            let mut state = self.state.borrow_ref_mut(cs);
            state.next_task = Some(first);
            state.curr_task = Some(first);
            state.knl_state = KnlState::Running;
            Ok((dispatch, first))
        })?;

        #[cfg(feature = "defmt")]
        defmt::debug!("kernel started, first {}", first);
        self.emit(TraceRecord::KnlStart, &task_bytes(first));

        dispatch.start_first(first);
        Ok(())
    }

    /// Check if the kernel is running
    pub fn is_running(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).is_running())
    }

    /// Get the lifecycle state
    pub fn state(&self) -> KnlState {
        critical_section::with(|cs| self.state.borrow_ref(cs).knl_state)
    }

    /// Enter interrupt context
    ///
    /// First call of every interrupt handler, matched by exactly one
    /// [`irq_leave`](Self::irq_leave). Ignored while the kernel is stopped
    /// and at the nesting ceiling.
    pub fn irq_enter(&self) {
        let depth = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if !state.is_running() {
                return None;
            }
            state.irq_nesting.enter()
        });

        if let Some(depth) = depth {
            self.emit(TraceRecord::IsrEntry, &[depth]);
        }
    }

    /// Leave interrupt context
    ///
    /// When the outermost handler leaves and the scheduler is not locked,
    /// a switch that became due during the interrupt is applied here.
    pub fn irq_leave(&self) {
        critical_section::with(|cs| {
            let depth = {
                let mut state = self.state.borrow_ref_mut(cs);
                if !state.is_running() {
                    return;
                }
                match state.irq_nesting.leave() {
                    Some(depth) => depth,
                    None => return,
                }
            };

            self.emit(TraceRecord::IsrExit, &[depth]);
            if depth == 0 {
                self.reschedule(cs, SwitchContext::Irq);
            }
        });
    }

    /// Check if executing in interrupt context
    pub fn is_in_irq(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).irq_nesting.is_nested())
    }

    /// Current interrupt nesting depth
    pub fn irq_nesting(&self) -> Nesting {
        critical_section::with(|cs| self.state.borrow_ref(cs).irq_nesting.depth())
    }

    /// Lock the scheduler
    ///
    /// No task switch happens until every lock is matched by an unlock.
    pub fn sched_lock(&self) -> KResult<()> {
        let depth = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.irq_nesting.is_nested() {
                return Err(KError::InIrq);
            }
            if !state.is_running() {
                return Err(KError::KernelNotRunning);
            }
            state.sched_lock.enter().ok_or(KError::LockNestingOverflow)
        });

        let depth = match depth {
            Ok(depth) => depth,
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("sched_lock rejected: {}", err);
                return Err(err);
            }
        };
        self.emit(TraceRecord::SchedLock, &[depth - 1, depth]);
        Ok(())
    }

    /// Unlock the scheduler
    ///
    /// The final unlock applies any switch deferred while locked, once.
    pub fn sched_unlock(&self) -> KResult<()> {
        critical_section::with(|cs| {
            let depth = {
                let mut state = self.state.borrow_ref_mut(cs);
                if state.irq_nesting.is_nested() {
                    return Err(KError::InIrq);
                }
                if !state.is_running() {
                    return Err(KError::KernelNotRunning);
                }
                state.sched_lock.leave().ok_or(KError::SchedNotLocked)?
            };

            self.emit(TraceRecord::SchedUnlock, &[depth + 1, depth]);
            if depth == 0 {
                self.reschedule(cs, SwitchContext::Task);
            }
            Ok(())
        })
    }

    /// Check if the scheduler is locked
    pub fn is_sched_locked(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).sched_lock.is_nested())
    }

    /// Current scheduler lock nesting depth
    pub fn sched_lock_nesting(&self) -> Nesting {
        critical_section::with(|cs| self.state.borrow_ref(cs).sched_lock.depth())
    }

    /// Task-level scheduling point
    ///
    /// Called by primitives after a task blocks or becomes ready, and by the
    /// tick handler. Does nothing while stopped, in interrupt context or
    /// with the scheduler locked; those cases are picked up later by
    /// `irq_leave` or the final `sched_unlock`.
    pub fn sched(&self) {
        critical_section::with(|cs| self.reschedule(cs, SwitchContext::Task));
    }

    /// Guard for operations that may block the caller
    pub fn pend_allowed(&self) -> KResult<()> {
        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            if state.irq_nesting.is_nested() {
                Err(KError::InIrq)
            } else if state.sched_lock.is_nested() {
                Err(KError::PendSchedLocked)
            } else {
                Ok(())
            }
        })
    }

    /// Check if `task` is the idle task
    pub fn is_idle(&self, task: TaskId) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).idle_task == Some(task))
    }

    /// Check if `task` is the task currently executing
    pub fn is_self(&self, task: TaskId) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).curr_task == Some(task))
    }

    /// Task currently executing
    pub fn current_task(&self) -> Option<TaskId> {
        critical_section::with(|cs| self.state.borrow_ref(cs).curr_task)
    }

    /// Task chosen by the most recent scheduling decision
    pub fn next_task(&self) -> Option<TaskId> {
        critical_section::with(|cs| self.state.borrow_ref(cs).next_task)
    }

    /// Idle task handle, once `idle_init` succeeded
    pub fn idle_task(&self) -> Option<TaskId> {
        critical_section::with(|cs| self.state.borrow_ref(cs).idle_task)
    }

    /// Install the source of pending deadlines
    #[cfg(feature = "tickless")]
    pub fn set_tick_source(&self, source: &'static dyn TickSource) {
        critical_section::with(|cs| {
            self.state.borrow_ref_mut(cs).tick_source = Some(source);
        });
    }

    /// Ticks until the nearest pending deadline
    ///
    /// `None` means nothing is pending and the CPU may sleep until an
    /// external interrupt.
    #[cfg(feature = "tickless")]
    pub fn next_expires_get(&self) -> Option<Tick> {
        let source = critical_section::with(|cs| self.state.borrow_ref(cs).tick_source)?;
        let next = Tick::earliest(source.tick_next_expires(), source.timer_next_expires());

        let raw = next.map_or(u64::MAX, Tick::raw);
        self.emit(TraceRecord::Tickless, &raw.to_le_bytes());
        next
    }

    /// Apply a due task switch, if any
    fn reschedule(&self, cs: CriticalSection<'_>, ctx: SwitchContext) {
        let dispatch = {
            let state = self.state.borrow_ref(cs);
            if !state.is_running()
                || state.irq_nesting.is_nested()
                || state.sched_lock.is_nested()
            {
                return;
            }
            match state.dispatch {
                Some(dispatch) => dispatch,
                None => return,
            }
        };

        let next = dispatch.highest_ready();
        let (prev, to_idle) = {
            let mut state = self.state.borrow_ref_mut(cs);
            state.next_task = Some(next);
            let prev = match state.curr_task {
                Some(prev) if prev != next => prev,
                _ => return,
            };
            state.curr_task = Some(next);
            (prev, state.idle_task == Some(next))
        };

        if to_idle {
            self.emit(TraceRecord::SchedIdle, &task_bytes(prev));
        } else {
            let mut payload = [0u8; 8];
            payload[..4].copy_from_slice(&task_bytes(next));
            payload[4..].copy_from_slice(&task_bytes(prev));
            self.emit(TraceRecord::SchedNext, &payload);
        }

        dispatch.switch_to(prev, next, ctx);
    }

    fn emit(&self, record: TraceRecord, payload: &[u8]) {
        let hook = critical_section::with(|cs| self.state.borrow_ref(cs).trace);
        hook(record, payload);
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

fn task_bytes(task: TaskId) -> [u8; 4] {
    (task.raw() as u32).to_le_bytes()
}
