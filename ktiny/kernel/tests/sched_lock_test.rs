//! Scheduler lock and lifecycle tests for ktiny-kernel

use ktiny_kernel::{
    Dispatch, KError, KResult, Kernel, KnlState, SwitchContext, TaskId, TraceRecord,
    NESTING_LIMIT_SCHED_LOCK,
};

struct Idle;

impl Dispatch for Idle {
    fn create_idle(&self) -> KResult<TaskId> {
        Ok(TaskId::new(0))
    }

    fn highest_ready(&self) -> TaskId {
        TaskId::new(0)
    }

    fn start_first(&self, _first: TaskId) {}

    fn switch_to(&self, _from: TaskId, _to: TaskId, _ctx: SwitchContext) {}
}

static PORT: Idle = Idle;

fn quiet(_: TraceRecord, _: &[u8]) {}

fn stopped_kernel() -> Kernel {
    let kernel = Kernel::new();
    kernel.set_trace_hook(quiet);
    kernel.init(&PORT).expect("init");
    kernel
}

fn running_kernel() -> Kernel {
    let kernel = stopped_kernel();
    kernel.start().expect("start");
    kernel
}

#[test]
fn test_lifecycle_transitions_once() {
    let kernel = stopped_kernel();
    assert!(!kernel.is_running());
    assert_eq!(kernel.state(), KnlState::Stopped);

    assert_eq!(kernel.start(), Ok(()));
    assert!(kernel.is_running());

    assert_eq!(kernel.start(), Err(KError::KernelRunning));
    assert_eq!(kernel.state(), KnlState::Running);
}

#[test]
fn test_lock_before_start_reports_not_running() {
    let kernel = stopped_kernel();
    assert_eq!(kernel.sched_lock(), Err(KError::KernelNotRunning));
    assert_eq!(kernel.sched_unlock(), Err(KError::KernelNotRunning));
    assert_eq!(kernel.sched_lock_nesting(), 0);
}

#[test]
fn test_lock_ceiling_is_fail_closed() {
    let kernel = running_kernel();
    for _ in 0..NESTING_LIMIT_SCHED_LOCK {
        assert_eq!(kernel.sched_lock(), Ok(()));
    }
    assert_eq!(kernel.sched_lock_nesting(), 250);

    assert_eq!(kernel.sched_lock(), Err(KError::LockNestingOverflow));
    assert_eq!(kernel.sched_lock_nesting(), 250);

    for _ in 0..NESTING_LIMIT_SCHED_LOCK {
        assert_eq!(kernel.sched_unlock(), Ok(()));
    }
    assert!(!kernel.is_sched_locked());
}

#[test]
fn test_unlock_without_lock() {
    let kernel = running_kernel();
    assert_eq!(kernel.sched_unlock(), Err(KError::SchedNotLocked));

    kernel.sched_lock().unwrap();
    kernel.sched_unlock().unwrap();
    assert_eq!(kernel.sched_unlock(), Err(KError::SchedNotLocked));
    assert_eq!(kernel.sched_lock_nesting(), 0);
}

#[test]
fn test_paired_irq_calls_unwind() {
    let kernel = running_kernel();
    for depth in 1..=5u8 {
        for _ in 0..depth {
            kernel.irq_enter();
        }
        assert_eq!(kernel.irq_nesting(), depth);
        for _ in 0..depth {
            kernel.irq_leave();
        }
        assert!(!kernel.is_in_irq());
    }
}
