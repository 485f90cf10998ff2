//! Global kernel instance tests for ktiny-kernel
//! The global kernel can only start once per process, so the whole
//! scenario is a single test.

use std::sync::Mutex;

use ktiny_kernel as knl;
use knl::{Dispatch, KError, KResult, SwitchContext, TaskId, TraceRecord};

const IDLE: TaskId = TaskId::new(0);
const APP: TaskId = TaskId::new(7);

static READY: Mutex<TaskId> = Mutex::new(APP);
static SWITCHES: Mutex<Vec<(TaskId, TaskId, SwitchContext)>> = Mutex::new(Vec::new());
static RECORDS: Mutex<Vec<TraceRecord>> = Mutex::new(Vec::new());

struct Board;

impl Dispatch for Board {
    fn create_idle(&self) -> KResult<TaskId> {
        Ok(IDLE)
    }

    fn highest_ready(&self) -> TaskId {
        *READY.lock().unwrap()
    }

    fn start_first(&self, _first: TaskId) {}

    fn switch_to(&self, from: TaskId, to: TaskId, ctx: SwitchContext) {
        SWITCHES.lock().unwrap().push((from, to, ctx));
    }
}

static BOARD: Board = Board;

fn capture(record: TraceRecord, _: &[u8]) {
    RECORDS.lock().unwrap().push(record);
}

#[test]
fn test_global_kernel_scenario() {
    knl::set_trace_hook(capture);

    assert_eq!(knl::sched_lock(), Err(KError::KernelNotRunning));
    assert_eq!(knl::start(), Err(KError::NotInitialized));

    knl::init(&BOARD).expect("init");
    assert!(knl::is_idle(IDLE));
    assert!(!knl::is_running());

    knl::start().expect("start");
    assert!(knl::is_running());
    assert!(knl::is_self(APP));
    assert_eq!(knl::start(), Err(KError::KernelRunning));

    // A task sleeps from inside an interrupt: the switch to idle waits
    // for the outermost handler to return.
    knl::irq_enter();
    *READY.lock().unwrap() = IDLE;
    knl::sched();
    assert!(SWITCHES.lock().unwrap().is_empty());
    knl::irq_leave();
    assert_eq!(
        SWITCHES.lock().unwrap().as_slice(),
        &[(APP, IDLE, SwitchContext::Irq)]
    );

    knl::sched_lock().unwrap();
    assert!(knl::is_sched_locked());
    assert_eq!(knl::pend_allowed(), Err(KError::PendSchedLocked));
    knl::sched_unlock().unwrap();
    assert!(!knl::is_sched_locked());
    assert!(!knl::is_in_irq());

    let records = RECORDS.lock().unwrap();
    assert_eq!(
        records.as_slice(),
        &[
            TraceRecord::TargetInfo,
            TraceRecord::KnlInit,
            TraceRecord::KnlStart,
            TraceRecord::IsrEntry,
            TraceRecord::IsrExit,
            TraceRecord::SchedIdle,
            TraceRecord::SchedLock,
            TraceRecord::SchedUnlock,
        ]
    );
}
