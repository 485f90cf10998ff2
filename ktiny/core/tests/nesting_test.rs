//! Nesting counter tests for ktiny-core

use ktiny_core::{IrqNesting, SchedLockNesting, NESTING_LIMIT_SCHED_LOCK};

#[test]
fn test_paired_calls_unwind_to_zero() {
    let mut irq = IrqNesting::new();
    for _ in 0..17 {
        irq.enter();
    }
    for _ in 0..17 {
        irq.leave();
    }
    assert_eq!(irq.depth(), 0);
    assert!(!irq.is_nested());
}

#[test]
fn test_lock_counter_ceiling() {
    let mut lock = SchedLockNesting::new();
    for expected in 1..=NESTING_LIMIT_SCHED_LOCK {
        assert_eq!(lock.enter(), Some(expected));
    }
    assert_eq!(lock.enter(), None);
    assert_eq!(lock.depth(), 250);
}

#[test]
fn test_counters_are_independent() {
    let mut irq = IrqNesting::new();
    let mut lock = SchedLockNesting::new();
    irq.enter();
    assert!(irq.is_nested());
    assert!(!lock.is_nested());
    lock.enter();
    irq.reset();
    assert!(lock.is_nested());
}
