//! Global trace buffer tests for ktiny-trace
//! Everything touching the shared buffer lives in one test so that the
//! test harness cannot interleave it.

use ktiny_core::KernelInfo;
use ktiny_trace::{available, dropped, global_filter, init, read, record, target_info, TraceRecord};

#[test]
fn test_global_buffer_lifecycle() {
    init();
    assert_eq!(available(), 0);

    record(TraceRecord::IsrEntry, &[1]);
    assert_eq!(available(), 0, "maskable records are off after init");

    global_filter(TraceRecord::IsrEntry, true);
    record(TraceRecord::IsrEntry, &[1]);
    target_info(&KernelInfo::current());
    assert_eq!(available(), 2);

    let isr = read().expect("isr entry");
    assert_eq!(isr.record, TraceRecord::IsrEntry);
    assert_eq!(isr.payload(), &[1]);

    let info = read().expect("target info");
    assert_eq!(info.record, TraceRecord::TargetInfo);
    assert_eq!(&info.payload()[..2], &[250, 250]);

    assert!(read().is_none());
    assert_eq!(dropped(), 0);
}
