//! Idle task body

/// Entry point of the idle task
///
/// Runs `on_idle` (deferred cleanup, power management) and then waits
/// for the next interrupt, forever.
pub fn idle_entry(on_idle: fn()) -> ! {
    loop {
        on_idle();
        wait_for_interrupt();
    }
}

/// Park the CPU until something happens
#[inline]
pub fn wait_for_interrupt() {
    #[cfg(target_arch = "arm")]
    {
        cortex_m::asm::wfi();
    }

    #[cfg(not(target_arch = "arm"))]
    {
        core::hint::spin_loop();
    }
}
