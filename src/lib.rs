#![no_std]

use core::sync::atomic::{AtomicUsize, Ordering};

use defmt_rtt as _; // global logger
use nrf52840_hal as _; // memory layout
use panic_probe as _;

pub mod capture;
pub mod channel;
pub mod config;
pub mod echo_timer;
pub mod measurement;
pub mod publisher;
pub mod pulse;
pub mod rangefinder;
pub mod spis;

/// Raw count of the capture timer. Has no physical unit.
pub type TickCount = u16;

/// Echo round trip in capture timer ticks, `0` when the cycle timed out.
pub type Distance = u16;

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

static COUNT: AtomicUsize = AtomicUsize::new(0);
defmt::timestamp!("{=usize}", {
    // NOTE(no-CAS) `timestamps` runs with interrupts disabled
    let n = COUNT.load(Ordering::Relaxed);
    COUNT.store(n + 1, Ordering::Relaxed);
    n
});
