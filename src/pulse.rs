//! Trigger line driver.

use cortex_m::interrupt;
use embedded_hal::digital::v2::OutputPin;

use crate::config::{cycles, TRIGGER_PULSE};

pub struct PulseEmitter<P> {
    pin: P,
}

impl<P: OutputPin> PulseEmitter<P> {
    pub fn new(mut pin: P) -> Self {
        pin.set_low().ok();
        PulseEmitter { pin }
    }

    /// Drive the trigger high for `TRIGGER_PULSE`. Interrupts are masked so
    /// nothing stretches the pulse.
    pub fn emit(&mut self) {
        interrupt::free(|_| {
            self.pin.set_high().ok();
            cortex_m::asm::delay(cycles(TRIGGER_PULSE));
            self.pin.set_low().ok();
        });
    }
}
