//! SPI slave transceiver, one byte per transaction.
//!
//! The SPIS peripheral clocks out of a one-byte EasyDMA buffer. The `END`
//! event is shorted to the `ACQUIRE` task, so when a transaction finishes the
//! CPU gets the buffer semaphore back and `ACQUIRED` fires. That interrupt is
//! the byte request: [`SerialSlave::take_request`] tells a consumed byte apart
//! from a grant the CPU asked for, and the [`ByteSlot`] impl fills the buffer
//! and hands the semaphore back.
//!
//! # Masked interrupts
//!
//! While the CPU holds the semaphore the peripheral answers with `DEF`
//! (`OVERREAD_CHAR`) and raises no `END`, so the publisher does not count that
//! byte and the master's high/low framing slips by one. The semaphore is only
//! held between a transaction's end and the `ACQUIRED` handler; the handler is
//! delayed when all interrupts are masked, which happens for the 10 µs trigger
//! pulse. A master that keeps more than 10 µs between transactions never sees
//! `DEF`.

use core::ops::Deref;
use core::sync::atomic::{compiler_fence, Ordering};

use nrf52840_hal::{
    gpio::{Floating, Input, Pin},
    pac::{spis0, SPIS0, SPIS1, SPIS2},
};

use crate::{
    config::OVERREAD_CHAR,
    publisher::{ByteSlot, Request},
};

const DISCONNECTED: u32 = 0xFFFF_FFFF;

pub struct Pins {
    pub sck: Pin<Input<Floating>>,
    pub cs: Pin<Input<Floating>>,
    pub cipo: Pin<Input<Floating>>,
}

pub struct SerialSlave<S: Instance> {
    spis: S,
    tx: &'static mut [u8; 1],
}

impl<S: Instance> SerialSlave<S> {
    /// Configure for SPI mode 0, MSB first, transmit only.
    ///
    /// The CPU owns the semaphore after enable; the first [`ByteSlot::load`]
    /// hands it to the peripheral.
    pub fn new(spis: S, pins: Pins, tx: &'static mut [u8; 1]) -> Self {
        spis.psel.sck.write(|w| unsafe { w.bits(pins.sck.psel_bits()) });
        spis.psel.csn.write(|w| unsafe { w.bits(pins.cs.psel_bits()) });
        spis.psel.miso.write(|w| unsafe { w.bits(pins.cipo.psel_bits()) });
        spis.psel.mosi.write(|w| unsafe { w.bits(DISCONNECTED) });

        spis.config
            .write(|w| w.order().msb_first().cpha().leading().cpol().active_high());
        spis.def.write(|w| unsafe { w.def().bits(OVERREAD_CHAR) });
        spis.orc.write(|w| unsafe { w.orc().bits(OVERREAD_CHAR) });
        spis.rxd.maxcnt.write(|w| unsafe { w.maxcnt().bits(0) });

        spis.shorts.write(|w| w.end_acquire().enabled());
        spis.intenset.write(|w| w.acquired().set());
        spis.enable.write(|w| w.enable().enabled());

        SerialSlave { spis, tx }
    }

    /// Acknowledge a pending `ACQUIRED` event, if any.
    pub fn take_request(&mut self) -> Option<Request> {
        if self.spis.events_acquired.read().bits() == 0 {
            return None;
        }
        self.spis.events_acquired.write(|w| w);
        if self.spis.events_end.read().bits() == 0 {
            return Some(Request::Granted);
        }
        self.spis.events_end.write(|w| w);
        Some(Request::Consumed)
    }
}

impl<S: Instance> ByteSlot for SerialSlave<S> {
    fn load(&mut self, byte: u8) {
        self.tx[0] = byte;
        compiler_fence(Ordering::SeqCst);
        self.spis
            .txd
            .ptr
            .write(|w| unsafe { w.ptr().bits(self.tx.as_ptr() as u32) });
        self.spis.txd.maxcnt.write(|w| unsafe { w.maxcnt().bits(1) });
        self.release();
    }

    fn release(&mut self) {
        self.spis.tasks_release.write(|w| unsafe { w.bits(1) });
    }

    fn acquire(&mut self) {
        self.spis.tasks_acquire.write(|w| unsafe { w.bits(1) });
    }
}

pub trait Instance: Deref<Target = spis0::RegisterBlock> {}
impl Instance for SPIS0 {}
impl Instance for SPIS1 {}
impl Instance for SPIS2 {}
