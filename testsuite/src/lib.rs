//! Mock peripherals for the on-target tests.
//!
//! The mocks only hold a reference to a log made of `Cell`s, so a test can keep
//! inspecting and steering a peripheral after handing it to a `Rangefinder`.

#![no_std]

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::v2::OutputPin;
use sonar_bridge::{
    capture::{Edge, EdgeCapture},
    config::OVERREAD_CHAR,
    publisher::{ByteSlot, DistancePublisher, Request},
    TickCount,
};

pub struct PinLog {
    high: Cell<bool>,
    pulses: Cell<u32>,
}

impl PinLog {
    pub const fn new() -> Self {
        PinLog {
            high: Cell::new(false),
            pulses: Cell::new(0),
        }
    }

    pub fn is_high(&self) -> bool {
        self.high.get()
    }

    /// Completed high → low pulses.
    pub fn pulses(&self) -> u32 {
        self.pulses.get()
    }
}

pub struct MockPin<'a>(pub &'a PinLog);

impl OutputPin for MockPin<'_> {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.0.high.replace(false) {
            self.0.pulses.set(self.0.pulses.get() + 1);
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.high.set(true);
        Ok(())
    }
}

pub struct CaptureLog {
    timeout: Cell<Option<TickCount>>,
    edge: Cell<Edge>,
    latched: Cell<TickCount>,
    running: Cell<bool>,
    arms: Cell<u32>,
    disarms: Cell<u32>,
    timeouts_acked: Cell<u32>,
}

impl CaptureLog {
    pub const fn new() -> Self {
        CaptureLog {
            timeout: Cell::new(None),
            edge: Cell::new(Edge::Rising),
            latched: Cell::new(0),
            running: Cell::new(false),
            arms: Cell::new(0),
            disarms: Cell::new(0),
            timeouts_acked: Cell::new(0),
        }
    }

    /// Simulate the hardware latching the counter at an edge.
    pub fn latch(&self, ticks: TickCount) {
        self.latched.set(ticks);
    }

    pub fn timeout(&self) -> Option<TickCount> {
        self.timeout.get()
    }

    pub fn edge(&self) -> Edge {
        self.edge.get()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn arms(&self) -> u32 {
        self.arms.get()
    }

    pub fn disarms(&self) -> u32 {
        self.disarms.get()
    }

    pub fn timeouts_acked(&self) -> u32 {
        self.timeouts_acked.get()
    }
}

pub struct MockCapture<'a>(pub &'a CaptureLog);

impl EdgeCapture for MockCapture<'_> {
    fn arm(&mut self, timeout: TickCount) {
        self.0.timeout.set(Some(timeout));
        self.0.edge.set(Edge::Rising);
        self.0.running.set(true);
        self.0.arms.set(self.0.arms.get() + 1);
    }

    fn listen_for(&mut self, edge: Edge) {
        self.0.edge.set(edge);
    }

    fn captured(&mut self) -> TickCount {
        self.0.latched.get()
    }

    fn acknowledge_timeout(&mut self) {
        self.0.timeouts_acked.set(self.0.timeouts_acked.get() + 1);
    }

    fn disarm(&mut self) {
        self.0.running.set(false);
        self.0.disarms.set(self.0.disarms.get() + 1);
    }
}

/// One-byte transmit buffer plus the semaphore, as the SPIS sees them.
struct MockSlot {
    byte: u8,
    cpu_owned: bool,
    acquire_pending: bool,
}

impl ByteSlot for MockSlot {
    fn load(&mut self, byte: u8) {
        self.byte = byte;
        self.cpu_owned = false;
    }

    fn release(&mut self) {
        self.cpu_owned = false;
    }

    fn acquire(&mut self) {
        self.acquire_pending = true;
    }
}

/// Slave transceiver with a preloaded byte, driven by a simulated master.
///
/// A transaction clocks out whatever was loaded before it started; the
/// publisher only gets to prepare the byte for the transaction after.
pub struct MockBus<'a> {
    publisher: DistancePublisher<'a>,
    slot: MockSlot,
}

impl<'a> MockBus<'a> {
    /// Same start-up as the firmware: the CPU owns the buffer and loads it once.
    pub fn new(mut publisher: DistancePublisher<'a>) -> Self {
        let mut slot = MockSlot {
            byte: 0,
            cpu_owned: true,
            acquire_pending: false,
        };
        publisher.service(&mut slot, Request::Consumed);
        MockBus { publisher, slot }
    }

    /// One master transaction, followed by the END → ACQUIRED interrupt.
    pub fn transfer(&mut self) -> u8 {
        if self.slot.cpu_owned {
            return OVERREAD_CHAR;
        }
        let byte = self.slot.byte;
        // END → ACQUIRE short also answers a pending acquire
        self.slot.cpu_owned = true;
        self.slot.acquire_pending = false;
        self.publisher.service(&mut self.slot, Request::Consumed);
        byte
    }

    /// Master reads one high/low pair.
    pub fn pair(&mut self) -> [u8; 2] {
        [self.transfer(), self.transfer()]
    }

    /// The measurement side pended the interrupt after publishing.
    pub fn pend(&mut self) {
        self.publisher.service(&mut self.slot, Request::Notified);
    }

    /// The peripheral answers an outstanding acquire while the bus is idle.
    pub fn grant(&mut self) {
        if self.slot.acquire_pending {
            self.slot.acquire_pending = false;
            self.slot.cpu_owned = true;
            self.publisher.service(&mut self.slot, Request::Granted);
        }
    }

    /// Pend followed by an immediate grant, the common case.
    pub fn notify(&mut self) {
        self.pend();
        self.grant();
    }

    pub fn publisher(&self) -> &DistancePublisher<'a> {
        &self.publisher
    }
}
