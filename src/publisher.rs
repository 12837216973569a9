//! Serves the latest distance one byte per bus transaction, high byte first.
//!
//! A slave transceiver has to hold its byte before the master starts clocking,
//! so the byte handed out at the end of one transaction is the one the *next*
//! transaction carries. The publisher therefore tracks which half sits in the
//! transceiver and only switches to a fresh reading at a pair boundary. When a
//! reading lands while a stale high byte is waiting, [`DistancePublisher::service`]
//! takes the buffer back and swaps in the new high byte.

use crate::channel::{Consumer, Reading};

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
enum Half {
    High,
    Low,
}

/// Why the transceiver interrupt ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Request {
    /// A transaction consumed the loaded byte; the buffer is ours.
    Consumed,
    /// The buffer was handed back on our request, nothing was consumed.
    Granted,
    /// A new reading was published.
    Notified,
}

/// One-byte transmit buffer shared with the bus peripheral.
pub trait ByteSlot {
    /// Put `byte` in the buffer and hand it to the peripheral.
    fn load(&mut self, byte: u8);

    /// Hand the buffer back unchanged.
    fn release(&mut self);

    /// Ask for the buffer back. Answered later with [`Request::Granted`], or
    /// with [`Request::Consumed`] if a transaction ends first.
    fn acquire(&mut self);
}

pub struct DistancePublisher<'a> {
    consumer: Consumer<'a>,
    latched: Reading,
    next: Half,
}

impl<'a> DistancePublisher<'a> {
    pub fn new(consumer: Consumer<'a>) -> Self {
        DistancePublisher {
            consumer,
            latched: Reading::NONE,
            next: Half::High,
        }
    }

    /// Byte for the next transaction.
    ///
    /// Both bytes of a reading are latched together when its high byte is
    /// handed out. A fresh reading is picked up only there, so a pair never
    /// mixes cycles. With nothing new the latched pair is served again.
    pub fn on_byte_requested(&mut self) -> u8 {
        if self.next == Half::High {
            let latest = self.consumer.latest();
            if latest.seq != self.latched.seq {
                self.latched = latest;
            }
        }

        let [high, low] = self.latched.distance.to_be_bytes();
        match self.next {
            Half::High => {
                self.next = Half::Low;
                high
            }
            Half::Low => {
                self.next = Half::High;
                low
            }
        }
    }

    /// True when the transceiver holds a high byte older than the latest reading.
    pub fn is_stale(&self) -> bool {
        self.next == Half::Low && self.consumer.latest().seq != self.latched.seq
    }

    /// Swap a waiting, stale high byte for the latest reading's high byte.
    pub fn refresh(&mut self) -> Option<u8> {
        if !self.is_stale() {
            return None;
        }
        self.latched = self.consumer.latest();
        Some(self.latched.distance.to_be_bytes()[0])
    }

    /// Drive `slot` for one transceiver interrupt.
    pub fn service<S: ByteSlot>(&mut self, slot: &mut S, request: Request) {
        match request {
            Request::Consumed => slot.load(self.on_byte_requested()),
            Request::Granted => match self.refresh() {
                Some(high) => slot.load(high),
                None => slot.release(),
            },
            Request::Notified => {
                if self.is_stale() {
                    slot.acquire();
                }
            }
        }
    }

    /// Reading the current pair comes from. Only read by the testsuite.
    pub fn latched(&self) -> Reading {
        self.latched
    }
}
