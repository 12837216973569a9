//! Single-producer, single-consumer handoff of the latest distance.
//!
//! The measurement side holds the [`Producer`], the serial side holds the
//! [`Consumer`]. Every access runs inside `interrupt::free`, so a reader never
//! sees the distance of one cycle with the sequence number of another.

use core::cell::Cell;

use cortex_m::interrupt::{self, Mutex};

use crate::Distance;

/// A published distance and the number of cycles published so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct Reading {
    pub distance: Distance,
    pub seq: u32,
}

impl Reading {
    /// Nothing measured yet.
    pub const NONE: Reading = Reading {
        distance: 0,
        seq: 0,
    };
}

pub struct MeasurementChannel {
    latest: Mutex<Cell<Reading>>,
}

impl Default for MeasurementChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementChannel {
    pub const fn new() -> Self {
        MeasurementChannel {
            latest: Mutex::new(Cell::new(Reading::NONE)),
        }
    }

    /// Hand out the two ends. Borrowing mutably keeps the channel to one of each.
    pub fn split(&mut self) -> (Producer<'_>, Consumer<'_>) {
        let channel: &MeasurementChannel = self;
        (
            Producer { channel },
            Consumer { channel },
        )
    }
}

pub struct Producer<'a> {
    channel: &'a MeasurementChannel,
}

impl<'a> Producer<'a> {
    /// Replace the latest reading and bump the sequence number.
    pub fn publish(&mut self, distance: Distance) -> Reading {
        interrupt::free(|cs| {
            let cell = self.channel.latest.borrow(cs);
            let reading = Reading {
                distance,
                seq: cell.get().seq.wrapping_add(1),
            };
            cell.set(reading);
            reading
        })
    }
}

pub struct Consumer<'a> {
    channel: &'a MeasurementChannel,
}

impl<'a> Consumer<'a> {
    pub fn latest(&self) -> Reading {
        interrupt::free(|cs| self.channel.latest.borrow(cs).get())
    }
}
