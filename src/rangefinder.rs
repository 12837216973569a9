//! One measurement cycle: trigger, two captures or a timeout, publish.
//!
//! [`Rangefinder`] owns everything the main loop and the capture and timeout
//! handlers touch. The main loop calls [`Rangefinder::begin_cycle`], polls
//! [`Rangefinder::is_complete`] and finishes with [`Rangefinder::end_cycle`]; the
//! handlers call [`Rangefinder::on_capture`] and [`Rangefinder::on_timeout`].

use embedded_hal::digital::v2::OutputPin;

use crate::{
    capture::{Edge, EdgeCapture},
    channel::{Producer, Reading},
    config::CAPTURE_TIMEOUT,
    measurement::{Measurement, Outcome, State, Step},
    pulse::PulseEmitter,
    Distance,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, defmt::Format)]
pub struct Stats {
    pub cycles: u32,
    pub echoes: u32,
    pub timeouts: u32,
    pub discarded: u32,
    pub last: Distance,
}

pub struct Rangefinder<'a, P, T> {
    trigger: PulseEmitter<P>,
    timer: T,
    machine: Measurement,
    producer: Producer<'a>,
    stats: Stats,
}

impl<'a, P, T> Rangefinder<'a, P, T>
where
    P: OutputPin,
    T: EdgeCapture,
{
    pub fn new(trigger: PulseEmitter<P>, mut timer: T, producer: Producer<'a>) -> Self {
        timer.disarm();
        Rangefinder {
            trigger,
            timer,
            machine: Measurement::new(),
            producer,
            stats: Stats::default(),
        }
    }

    /// Fire the trigger pulse and arm the capture timer.
    pub fn begin_cycle(&mut self) {
        if !self.machine.arm() {
            defmt::warn!("cycle still in flight: {}", self.machine.state());
            return;
        }
        self.trigger.emit();
        self.timer.arm(CAPTURE_TIMEOUT);
    }

    /// Capture interrupt. Returns the reading if this edge finished the cycle.
    pub fn on_capture(&mut self) -> Option<Reading> {
        let ticks = self.timer.captured();
        match self.machine.on_capture(ticks) {
            Step::RisingEdge(rising) => {
                defmt::trace!("rising edge @ {}", rising);
                self.timer.listen_for(Edge::Falling);
                None
            }
            Step::Completed(outcome) => Some(self.complete(outcome)),
            Step::Ignored => {
                defmt::warn!("capture @ {} discarded in {}", ticks, self.machine.state());
                self.stats.discarded = self.stats.discarded.wrapping_add(1);
                None
            }
        }
    }

    /// Timeout interrupt. Returns the zero reading if the cycle was still open.
    pub fn on_timeout(&mut self) -> Option<Reading> {
        self.timer.acknowledge_timeout();
        match self.machine.on_timeout() {
            Step::Completed(outcome) => Some(self.complete(outcome)),
            _ => {
                defmt::trace!("late timeout in {}", self.machine.state());
                None
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.machine.is_complete()
    }

    /// Stop the timer and return the machine to `Idle`.
    pub fn end_cycle(&mut self) {
        self.timer.disarm();
        self.machine.reset();
    }

    pub fn state(&self) -> State {
        self.machine.state()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    fn complete(&mut self, outcome: Outcome) -> Reading {
        let reading = self.producer.publish(outcome.distance());
        match outcome {
            Outcome::Echo(distance) => {
                defmt::debug!("#{}: {} ticks", reading.seq, distance);
                self.stats.echoes = self.stats.echoes.wrapping_add(1);
            }
            Outcome::Timeout => {
                defmt::debug!("#{}: no echo", reading.seq);
                self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
            }
        }
        self.stats.cycles = self.stats.cycles.wrapping_add(1);
        self.stats.last = reading.distance;
        reading
    }
}
