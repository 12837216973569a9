//! Trigger → rising edge → falling edge state machine.
//!
//! The machine is a plain transition function. It owns no peripherals, so the
//! capture and timeout handlers both drive it through [`Measurement::on_capture`]
//! and [`Measurement::on_timeout`] and act on the returned [`Step`].
//!
//! # Echo already high when armed
//!
//! The first capture after [`Measurement::arm`] is taken as the rising edge no
//! matter what the echo line was doing before. If the line is already high at
//! arm time the machine cannot tell, and whatever edge is captured first is
//! used as the start of the pulse. This is kept as is; consumers rely on the
//! existing timing.

use crate::{Distance, TickCount};

#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum State {
    Idle,
    AwaitingRisingEdge,
    AwaitingFallingEdge { rising: TickCount },
    Resolved(Distance),
    TimedOut,
}

/// How far the current cycle got through its two edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum EdgePhase {
    Idle,
    RisingSeen,
    FallingSeen,
}

/// Terminal result of a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Outcome {
    Echo(Distance),
    Timeout,
}

impl Outcome {
    /// Value to publish. A timeout reads as zero ticks.
    pub fn distance(self) -> Distance {
        match self {
            Outcome::Echo(distance) => distance,
            Outcome::Timeout => 0,
        }
    }
}

/// What an event did to the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Step {
    /// Out-of-protocol event, state unchanged.
    Ignored,
    /// Rising edge recorded, the capture unit must now listen for the falling edge.
    RisingEdge(TickCount),
    Completed(Outcome),
}

#[derive(Debug)]
pub struct Measurement {
    state: State,
}

impl Default for Measurement {
    fn default() -> Self {
        Self::new()
    }
}

impl Measurement {
    pub const fn new() -> Self {
        Measurement { state: State::Idle }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn edge_phase(&self) -> EdgePhase {
        match self.state {
            State::AwaitingFallingEdge { .. } => EdgePhase::RisingSeen,
            State::Resolved(_) => EdgePhase::FallingSeen,
            State::Idle | State::AwaitingRisingEdge | State::TimedOut => EdgePhase::Idle,
        }
    }

    /// Set once the cycle holds a final value, echo or timeout.
    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Resolved(_) | State::TimedOut)
    }

    /// Final value of the cycle, if it has one.
    pub fn distance(&self) -> Option<Distance> {
        match self.state {
            State::Resolved(distance) => Some(distance),
            State::TimedOut => Some(0),
            _ => None,
        }
    }

    /// Start a cycle. Only valid from `Idle`; a cycle in flight is left alone.
    pub fn arm(&mut self) -> bool {
        if self.state != State::Idle {
            return false;
        }
        self.state = State::AwaitingRisingEdge;
        true
    }

    pub fn on_capture(&mut self, ticks: TickCount) -> Step {
        match self.state {
            State::AwaitingRisingEdge => {
                self.state = State::AwaitingFallingEdge { rising: ticks };
                Step::RisingEdge(ticks)
            }
            State::AwaitingFallingEdge { rising } => {
                let distance = ticks.wrapping_sub(rising);
                self.state = State::Resolved(distance);
                Step::Completed(Outcome::Echo(distance))
            }
            State::Idle | State::Resolved(_) | State::TimedOut => Step::Ignored,
        }
    }

    pub fn on_timeout(&mut self) -> Step {
        match self.state {
            State::AwaitingRisingEdge | State::AwaitingFallingEdge { .. } => {
                self.state = State::TimedOut;
                Step::Completed(Outcome::Timeout)
            }
            State::Idle | State::Resolved(_) | State::TimedOut => Step::Ignored,
        }
    }

    /// Tear the cycle down, back to `Idle`.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }
}
