//! Edge capture timer seam.

use crate::TickCount;

/// Echo line transition the capture unit latches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Edge {
    Rising,
    Falling,
}

/// Free-running counter with input capture and a compare-match timeout.
pub trait EdgeCapture {
    /// Zero the counter, capture on the next rising edge and fire the timeout
    /// interrupt at `timeout` counts.
    fn arm(&mut self, timeout: TickCount);

    /// Select the edge the next capture latches on.
    fn listen_for(&mut self, edge: Edge);

    /// Counter value latched by the last capture. Acknowledges the capture event.
    fn captured(&mut self) -> TickCount;

    /// Acknowledge the timeout event.
    fn acknowledge_timeout(&mut self);

    /// Stop the counter and mask both interrupts.
    fn disarm(&mut self);
}
