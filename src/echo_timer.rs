//! Edge capture on the nRF52: TIMER + GPIOTE + PPI.
//!
//! GPIOTE channel 0 watches the echo pin. Its IN event is routed through a PPI
//! channel to the timer's CAPTURE[1] task, so the counter is latched in
//! hardware at the edge and the GPIOTE interrupt only has to read CC[1]. CC[0]
//! holds the timeout compare.

use core::ops::Deref;

use nrf52840_hal::{
    gpio::{Input, Pin, PullDown},
    gpiote::Gpiote,
    pac::{timer0, TIMER0, TIMER1, TIMER2},
    ppi::{ConfigurablePpi, Ppi, Ppi0},
};

use crate::{
    capture::{Edge, EdgeCapture},
    config::CAPTURE_PRESCALER,
    TickCount,
};

const TIMEOUT_CC: usize = 0;
const CAPTURE_CC: usize = 1;

pub struct EchoTimer<T: Instance> {
    timer: T,
    gpiote: Gpiote,
    echo: Pin<Input<PullDown>>,
    _ppi: Ppi0,
}

impl<T: Instance> EchoTimer<T> {
    pub fn new(timer: T, gpiote: Gpiote, echo: Pin<Input<PullDown>>, mut ppi: Ppi0) -> Self {
        timer.tasks_stop.write(|w| unsafe { w.bits(1) });
        timer.mode.write(|w| w.mode().timer());
        timer.bitmode.write(|w| w.bitmode()._16bit());
        timer.prescaler.write(
            |w| unsafe { w.prescaler().bits(CAPTURE_PRESCALER) }, // 2 MHz
        );
        timer.intenclr.write(|w| w.compare0().clear());

        gpiote.channel0().input_pin(&echo).lo_to_hi();

        ppi.set_event_endpoint(gpiote.channel0().event());
        ppi.set_task_endpoint(&timer.tasks_capture[CAPTURE_CC]);
        ppi.enable();

        EchoTimer {
            timer,
            gpiote,
            echo,
            _ppi: ppi,
        }
    }
}

impl<T: Instance> EdgeCapture for EchoTimer<T> {
    fn arm(&mut self, timeout: TickCount) {
        self.timer.tasks_stop.write(|w| unsafe { w.bits(1) });
        self.timer.tasks_clear.write(|w| unsafe { w.bits(1) });
        self.timer.cc[TIMEOUT_CC].write(|w| unsafe { w.cc().bits(timeout as u32) });
        self.timer.events_compare[TIMEOUT_CC].write(|w| w);

        self.gpiote
            .channel0()
            .input_pin(&self.echo)
            .lo_to_hi()
            .enable_interrupt();
        self.gpiote.reset_events();

        self.timer.intenset.write(|w| w.compare0().set());
        self.timer.tasks_start.write(|w| unsafe { w.bits(1) });
    }

    fn listen_for(&mut self, edge: Edge) {
        let channel = self.gpiote.channel0();
        let event = channel.input_pin(&self.echo);
        match edge {
            Edge::Rising => event.lo_to_hi(),
            Edge::Falling => event.hi_to_lo(),
        };
    }

    fn captured(&mut self) -> TickCount {
        self.gpiote.reset_events();
        self.timer.cc[CAPTURE_CC].read().bits() as TickCount
    }

    fn acknowledge_timeout(&mut self) {
        self.timer.events_compare[TIMEOUT_CC].write(|w| w);
    }

    fn disarm(&mut self) {
        self.timer.tasks_stop.write(|w| unsafe { w.bits(1) });
        self.timer.intenclr.write(|w| w.compare0().clear());
        self.timer.events_compare[TIMEOUT_CC].write(|w| w);
        self.timer.tasks_clear.write(|w| unsafe { w.bits(1) });

        self.gpiote
            .channel0()
            .input_pin(&self.echo)
            .disable_interrupt();
        self.gpiote.reset_events();
    }
}

pub trait Instance: Deref<Target = timer0::RegisterBlock> {}
impl Instance for TIMER0 {}
impl Instance for TIMER1 {}
impl Instance for TIMER2 {}
