#![no_main]
#![no_std]

use sonar_bridge as _; // global logger + panicking-behavior + memory layout

#[rtic::app(device = nrf52840_hal::pac, peripherals = true, dispatchers = [UARTE1])]
mod app {
    use dwt_systick_monotonic::DwtSystick;
    use nrf52840_hal::{
        clocks::Clocks,
        gpio::{p0::Parts, Level, Output, Pin, PushPull},
        gpiote::Gpiote,
        pac::{Interrupt, SPIS1, TIMER1},
        ppi,
    };
    use sonar_bridge::{
        channel::MeasurementChannel,
        config::{cycles, CAPTURE_TIMEOUT, CORE_HZ, HEARTBEAT, QUIET_PERIOD},
        echo_timer::EchoTimer,
        publisher::{DistancePublisher, Request},
        pulse::PulseEmitter,
        rangefinder::Rangefinder,
        spis::{self, SerialSlave},
    };

    #[monotonic(binds = SysTick, default = true)]
    type MyMono = DwtSystick<CORE_HZ>;

    type Sonar = Rangefinder<'static, Pin<Output<PushPull>>, EchoTimer<TIMER1>>;

    #[shared]
    struct Shared {
        sonar: Sonar,
    }

    #[local]
    struct Local {
        slave: SerialSlave<SPIS1>,
        publisher: DistancePublisher<'static>,
    }

    #[init(local = [
        channel: MeasurementChannel = MeasurementChannel::new(),
        tx: [u8; 1] = [0; 1],
    ])]
    fn init(mut ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        let _clocks = Clocks::new(ctx.device.CLOCK).enable_ext_hfosc();

        ctx.core.DCB.enable_trace();
        ctx.core.DWT.enable_cycle_counter();
        let mono = DwtSystick::new(&mut ctx.core.DCB, ctx.core.DWT, ctx.core.SYST, CORE_HZ);

        let p0 = Parts::new(ctx.device.P0);
        let echo_pin = p0.p0_04.into_pulldown_input().degrade();
        let trig_pin = p0.p0_03.into_push_pull_output(Level::Low).degrade();
        let pins = spis::Pins {
            sck: p0.p0_28.into_floating_input().degrade(),
            cs: p0.p0_29.into_floating_input().degrade(),
            cipo: p0.p0_30.into_floating_input().degrade(),
        };

        let gpiote = Gpiote::new(ctx.device.GPIOTE);
        let ppi = ppi::Parts::new(ctx.device.PPI);
        let timer = EchoTimer::new(ctx.device.TIMER1, gpiote, echo_pin, ppi.ppi0);

        let (producer, consumer) = ctx.local.channel.split();
        let sonar = Rangefinder::new(PulseEmitter::new(trig_pin), timer, producer);
        let mut slave = SerialSlave::new(ctx.device.SPIS1, pins, ctx.local.tx);
        let mut publisher = DistancePublisher::new(consumer);
        publisher.service(&mut slave, Request::Consumed);

        defmt::info!("Sonar bridge up, timeout {} ticks", CAPTURE_TIMEOUT);
        heartbeat::spawn_after(HEARTBEAT.convert()).ok();

        (
            Shared { sonar },
            Local { slave, publisher },
            init::Monotonics(mono),
        )
    }

    #[idle(shared = [sonar])]
    fn idle(mut ctx: idle::Context) -> ! {
        loop {
            ctx.shared.sonar.lock(|sonar| sonar.begin_cycle());
            // Lock only around the check so byte requests keep flowing
            while !ctx.shared.sonar.lock(|sonar| sonar.is_complete()) {}
            ctx.shared.sonar.lock(|sonar| sonar.end_cycle());
            cortex_m::asm::delay(cycles(QUIET_PERIOD));
        }
    }

    #[task(binds = GPIOTE, shared = [sonar], priority = 2)]
    fn on_echo_edge(mut ctx: on_echo_edge::Context) {
        if ctx.shared.sonar.lock(|sonar| sonar.on_capture()).is_some() {
            rtic::pend(Interrupt::SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1);
        }
    }

    #[task(binds = TIMER1, shared = [sonar], priority = 2)]
    fn on_echo_timeout(mut ctx: on_echo_timeout::Context) {
        if ctx.shared.sonar.lock(|sonar| sonar.on_timeout()).is_some() {
            rtic::pend(Interrupt::SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1);
        }
    }

    #[task(binds = SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1, local = [slave, publisher], priority = 3)]
    fn on_byte_request(ctx: on_byte_request::Context) {
        let (slave, publisher) = (ctx.local.slave, ctx.local.publisher);
        // no ACQUIRED pending means the measurement side pended us
        let request = slave.take_request().unwrap_or(Request::Notified);
        defmt::trace!("spi {}", request);
        publisher.service(slave, request);
    }

    #[task(shared = [sonar])]
    fn heartbeat(mut ctx: heartbeat::Context) {
        let (state, stats) = ctx.shared.sonar.lock(|sonar| (sonar.state(), sonar.stats()));
        defmt::info!("{} {}", state, stats);
        heartbeat::spawn_after(HEARTBEAT.convert()).ok();
    }
}
