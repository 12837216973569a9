//! Build-time timing and bus constants.

use fugit::{MicrosDurationU32, SecsDurationU32};

use crate::TickCount;

/// Core clock with the external high-frequency oscillator enabled.
pub const CORE_HZ: u32 = 64_000_000;

/// Width of the pulse on the trigger line.
pub const TRIGGER_PULSE: MicrosDurationU32 = MicrosDurationU32::from_ticks(10);

/// Minimum idle time between the end of one cycle and the next trigger.
pub const QUIET_PERIOD: MicrosDurationU32 = MicrosDurationU32::from_ticks(200);

/// Capture timer runs at 16 MHz / 2^3 = 2 MHz.
pub const CAPTURE_PRESCALER: u8 = 3;

/// 20 ms at 2 MHz, roughly 10.3 ft of round trip. Anything slower counts as no echo.
pub const CAPTURE_TIMEOUT: TickCount = 40_000;

/// Byte clocked out when the master reads past the prepared byte.
pub const OVERREAD_CHAR: u8 = 0x00;

/// Period of the status log.
pub const HEARTBEAT: SecsDurationU32 = SecsDurationU32::from_ticks(1);

/// Core cycles spent busy-waiting for `duration`.
pub const fn cycles(duration: MicrosDurationU32) -> u32 {
    duration.ticks() * (CORE_HZ / 1_000_000)
}
