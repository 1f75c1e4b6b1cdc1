// Millisecond uptime from the periodic timer ISR
//
// The ISR calls signal_tick() every TICK_MS; TickClock adapts the
// counter to smol_coro::Clock for the registry sweep. The counter sits
// behind a critical section because riscv32imc has no 64-bit atomic
// RMW. Sweep granularity equals the tick period: a routine asking for
// a delay that is not a multiple of TICK_MS fires on the first tick
// after it is due.

use core::cell::Cell;

use smol_coro::{Clock, Millis};

/// Tick period of the scheduling timer.
pub const TICK_MS: u64 = 10;

static UPTIME_MS: critical_section::Mutex<Cell<u64>> =
    critical_section::Mutex::new(Cell::new(0));

/// Called from the timer ISR, once per tick.
#[inline]
pub fn signal_tick() {
    critical_section::with(|cs| {
        let ms = UPTIME_MS.borrow(cs);
        ms.set(ms.get() + TICK_MS);
    });
}

/// Milliseconds since the scheduling timer started.
pub fn uptime_ms() -> u64 {
    critical_section::with(|cs| UPTIME_MS.borrow(cs).get())
}

pub fn uptime_secs() -> u64 {
    uptime_ms() / 1000
}

/// The firmware's one clock: reads the ISR-maintained uptime counter.
pub struct TickClock;

impl Clock for TickClock {
    fn now(&self) -> Millis {
        uptime_ms()
    }
}

/// Idle the CPU until the next interrupt (timer tick at the latest).
#[inline]
pub fn wait_for_interrupt() {
    #[cfg(target_arch = "riscv32")]
    unsafe {
        core::arch::asm!("wfi", options(nomem, nostack));
    }

    #[cfg(not(target_arch = "riscv32"))]
    core::hint::spin_loop();
}
