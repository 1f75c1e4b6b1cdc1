// Demo workers for the routine scheduler
//
// Four routines exercise the whole scheduler surface:
//   StatusLed      - 500ms toggle, schedule-relative cadence
//   BatteryMonitor - 30s sample, completion-relative (ADC time lands
//                    inside the delay)
//   PowerButton    - 50ms poll; a press toggles the LED routine's
//                    dormancy through its 'static handle
//   BootReport     - three 1s heap/uptime lines after boot, then
//                    suspends and gets pruned from the registry

use embedded_hal::digital::OutputPin;
use esp_hal::gpio::Input;
use log::{info, warn};

use smol_coro::{Control, Routine, Worker};

use crate::board::{BatteryHw, RawOutputPin};
use crate::clock;

const BLINK_MS: u32 = 500;
const BATTERY_INTERVAL_MS: u32 = 30_000;
const POWER_POLL_MS: u32 = 50;
const REPORT_INTERVAL_MS: u32 = 1_000;
const BOOT_REPORTS: u8 = 3;

// GPIO0 reads through a 100K/100K divider (2:1). ADC with 11dB
// attenuation gives 0..2500mV; multiply by 2 for actual cell voltage.
// Linear approximation: 4200mV = 100%, 3000mV = 0%.
const DIVIDER_MULT: u32 = 2;
const VBAT_FULL_MV: u32 = 4200;
const VBAT_EMPTY_MV: u32 = 3000;

fn battery_percentage(battery_mv: u32) -> u8 {
    if battery_mv >= VBAT_FULL_MV {
        100
    } else if battery_mv <= VBAT_EMPTY_MV {
        0
    } else {
        ((battery_mv - VBAT_EMPTY_MV) * 100 / (VBAT_FULL_MV - VBAT_EMPTY_MV)) as u8
    }
}

// ── Status LED ──────────────────────────────────────────────────────────

pub struct StatusLed {
    pin: RawOutputPin,
    on: bool,
}

impl StatusLed {
    pub fn new(pin: RawOutputPin) -> Self {
        Self { pin, on: false }
    }
}

impl Worker for StatusLed {
    fn work(&mut self) -> Control {
        self.on = !self.on;
        if self.on {
            let _ = self.pin.set_high();
        } else {
            let _ = self.pin.set_low();
        }
        Control::AgainIn(BLINK_MS)
    }
}

// ── Battery monitor ─────────────────────────────────────────────────────

pub struct BatteryMonitor {
    hw: BatteryHw,
}

impl BatteryMonitor {
    pub fn new(hw: BatteryHw) -> Self {
        Self { hw }
    }
}

impl Worker for BatteryMonitor {
    fn work(&mut self) -> Control {
        let adc_mv: u16 = nb::block!(self.hw.adc.read_oneshot(&mut self.hw.vbat)).unwrap();
        let mv = u32::from(adc_mv) * DIVIDER_MULT;
        if mv <= VBAT_EMPTY_MV {
            warn!("battery critical: {}mV", mv);
        } else {
            info!("battery: {}mV ({}%)", mv, battery_percentage(mv));
        }
        Control::AgainIn(BATTERY_INTERVAL_MS)
    }
}

// ── Power button ────────────────────────────────────────────────────────

// Edge detection only; the 50ms poll interval doubles as debounce,
// which is plenty for a deliberate press.
pub struct PowerButton {
    pin: Input<'static>,
    led: &'static Routine<StatusLed>,
    was_low: bool,
}

impl PowerButton {
    pub fn new(pin: Input<'static>, led: &'static Routine<StatusLed>) -> Self {
        Self {
            pin,
            led,
            was_low: false,
        }
    }
}

impl Worker for PowerButton {
    fn work(&mut self) -> Control {
        let low = self.pin.is_low();
        if low && !self.was_low {
            if self.led.is_suspended() {
                info!("power: blink resumed");
                self.led.awake();
            } else {
                info!("power: blink suspended");
                self.led.suspend();
            }
        }
        self.was_low = low;
        Control::AgainIn(POWER_POLL_MS)
    }
}

// ── Boot report ─────────────────────────────────────────────────────────

pub struct BootReport {
    left: u8,
}

impl BootReport {
    pub fn new() -> Self {
        Self { left: BOOT_REPORTS }
    }
}

impl Default for BootReport {
    fn default() -> Self {
        Self::new()
    }
}

impl Worker for BootReport {
    fn work(&mut self) -> Control {
        let stats = esp_alloc::HEAP.stats();
        info!(
            "up {}s, heap {}B used",
            clock::uptime_secs(),
            stats.current_usage
        );
        self.left -= 1;
        if self.left == 0 {
            Control::Suspend
        } else {
            Control::AgainIn(REPORT_INTERVAL_MS)
        }
    }
}
