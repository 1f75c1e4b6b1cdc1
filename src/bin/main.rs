// coro-os entry point and driving loop
//
// Boot sequence: logger -> heap -> timer -> board -> routines -> registry
// Main loop: sweep registry -> WFI -> repeat
//
// Routines live in StaticCells so the power-button worker can hold a
// 'static handle to the LED routine (suspend/awake) while the registry
// keeps its own borrow of everything. The timer ISR only bumps the
// millisecond counter; all work happens in the sweep, one worker at a
// time, to completion.
//
// The sweep runs without pruning: the power button toggles routines
// dormant and back, so they must stay registered while suspended (a
// dormant entry costs one flag check per sweep). The boot report stays
// behind as a dormant entry once it is done.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::time::Duration;
use esp_hal::timer::PeriodicTimer;
use esp_hal::timer::timg::TimerGroup;
use log::info;

use core::cell::RefCell;
use critical_section::Mutex;
use static_cell::StaticCell;

use coro_os::board::Board;
use coro_os::clock::{self, TICK_MS, TickClock};
use coro_os::workers::{BatteryMonitor, BootReport, PowerButton, StatusLed};
use smol_coro::{Cadence, Registry, Routine};

esp_bootloader_esp_idf::esp_app_desc!();

static TIMER0: Mutex<RefCell<Option<PeriodicTimer<'static, esp_hal::Blocking>>>> =
    Mutex::new(RefCell::new(None));

static LED: StaticCell<Routine<StatusLed>> = StaticCell::new();
static BATTERY: StaticCell<Routine<BatteryMonitor>> = StaticCell::new();
static POWER: StaticCell<Routine<PowerButton>> = StaticCell::new();
static BOOT_REPORT: StaticCell<Routine<BootReport>> = StaticCell::new();

#[esp_hal::handler(priority = esp_hal::interrupt::Priority::Priority1)]
fn timer0_handler() {
    critical_section::with(|cs| {
        if let Some(timer) = TIMER0.borrow_ref_mut(cs).as_mut() {
            timer.clear_interrupt();
        }
    });
    clock::signal_tick();
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    esp_alloc::heap_allocator!(size: 65536);

    info!("booting...");

    let timg0 = TimerGroup::new(unsafe { peripherals.TIMG0.clone_unchecked() });
    let mut timer0 = PeriodicTimer::new(timg0.timer0);
    critical_section::with(|cs| {
        timer0.set_interrupt_handler(timer0_handler);
        timer0.start(Duration::from_millis(TICK_MS)).unwrap();
        timer0.listen();
        TIMER0.borrow_ref_mut(cs).replace(timer0);
    });
    info!("clock running ({}ms tick).", TICK_MS);

    let board = Board::init(peripherals);
    info!("hardware initialized.");

    let led: &'static Routine<StatusLed> = LED.init(Routine::new(StatusLed::new(board.led)));
    let battery: &'static Routine<BatteryMonitor> = BATTERY.init(Routine::with_cadence(
        BatteryMonitor::new(board.battery),
        Cadence::FromCompletion,
    ));
    let power: &'static Routine<PowerButton> =
        POWER.init(Routine::new(PowerButton::new(board.power, led)));
    let report: &'static Routine<BootReport> = BOOT_REPORT.init(Routine::new(BootReport::new()));

    let mut registry = Registry::new();
    registry.add(led);
    registry.add(battery);
    registry.add(power);
    registry.add(report);
    info!("{} routines registered.", registry.len());

    loop {
        registry.sweep(&TickClock, false);
        clock::wait_for_interrupt();
    }
}
