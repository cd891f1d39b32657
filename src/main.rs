#![no_std]
#![no_main]

use core::cell::RefCell;

use critical_section::Mutex;
use defmt::*;
use defmt_rtt as _;
use embedded_hal::delay::DelayNs;
use panic_probe as _;

use bsp::entry;
use rp_pico as bsp;

use bsp::hal::{
    clocks::init_clocks_and_plls,
    gpio::{self, InOutPin, Interrupt as GpioInterrupt},
    pac,
    pac::interrupt,
    watchdog::Watchdog,
    Sio, Timer,
};

use pico_thermometer::dht::{Dht11, DhtError};
use pico_thermometer::display::SevenSegment;
use pico_thermometer::service::{poll_once, ServiceOutcome};
use pico_thermometer::trigger::{Debounce, TriggerFlag};

/// Minimum spacing between serviced button presses.
const DEBOUNCE_INTERVAL_US: u64 = 2_000_000;

/// Full display sweeps per reading. One sweep is 4 digits at 2 ms each, so
/// 1000 sweeps holds the reading for about 8 seconds.
const DISPLAY_HOLD_FRAMES: u32 = 1000;

type ButtonPin = gpio::Pin<gpio::bank0::Gpio26, gpio::FunctionSioInput, gpio::PullDown>;
type OutPin = gpio::Pin<gpio::DynPinId, gpio::FunctionSioOutput, gpio::PullDown>;

/// Read request latched by the button interrupt, consumed by the main loop.
static SHOULD_READ: TriggerFlag = TriggerFlag::new();

/// Button pin handed over to the interrupt handler after configuration.
static BUTTON: Mutex<RefCell<Option<ButtonPin>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    info!("7-segment thermometer starting");

    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();
    let _core = pac::CorePeripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    let clocks = init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = rp_pico::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // Digit select pins, display positions 0-3 left to right
    let digit_pins: [OutPin; 4] = [
        pins.gpio16.into_push_pull_output().into_dyn_pin(),
        pins.gpio17.into_push_pull_output().into_dyn_pin(),
        pins.gpio18.into_push_pull_output().into_dyn_pin(),
        pins.gpio19.into_push_pull_output().into_dyn_pin(),
    ];

    // Segment pins A-G plus the decimal point
    let segment_pins: [OutPin; 8] = [
        pins.gpio2.into_push_pull_output().into_dyn_pin(),
        pins.gpio3.into_push_pull_output().into_dyn_pin(),
        pins.gpio4.into_push_pull_output().into_dyn_pin(),
        pins.gpio5.into_push_pull_output().into_dyn_pin(),
        pins.gpio6.into_push_pull_output().into_dyn_pin(),
        pins.gpio7.into_push_pull_output().into_dyn_pin(),
        pins.gpio8.into_push_pull_output().into_dyn_pin(),
        pins.gpio9.into_push_pull_output().into_dyn_pin(),
    ];

    let mut display = SevenSegment::new(digit_pins, segment_pins, timer);
    display.blank().unwrap();

    // The DHT11 data line needs to switch between output and input
    let mut sensor = Dht11::new(InOutPin::new(pins.gpio15), timer);

    // Set up the button with a rising-edge interrupt
    let button = pins.gpio26.into_pull_down_input();
    button.set_interrupt_enabled(GpioInterrupt::EdgeHigh, true);
    critical_section::with(|cs| BUTTON.borrow(cs).replace(Some(button)));
    unsafe {
        pac::NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
    }

    let mut debounce = Debounce::new(DEBOUNCE_INTERVAL_US);

    info!("7-segment thermometer ready");

    // main loop
    loop {
        let now = timer.get_counter().ticks();
        match poll_once(&SHOULD_READ, &mut debounce, now, &mut sensor, &mut display) {
            ServiceOutcome::Idle => {}
            ServiceOutcome::Debounced => {
                info!("trigger ignored, too soon after the last reading")
            }
            ServiceOutcome::Displayed(reading) => {
                info!(
                    "humidity: {=f32} %, temperature: {=f32} C ({=f32} F)",
                    reading.humidity,
                    reading.temperature_celsius,
                    reading.temperature_fahrenheit()
                );
                display.render_for(DISPLAY_HOLD_FRAMES).unwrap();
            }
            ServiceOutcome::Failed(DhtError::ChecksumMismatch) => {
                warn!("bad data: checksum mismatch")
            }
            ServiceOutcome::Failed(DhtError::Timeout) => warn!("bad data: sensor timed out"),
            ServiceOutcome::Failed(DhtError::InsufficientBits { got }) => {
                warn!("bad data: only {=u8} of 40 bits received", got)
            }
            ServiceOutcome::Failed(DhtError::Pin(_)) => warn!("bad data: pin error"),
        }
        timer.delay_ms(10);
    }
}

#[interrupt]
fn IO_IRQ_BANK0() {
    critical_section::with(|cs| {
        if let Some(button) = BUTTON.borrow_ref_mut(cs).as_mut() {
            if button.interrupt_status(GpioInterrupt::EdgeHigh) {
                // mask the edge while handling it so the handler cannot
                // re-enter, then latch the request and unmask
                button.set_interrupt_enabled(GpioInterrupt::EdgeHigh, false);
                SHOULD_READ.raise();
                button.clear_interrupt(GpioInterrupt::EdgeHigh);
                button.set_interrupt_enabled(GpioInterrupt::EdgeHigh, true);
            }
        }
    });
}
