//! One pass of the firmware main loop: trigger intake, debounce, sensor
//! read and display update. Factored out of `main.rs` so the whole path
//! runs against mock pins on the host.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::dht::{Dht11, DhtError, Reading};
use crate::display::{Position, SevenSegment};
use crate::segments::{split_tens_ones, Digit};
use crate::trigger::{Debounce, TriggerFlag};

/// What one service pass did. The firmware logs these; rendering the
/// updated display is left to the caller, which knows how long to hold it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceOutcome<E> {
    /// No trigger pending.
    Idle,
    /// A trigger arrived too soon after the last serviced one.
    Debounced,
    /// A reading was decoded and loaded into the display.
    Displayed(Reading),
    /// The sensor read failed; the display keeps its previous content.
    Failed(DhtError<E>),
}

/// Picks the four display digits for a reading: Fahrenheit tens and ones
/// on the left, humidity tens and ones on the right
/// param reading: decoded measurement
pub fn reading_digits(reading: &Reading) -> [Digit; 4] {
    // the display has no sign position, so sub-zero Fahrenheit shows as 0
    let fahrenheit = reading.temperature_fahrenheit().max(0.0) as u8;
    let (temp_tens, temp_ones) = split_tens_ones(fahrenheit);
    let (hum_tens, hum_ones) = split_tens_ones(reading.humidity as u8);
    [temp_tens, temp_ones, hum_tens, hum_ones]
}

/// Runs one iteration of the main loop body
/// param flag: latched read request, cleared before any other work
/// param debounce: minimum-interval policy between serviced requests
/// param now_us: current time in microseconds
/// param sensor: DHT11 driver
/// param display: 7-segment driver, updated only on a good reading
pub fn poll_once<P, DP, S, DS>(
    flag: &TriggerFlag,
    debounce: &mut Debounce,
    now_us: u64,
    sensor: &mut Dht11<P, DP>,
    display: &mut SevenSegment<S, DS>,
) -> ServiceOutcome<P::Error>
where
    P: InputPin + OutputPin,
    DP: DelayNs,
    S: OutputPin,
    DS: DelayNs,
{
    if !flag.take() {
        return ServiceOutcome::Idle;
    }
    if !debounce.try_accept(now_us) {
        return ServiceOutcome::Debounced;
    }
    match sensor.read() {
        Ok(reading) => {
            for (position, digit) in Position::ALL.iter().zip(reading_digits(&reading)) {
                display.set_digit(*position, digit.pattern());
            }
            ServiceOutcome::Displayed(reading)
        }
        Err(e) => ServiceOutcome::Failed(e),
    }
}
