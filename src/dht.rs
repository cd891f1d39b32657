//! Single-wire protocol decoder for the DHT11 humidity/temperature sensor.
//!
//! The sensor shares one open-drain line for request and response. After a
//! wake-up pulse it answers with 40 bits, self-clocked by pulse width: the
//! high half of each bit cell is short for a 0 and long for a 1. The line is
//! sampled by busy-polling in 1 microsecond steps, so reads are timing
//! sensitive and run with nothing else scheduled.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Wake-up pulse width: line driven low this long to start a read.
const START_PULSE_MS: u32 = 20;
/// Settle time after releasing the line before sampling begins.
const RESPONSE_DELAY_US: u32 = 40;
/// Upper bound on level transitions in one response frame.
const MAX_TRANSITIONS: usize = 85;
/// Transitions to skip before bit decoding starts (sensor preamble).
const PREAMBLE_TRANSITIONS: usize = 4;
/// A level held this many poll steps means the frame is over (or lost).
const HOLD_LIMIT: u8 = 255;
/// High pulses longer than this many steps decode as a 1 bit.
const BIT_THRESHOLD: u8 = 50;

const RAW_BYTES: usize = 5;
const FRAME_BITS: u8 = 40;

/// A single decoded humidity/temperature measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Relative humidity in percent.
    pub humidity: f32,
    /// Temperature in degrees Celsius.
    pub temperature_celsius: f32,
}

impl Reading {
    /// Gets the temperature converted to Fahrenheit for display
    pub fn temperature_fahrenheit(&self) -> f32 {
        self.temperature_celsius * 9.0 / 5.0 + 32.0
    }
}

/// Ways a sensor read can fail. None of these are fatal; the caller treats
/// them as "no reading this cycle" and waits for the next trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtError<E> {
    /// GPIO pin error.
    Pin(E),
    /// A level hold exceeded the poll limit before a full frame arrived.
    Timeout,
    /// The transition budget ran out short of 40 bits.
    InsufficientBits { got: u8 },
    /// 40 bits arrived but the trailing byte does not match the data sum.
    ChecksumMismatch,
}

impl<E> From<E> for DhtError<E> {
    fn from(e: E) -> Self {
        DhtError::Pin(e)
    }
}

/// The DHT11 driver. Needs a pin that can switch between driving the line
/// low and reading it back (open-drain with pull-up), plus a microsecond
/// delay source for the busy-wait pacing.
pub struct Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Releases the pin and the delay source.
    pub fn free(self) -> (P, D) {
        (self.pin, self.delay)
    }

    /// Performs one full read: wake-up pulse, frame sampling, checksum
    /// validation and conversion
    /// returns: the reading, or a typed failure with no usable data
    pub fn read(&mut self) -> Result<Reading, DhtError<P::Error>> {
        let raw = self.sample_frame()?;
        convert(raw)
    }

    /// Samples one 40-bit response frame off the line.
    fn sample_frame(&mut self) -> Result<[u8; RAW_BYTES], DhtError<P::Error>> {
        // wake the sensor, then release the line and give it time to answer
        self.pin.set_low()?;
        self.delay.delay_ms(START_PULSE_MS);
        self.pin.set_high()?;
        self.delay.delay_us(RESPONSE_DELAY_US);

        let mut data = [0u8; RAW_BYTES];
        let mut bits: u8 = 0;
        let mut level = true;
        let mut timed_out = false;

        for slot in 0..MAX_TRANSITIONS {
            // measure how long the line holds its current level
            let mut hold: u8 = 0;
            while self.pin.is_high()? == level {
                hold += 1;
                self.delay.delay_us(1);
                if hold == HOLD_LIMIT {
                    break;
                }
            }
            if hold == HOLD_LIMIT {
                timed_out = true;
                break;
            }
            level = !level;

            // past the preamble, every second transition is the high half
            // of a bit cell; its width carries the bit value
            if slot >= PREAMBLE_TRANSITIONS && slot % 2 == 0 {
                let byte = (bits / 8) as usize;
                data[byte] <<= 1;
                if hold > BIT_THRESHOLD {
                    data[byte] |= 1;
                }
                bits += 1;
                if bits == FRAME_BITS {
                    break;
                }
            }
        }

        if bits >= FRAME_BITS {
            Ok(data)
        } else if timed_out {
            Err(DhtError::Timeout)
        } else {
            Err(DhtError::InsufficientBits { got: bits })
        }
    }
}

/// Validates the checksum and converts raw bytes into a reading.
/// The out-of-range overrides reproduce the sensor quirk workaround: a
/// humidity above 100 collapses to the raw high byte, a temperature above
/// 125 collapses to the raw high byte including its sign bit, and the sign
/// bit negates the final value.
fn convert<E>(raw: [u8; RAW_BYTES]) -> Result<Reading, DhtError<E>> {
    let sum = raw[0]
        .wrapping_add(raw[1])
        .wrapping_add(raw[2])
        .wrapping_add(raw[3]);
    if raw[4] != sum {
        return Err(DhtError::ChecksumMismatch);
    }

    let mut humidity = f32::from((u16::from(raw[0]) << 8) | u16::from(raw[1])) / 10.0;
    if humidity > 100.0 {
        humidity = f32::from(raw[0]);
    }

    let mut temperature_celsius =
        f32::from((u16::from(raw[2] & 0x7F) << 8) | u16::from(raw[3])) / 10.0;
    if temperature_celsius > 125.0 {
        temperature_celsius = f32::from(raw[2]);
    }
    if raw[2] & 0x80 != 0 {
        temperature_celsius = -temperature_celsius;
    }

    Ok(Reading {
        humidity,
        temperature_celsius,
    })
}
