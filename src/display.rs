//! Multiplexed driver for a 4-digit 7-segment display.
//!
//! The four positions share the eight segment lines; each position has its
//! own active-low select line. Only one position is lit at a time, cycled
//! quickly enough to appear continuously on.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::segments::{DigitPattern, BLANK};

/// Number of display positions.
pub const DIGIT_COUNT: usize = 4;
/// Segment lines per position, including the decimal point.
pub const SEGMENT_COUNT: usize = 8;

/// How long one position stays lit during a sweep.
const DWELL_MS: u32 = 2;

/// A display position, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    First,
    Second,
    Third,
    Fourth,
}

impl Position {
    /// All positions in sweep order.
    pub const ALL: [Position; DIGIT_COUNT] =
        [Position::First, Position::Second, Position::Third, Position::Fourth];

    fn index(self) -> usize {
        match self {
            Position::First => 0,
            Position::Second => 1,
            Position::Third => 2,
            Position::Fourth => 3,
        }
    }
}

/// The 7-segment display driver.
/// Owns the select and segment pins plus one stored pattern per position.
/// Patterns are only mutated between render sessions, never mid-sweep.
pub struct SevenSegment<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    digit_pins: [P; DIGIT_COUNT],
    segment_pins: [P; SEGMENT_COUNT],
    patterns: [DigitPattern; DIGIT_COUNT],
    delay: D,
}

impl<P, D> SevenSegment<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Creates the driver with all positions blank
    /// param digit_pins: active-low select lines, position 0..=3
    /// param segment_pins: segment lines A..G plus decimal point
    /// param delay: dwell timing source
    pub fn new(digit_pins: [P; DIGIT_COUNT], segment_pins: [P; SEGMENT_COUNT], delay: D) -> Self {
        Self {
            digit_pins,
            segment_pins,
            patterns: [BLANK; DIGIT_COUNT],
            delay,
        }
    }

    /// Overwrites the stored pattern for one position
    /// param position: which display position to update
    /// param pattern: segment states to show there
    pub fn set_digit(&mut self, position: Position, pattern: DigitPattern) {
        self.patterns[position.index()] = pattern;
    }

    /// Gets the stored pattern for one position
    pub fn pattern(&self, position: Position) -> DigitPattern {
        self.patterns[position.index()]
    }

    /// Lights one position with its stored pattern and dwells on it.
    fn show_position(&mut self, position: usize) -> Result<(), P::Error> {
        // select lines are active low
        for (i, pin) in self.digit_pins.iter_mut().enumerate() {
            if i == position {
                pin.set_low()?;
            } else {
                pin.set_high()?;
            }
        }

        for (pin, &lit) in self.segment_pins.iter_mut().zip(&self.patterns[position]) {
            if lit {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
        }

        self.delay.delay_ms(DWELL_MS);
        Ok(())
    }

    /// Runs one full sweep over all four positions.
    pub fn render_cycle(&mut self) -> Result<(), P::Error> {
        for position in 0..DIGIT_COUNT {
            self.show_position(position)?;
        }
        Ok(())
    }

    /// Holds the display visibly steady, then blanks it
    /// param frames: number of full sweeps; one frame takes about 8 ms
    pub fn render_for(&mut self, frames: u32) -> Result<(), P::Error> {
        for _ in 0..frames {
            self.render_cycle()?;
        }
        self.blank()
    }

    /// Deselects every position and drops all segment lines.
    /// Called after each render session so no segment stays energized.
    pub fn blank(&mut self) -> Result<(), P::Error> {
        for pin in self.digit_pins.iter_mut() {
            pin.set_high()?;
        }
        for pin in self.segment_pins.iter_mut() {
            pin.set_low()?;
        }
        Ok(())
    }

    /// Releases the pins and the delay source.
    pub fn free(self) -> ([P; DIGIT_COUNT], [P; SEGMENT_COUNT], D) {
        (self.digit_pins, self.segment_pins, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::encode;

    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    fn select_expectations(own_index: usize, frames: usize) -> Vec<PinTransaction> {
        let mut expectations = Vec::new();
        for _ in 0..frames {
            for position in 0..DIGIT_COUNT {
                expectations.push(PinTransaction::set(if position == own_index {
                    State::Low
                } else {
                    State::High
                }));
            }
        }
        // blanking deselects
        expectations.push(PinTransaction::set(State::High));
        expectations
    }

    fn segment_expectations(patterns: &[DigitPattern; 4], segment: usize) -> Vec<PinTransaction> {
        let mut expectations = Vec::new();
        for pattern in patterns {
            expectations.push(PinTransaction::set(if pattern[segment] {
                State::High
            } else {
                State::Low
            }));
        }
        // blanking zeroes the segment lines
        expectations.push(PinTransaction::set(State::Low));
        expectations
    }

    #[test]
    fn one_frame_sweeps_selects_in_order_and_blanks() {
        let digit_pins: [PinMock; DIGIT_COUNT] = core::array::from_fn(|i| {
            PinMock::new(&select_expectations(i, 1))
        });

        let patterns = [
            encode(5).unwrap(),
            encode(2).unwrap(),
            encode(4).unwrap(),
            encode(8).unwrap(),
        ];
        let segment_pins: [PinMock; SEGMENT_COUNT] = core::array::from_fn(|i| {
            PinMock::new(&segment_expectations(&patterns, i))
        });

        let mut display = SevenSegment::new(digit_pins, segment_pins, NoopDelay::new());
        for (position, pattern) in Position::ALL.iter().zip(patterns) {
            display.set_digit(*position, pattern);
        }
        display.render_for(1).unwrap();

        for mut pin in display.digit_pins {
            pin.done();
        }
        for mut pin in display.segment_pins {
            pin.done();
        }
    }

    #[test]
    fn blank_deselects_everything() {
        let digit_pins: [PinMock; DIGIT_COUNT] =
            core::array::from_fn(|_| PinMock::new(&[PinTransaction::set(State::High)]));
        let segment_pins: [PinMock; SEGMENT_COUNT] =
            core::array::from_fn(|_| PinMock::new(&[PinTransaction::set(State::Low)]));

        let mut display = SevenSegment::new(digit_pins, segment_pins, NoopDelay::new());
        display.blank().unwrap();

        for mut pin in display.digit_pins {
            pin.done();
        }
        for mut pin in display.segment_pins {
            pin.done();
        }
    }

    #[test]
    fn set_digit_only_touches_its_own_position() {
        let mut display = SevenSegment::new(
            core::array::from_fn::<PinMock, DIGIT_COUNT, _>(|_| PinMock::new(&[])),
            core::array::from_fn::<PinMock, SEGMENT_COUNT, _>(|_| PinMock::new(&[])),
            NoopDelay::new(),
        );

        display.set_digit(Position::Third, encode(7).unwrap());
        assert_eq!(display.patterns[2], encode(7).unwrap());
        assert_eq!(display.patterns[0], BLANK);
        assert_eq!(display.patterns[1], BLANK);
        assert_eq!(display.patterns[3], BLANK);

        for mut pin in display.digit_pins {
            pin.done();
        }
        for mut pin in display.segment_pins {
            pin.done();
        }
    }
}
