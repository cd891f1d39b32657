//! Maps decimal digits onto 7-segment bit patterns.

/// On/off states for one display position.
/// Segment order: A, B, C, D, E, F, G, decimal point.
pub type DigitPattern = [bool; 8];

/// Pattern with every segment off.
pub const BLANK: DigitPattern = [false; 8];

// 7-segment bitmasks
const DIGIT_PATTERNS: [DigitPattern; 10] = [
    [true, true, true, true, true, true, false, false],
    [false, true, true, false, false, false, false, false],
    [true, true, false, true, true, false, true, false],
    [true, true, true, true, false, false, true, false],
    [false, true, true, false, false, true, true, false],
    [true, false, true, true, false, true, true, false],
    [true, false, true, true, true, true, true, false],
    [true, true, true, false, false, false, false, false],
    [true, true, true, true, true, true, true, false],
    [true, true, true, false, false, true, true, false],
];

/// A decimal digit, guaranteed to be in 0..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digit(u8);

/// Returned when a value outside 0..=9 is offered as a digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDigit(pub u8);

impl Digit {
    /// Checks the value against the digit range
    /// param value: candidate value
    /// returns: the digit, or InvalidDigit if value > 9
    pub fn new(value: u8) -> Result<Digit, InvalidDigit> {
        if value <= 9 {
            Ok(Digit(value))
        } else {
            Err(InvalidDigit(value))
        }
    }

    /// Gets the numeric value back out
    pub fn value(self) -> u8 {
        self.0
    }

    /// Looks up the segment pattern for this digit
    pub fn pattern(self) -> DigitPattern {
        DIGIT_PATTERNS[self.0 as usize]
    }
}

/// Encodes a raw value into a segment pattern
/// param value: decimal digit 0..=9
/// returns: the pattern, or InvalidDigit for anything else
pub fn encode(value: u8) -> Result<DigitPattern, InvalidDigit> {
    Ok(Digit::new(value)?.pattern())
}

/// Splits a value into its tens and ones digits.
/// The value is reduced modulo 100 first, so both digits are always
/// representable and the display path cannot hit InvalidDigit.
pub fn split_tens_ones(value: u8) -> (Digit, Digit) {
    let value = value % 100;
    (Digit(value / 10), Digit(value % 10))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_digit_matches_the_table() {
        for value in 0..=9u8 {
            let digit = Digit::new(value).unwrap();
            assert_eq!(digit.value(), value);
            assert_eq!(digit.pattern(), DIGIT_PATTERNS[value as usize]);
        }
    }

    #[test]
    fn encode_known_patterns() {
        // 0: all outer segments, no middle bar, no point
        assert_eq!(
            encode(0).unwrap(),
            [true, true, true, true, true, true, false, false]
        );
        // 8: everything but the point
        assert_eq!(
            encode(8).unwrap(),
            [true, true, true, true, true, true, true, false]
        );
        // 1: right-hand segments only
        assert_eq!(
            encode(1).unwrap(),
            [false, true, true, false, false, false, false, false]
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(encode(10), Err(InvalidDigit(10)));
        assert_eq!(encode(255), Err(InvalidDigit(255)));
        assert_eq!(Digit::new(42), Err(InvalidDigit(42)));
    }

    #[test]
    fn split_covers_two_digit_values() {
        let (tens, ones) = split_tens_ones(72);
        assert_eq!((tens.value(), ones.value()), (7, 2));

        let (tens, ones) = split_tens_ones(5);
        assert_eq!((tens.value(), ones.value()), (0, 5));
    }

    #[test]
    fn split_reduces_modulo_100() {
        // 103F shows as "03": the display only has two positions per value
        let (tens, ones) = split_tens_ones(103);
        assert_eq!((tens.value(), ones.value()), (0, 3));
    }
}
