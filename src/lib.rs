#![cfg_attr(not(test), no_std)]

//! # pico-thermometer
//! ## A DHT11 thermometer with a 4-digit 7-segment display, in Rust
//!
//! Features:
//! - Single-wire DHT11 protocol decoding with checksum validation
//! - Time-multiplexed 7-segment display driving
//! - Button-triggered readings with a minimum-interval debounce
//! - Temperature shown in Fahrenheit, relative humidity in percent
//!
//! The library is written against `embedded-hal` pin and delay traits, so
//! it builds and tests on the host; the RP2040 firmware entry point lives
//! in `main.rs` behind the `rp2040` feature.

pub mod dht;
pub mod display;
pub mod segments;
pub mod service;
pub mod trigger;
