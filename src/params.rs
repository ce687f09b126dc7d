//! Strongly typed parameter enumerations shared by the bus layer and drivers.
//!
//! The bus parameters map onto the classic AVR `SPCR`/`SPSR` encodings so a
//! [`ConfigurableBus`](crate::interface::ConfigurableBus) implementation for
//! such a peripheral can program them directly.
//!
//! # Examples
//!
//! ```rust
//! use spi_ext_devices::params::{Axis, BitOrder, ClockDivider};
//!
//! assert_eq!(ClockDivider::Div16.divisor(), 16);
//! assert_eq!(BitOrder::default(), BitOrder::MsbFirst);
//! assert_eq!(Axis::Z.index(), 2);
//! ```

use modular_bitfield::prelude::Specifier;

/// SPI clock divider relative to the bus peripheral's input clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ClockDivider {
    /// f/4.
    #[default]
    Div4 = 0x00,
    /// f/16.
    Div16 = 0x01,
    /// f/64.
    Div64 = 0x02,
    /// f/128.
    Div128 = 0x03,
    /// f/2.
    Div2 = 0x04,
    /// f/8.
    Div8 = 0x05,
    /// f/32.
    Div32 = 0x06,
}

impl ClockDivider {
    /// Returns the integer divisor applied to the input clock.
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div2 => 2,
            Self::Div4 => 4,
            Self::Div8 => 8,
            Self::Div16 => 16,
            Self::Div32 => 32,
            Self::Div64 => 64,
            Self::Div128 => 128,
        }
    }

    /// Returns the resulting SCK frequency for the given input clock.
    pub const fn sck_hz(self, input_hz: u32) -> u32 {
        input_hz / self.divisor()
    }

    /// Raw 3-bit encoding: bits 1:0 are `SPR1:SPR0`, bit 2 is `SPI2X`.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Value of the `SPR1:SPR0` clock-rate field.
    pub const fn rate_bits(self) -> u8 {
        self.bits() & 0x03
    }

    /// Whether the double-speed (`SPI2X`) bit is set.
    pub const fn double_speed(self) -> bool {
        (self.bits() >> 2) & 0x01 != 0
    }
}

/// Order in which the bits of every byte are shifted out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first.
    #[default]
    MsbFirst,
    /// Least significant bit first.
    LsbFirst,
}

/// Accelerometer axis selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Axis {
    /// X axis.
    X = 0,
    /// Y axis.
    Y = 1,
    /// Z axis.
    Z = 2,
}

impl Axis {
    /// All axes in register order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Zero-based axis index.
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Main radio control state reported in the CC2500 status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[bits = 3]
pub enum RadioState {
    /// Idle state.
    Idle = 0b000,
    /// Receive mode.
    Rx = 0b001,
    /// Transmit mode.
    Tx = 0b010,
    /// Fast TX ready.
    FsTxOn = 0b011,
    /// Frequency synthesizer calibration is running.
    Calibrate = 0b100,
    /// PLL is settling.
    Settling = 0b101,
    /// RX FIFO has overflowed.
    RxFifoOverflow = 0b110,
    /// TX FIFO has underflowed.
    TxFifoUnderflow = 0b111,
}
