//! Register maps for the supported chips.

pub mod bma180;
pub mod cc2500;

/// Metadata exposed by every typed register view.
pub trait Register: From<u8> + Into<u8> + Copy {
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
}

/// A single bit inside an 8-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterBit {
    /// Register address.
    pub register: u8,
    /// Bit index, 0 is the least significant bit.
    pub bit: u8,
}

impl RegisterBit {
    /// Pairs a register with one of its bits.
    pub const fn new(register: u8, bit: u8) -> Self {
        Self { register, bit }
    }

    /// Mask selecting this bit, or `None` if the index does not fit a byte.
    pub const fn mask(self) -> Option<u8> {
        if self.bit < 8 { Some(1 << self.bit) } else { None }
    }

    /// Returns `value` with this bit set or cleared.
    pub const fn apply(self, value: u8, set: bool) -> Option<u8> {
        match self.mask() {
            Some(mask) if set => Some(value | mask),
            Some(mask) => Some(value & !mask),
            None => None,
        }
    }
}
