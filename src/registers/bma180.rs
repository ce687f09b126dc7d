//! Register map definitions for the BMA180 accelerometer.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use super::{Register, RegisterBit};

/// Register address of `CHIP_ID`.
pub const REG_CHIP_ID: u8 = 0x00;
/// Register address of `ACC_X_LSB`; Y and Z follow at +2 and +4.
pub const REG_ACC_LSB: u8 = 0x02;
/// Register address of `ACC_X_MSB`; Y and Z follow at +2 and +4.
pub const REG_ACC_MSB: u8 = 0x03;
/// Register address of `CTRL_REG0`.
pub const REG_CTRL_REG0: u8 = 0x0D;
/// Register address of `SOFT_RESET`.
pub const REG_SOFT_RESET: u8 = 0x10;
/// Register address of `CTRL_REG3`.
pub const REG_CTRL_REG3: u8 = 0x21;
/// Register address of `HIGH_DUR`.
pub const REG_HIGH_DUR: u8 = 0x27;
/// Register address of `TAPSENS_TH`.
pub const REG_TAPSENS_TH: u8 = 0x28;
/// Register address of `SLOPE_TH`.
pub const REG_SLOPE_TH: u8 = 0x2B;
/// Register address of `GAIN_T`.
pub const REG_GAIN_T: u8 = 0x31;

/// Highest register address; bit 7 of the address byte is the R/W flag.
pub const MAX_REGISTER: u8 = 0x7F;
/// Set in the address byte for reads, clear for writes.
pub const READ_FLAG: u8 = 0x80;
/// Byte clocked out while reading a register.
pub const DUMMY_BYTE: u8 = 0x55;

/// Value hard-wired into `CHIP_ID`; useful for checking the SPI wiring.
pub const EXPECTED_CHIP_ID: u8 = 0x03;
/// Value written to `SOFT_RESET` to reset the chip.
pub const SOFT_RESET_COMMAND: u8 = 0xB6;

/// `CTRL_REG0[4]` unlocks writes to the EEPROM image registers.
pub const EE_W: RegisterBit = RegisterBit::new(REG_CTRL_REG0, 4);
/// `CTRL_REG0[6]` clears a latched interrupt.
pub const RESET_INT: RegisterBit = RegisterBit::new(REG_CTRL_REG0, 6);
/// `HIGH_DUR[0]` disables the I2C interface.
pub const DIS_I2C: RegisterBit = RegisterBit::new(REG_HIGH_DUR, 0);
/// `CTRL_REG3[0]` latches interrupts until reset.
pub const LAT_INT: RegisterBit = RegisterBit::new(REG_CTRL_REG3, 0);
/// `CTRL_REG3[1]` enables the new-data interrupt.
pub const NEW_DATA_INT: RegisterBit = RegisterBit::new(REG_CTRL_REG3, 1);
/// `CTRL_REG3[2]` enables the advanced interrupt.
pub const ADV_INT: RegisterBit = RegisterBit::new(REG_CTRL_REG3, 2);
/// `CTRL_REG3[3]` enables the tap-sensing interrupt.
pub const TAPSENS_INT: RegisterBit = RegisterBit::new(REG_CTRL_REG3, 3);
/// `CTRL_REG3[4]` enables the low-g interrupt.
pub const LOW_INT: RegisterBit = RegisterBit::new(REG_CTRL_REG3, 4);

/// Bitfield representation of the `CTRL_REG0` register (address `0x0D`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtrlReg0 {
    // Disable wake-up mode (bit 0).
    pub dis_wake_up: bool,
    // Sleep mode (bit 1).
    pub sleep: bool,
    // Self-test bits (bits 3:2).
    pub self_test: B2,
    // EEPROM image write enable (bit 4).
    pub ee_w: bool,
    // Reload image from EEPROM (bit 5).
    pub update_image: bool,
    // Reset latched interrupt (bit 6).
    pub reset_int: bool,
    #[skip]
    __: B1,
}

impl From<u8> for CtrlReg0 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<CtrlReg0> for u8 {
    fn from(value: CtrlReg0) -> Self {
        value.into_bytes()[0]
    }
}

impl Register for CtrlReg0 {
    const ADDRESS: u8 = REG_CTRL_REG0;
}

/// Bitfield representation of the `CTRL_REG3` register (address `0x21`).
///
/// Only the interrupt enables driven by this crate are exposed; the upper
/// bits are preserved on read-modify-write.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtrlReg3 {
    pub lat_int: bool,
    pub new_data_int: bool,
    pub adv_int: bool,
    pub tapsens_int: bool,
    pub low_int: bool,
    #[skip]
    __: B3,
}

impl From<u8> for CtrlReg3 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<CtrlReg3> for u8 {
    fn from(value: CtrlReg3) -> Self {
        value.into_bytes()[0]
    }
}

impl Register for CtrlReg3 {
    const ADDRESS: u8 = REG_CTRL_REG3;
}

/// Address of the low byte of `axis`.
pub const fn acc_lsb(axis: u8) -> u8 {
    REG_ACC_LSB + 2 * axis
}

/// Address of the high byte of `axis`.
pub const fn acc_msb(axis: u8) -> u8 {
    REG_ACC_MSB + 2 * axis
}
