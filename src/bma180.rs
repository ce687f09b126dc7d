//! BMA180 triaxial accelerometer driver.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::ErrorType;

use crate::config::DeviceSettings;
use crate::device::ExternalDevice;
use crate::error::{Error, Result};
use crate::interface::BusHandle;
use crate::params::{Axis, ClockDivider};
use crate::registers::bma180::{
    acc_lsb,
    acc_msb,
    CtrlReg0,
    CtrlReg3,
    DIS_I2C,
    DUMMY_BYTE,
    EE_W,
    EXPECTED_CHIP_ID,
    MAX_REGISTER,
    READ_FLAG,
    REG_CHIP_ID,
    REG_SOFT_RESET,
    RESET_INT,
    SOFT_RESET_COMMAND,
};
use crate::registers::{Register, RegisterBit};

// Time the chip needs after a soft reset before it answers again (milliseconds).
const SOFT_RESET_DELAY_MS: u32 = 10;

/// Driver for an SPI-attached BMA180.
///
/// Runs the bus in mode 0: the datasheet suggests mode 2, but mode 0 is the
/// one that works with this chip in practice.
pub struct Bma180<H, CS> {
    device: ExternalDevice<H, CS>,
}

impl<H, CS> Bma180<H, CS> {
    /// Bus settings used by this device.
    pub fn settings(&self) -> &DeviceSettings {
        self.device.settings()
    }

    /// Consumes the driver and returns the bus handle and chip-select pin.
    pub fn release(self) -> (H, CS) {
        self.device.release()
    }
}

impl<H, CS, SpiE> Bma180<H, CS>
where
    H: BusHandle,
    H::Bus: ErrorType<Error = SpiE>,
    CS: OutputPin,
{
    // ==================================================================
    // == Driver Construction ===========================================
    // ==================================================================
    /// Creates a driver clocked at the default `f/4`.
    pub fn new(bus: H, cs: CS) -> Result<Self, SpiE> {
        Self::with_divider(bus, cs, ClockDivider::Div4)
    }

    /// Creates a driver with an explicit SCK divider.
    pub fn with_divider(bus: H, cs: CS, divider: ClockDivider) -> Result<Self, SpiE> {
        let device = ExternalDevice::new(bus, cs, DeviceSettings::mode0(divider))?;
        Ok(Self { device })
    }

    // ==================================================================
    // == Raw Register Access ===========================================
    // ==================================================================
    /// Reads one register.
    pub fn read_byte(&mut self, address: u8) -> Result<u8, SpiE> {
        Self::check_address(address)?;

        self.device.transaction(|dev| {
            dev.exchange(address | READ_FLAG)?;
            dev.exchange(DUMMY_BYTE)
        })
    }

    /// Writes one register.
    pub fn write_byte(&mut self, address: u8, value: u8) -> Result<(), SpiE> {
        Self::check_address(address)?;

        self.device.transaction(|dev| {
            dev.exchange(address)?;
            dev.exchange(value)?;
            Ok(())
        })
    }

    /// Sets or clears one bit of a register, leaving the others untouched.
    ///
    /// This is a read followed by a write; it is not atomic.
    pub fn write_register_bit(&mut self, address: u8, bit: u8, value: bool) -> Result<(), SpiE> {
        self.write_bit(RegisterBit::new(address, bit), value)
    }

    /// [`write_register_bit`](Self::write_register_bit) for a table descriptor.
    pub fn write_bit(&mut self, target: RegisterBit, value: bool) -> Result<(), SpiE> {
        Self::check_address(target.register)?;
        if target.mask().is_none() {
            return Err(Error::InvalidBit);
        }

        let current = self.read_byte(target.register)?;
        let updated = target.apply(current, value).ok_or(Error::InvalidBit)?;
        self.write_byte(target.register, updated)
    }

    // ==================================================================
    // == Identification & Reset ========================================
    // ==================================================================
    /// Reads the hard-wired chip ID.
    pub fn chip_id(&mut self) -> Result<u8, SpiE> {
        self.read_byte(REG_CHIP_ID)
    }

    /// Verifies the chip ID; a mismatch usually means a wiring problem.
    pub fn check_chip_id(&mut self) -> Result<(), SpiE> {
        let id = self.chip_id()?;
        if id != EXPECTED_CHIP_ID {
            warn!("BMA180 chip id mismatch: {=u8:#x}", id);
            return Err(Error::DeviceIdMismatch);
        }

        Ok(())
    }

    /// Clears a latched interrupt.
    pub fn reset_interrupt(&mut self) -> Result<(), SpiE> {
        self.write_bit(RESET_INT, true)
    }

    /// Issues a soft reset and blocks until the chip is back.
    pub fn soft_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), SpiE> {
        debug!("BMA180 soft reset");
        self.write_byte(REG_SOFT_RESET, SOFT_RESET_COMMAND)?;
        delay.delay_ms(SOFT_RESET_DELAY_MS);
        Ok(())
    }

    // ==================================================================
    // == Data Acquisition ==============================================
    // ==================================================================
    #[inline]
    fn unpack_axis(msb: u8, lsb: u8) -> i16 {
        // 14-bit left-justified two's complement; `>>` on i16 keeps the sign.
        i16::from_be_bytes([msb, lsb]) >> 2
    }

    /// Reads one axis as a signed 14-bit value.
    ///
    /// Assumes the chip is configured for 14-bit readings.
    pub fn read_acceleration(&mut self, axis: Axis) -> Result<i16, SpiE> {
        let lsb = self.read_byte(acc_lsb(axis.index()))?;
        let msb = self.read_byte(acc_msb(axis.index()))?;
        Ok(Self::unpack_axis(msb, lsb))
    }

    /// Reads X, Y and Z in that order.
    pub fn read_xyz(&mut self) -> Result<[i16; 3], SpiE> {
        let mut out = [0i16; 3];
        for (slot, axis) in out.iter_mut().zip(Axis::ALL) {
            *slot = self.read_acceleration(axis)?;
        }
        Ok(out)
    }

    // ==================================================================
    // == Control Registers =============================================
    // ==================================================================
    /// Returns a snapshot of `CTRL_REG0`.
    pub fn ctrl_reg0(&mut self) -> Result<CtrlReg0, SpiE> {
        self.read_reg()
    }

    /// Returns a snapshot of `CTRL_REG3`.
    pub fn ctrl_reg3(&mut self) -> Result<CtrlReg3, SpiE> {
        self.read_reg()
    }

    /// Unlocks or locks writes to the EEPROM image registers.
    pub fn set_ee_write(&mut self, enabled: bool) -> Result<(), SpiE> {
        self.write_bit(EE_W, enabled)
    }

    /// Disables or re-enables the I2C interface.
    pub fn set_i2c_disabled(&mut self, disabled: bool) -> Result<(), SpiE> {
        self.write_bit(DIS_I2C, disabled)
    }

    /// Updates the interrupt enables in `CTRL_REG3`.
    pub fn configure_interrupts(
        &mut self,
        latched: Option<bool>,
        new_data: Option<bool>,
        advanced: Option<bool>,
        tap_sense: Option<bool>,
        low_g: Option<bool>,
    ) -> Result<(), SpiE> {
        self.update_reg(|reg: &mut CtrlReg3| {
            if let Some(enabled) = latched {
                reg.set_lat_int(enabled);
            }

            if let Some(enabled) = new_data {
                reg.set_new_data_int(enabled);
            }

            if let Some(enabled) = advanced {
                reg.set_adv_int(enabled);
            }

            if let Some(enabled) = tap_sense {
                reg.set_tapsens_int(enabled);
            }

            if let Some(enabled) = low_g {
                reg.set_low_int(enabled);
            }
        })
    }

    // ==================================================================
    // == Internal Helpers ==============================================
    // ==================================================================
    fn check_address(address: u8) -> Result<(), SpiE> {
        if address > MAX_REGISTER {
            return Err(Error::InvalidRegister);
        }

        Ok(())
    }

    fn read_reg<R: Register>(&mut self) -> Result<R, SpiE> {
        self.read_byte(R::ADDRESS).map(R::from)
    }

    fn update_reg<R, F>(&mut self, mutate: F) -> Result<(), SpiE>
    where
        R: Register,
        F: FnOnce(&mut R),
    {
        let current = self.read_byte(R::ADDRESS)?;

        let mut reg = R::from(current);
        mutate(&mut reg);

        let updated: u8 = reg.into();
        if updated != current {
            self.write_byte(R::ADDRESS, updated)?;
        }

        Ok(())
    }
}
