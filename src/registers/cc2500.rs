//! Register map definitions for the CC2500 transceiver.
//!
//! Every SPI access starts with a header byte: the 6-bit address plus one of
//! the access offsets below. Addresses `0x30..=0x3D` are command strobes when
//! accessed without the burst bit and status registers when read with it.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::RadioState;

/// GDO2 output pin configuration.
pub const REG_IOCFG2: u8 = 0x00;
/// GDO1 output pin configuration.
pub const REG_IOCFG1: u8 = 0x01;
/// GDO0 output pin configuration.
pub const REG_IOCFG0: u8 = 0x02;
/// RX FIFO and TX FIFO thresholds.
pub const REG_FIFOTHR: u8 = 0x03;
/// Sync word, high byte.
pub const REG_SYNC1: u8 = 0x04;
/// Sync word, low byte.
pub const REG_SYNC0: u8 = 0x05;
/// Packet length.
pub const REG_PKTLEN: u8 = 0x06;
/// Packet automation control.
pub const REG_PKTCTRL1: u8 = 0x07;
/// Packet automation control.
pub const REG_PKTCTRL0: u8 = 0x08;
/// Device address.
pub const REG_ADDR: u8 = 0x09;
/// Channel number.
pub const REG_CHANNR: u8 = 0x0A;
/// Frequency synthesizer control.
pub const REG_FSCTRL1: u8 = 0x0B;
/// Frequency synthesizer control.
pub const REG_FSCTRL0: u8 = 0x0C;
/// Frequency control word, high byte.
pub const REG_FREQ2: u8 = 0x0D;
/// Frequency control word, middle byte.
pub const REG_FREQ1: u8 = 0x0E;
/// Frequency control word, low byte.
pub const REG_FREQ0: u8 = 0x0F;
/// Modem configuration.
pub const REG_MDMCFG4: u8 = 0x10;
/// Modem configuration.
pub const REG_MDMCFG3: u8 = 0x11;
/// Modem configuration.
pub const REG_MDMCFG2: u8 = 0x12;
/// Modem configuration.
pub const REG_MDMCFG1: u8 = 0x13;
/// Modem configuration.
pub const REG_MDMCFG0: u8 = 0x14;
/// Modem deviation setting.
pub const REG_DEVIATN: u8 = 0x15;
/// Main radio control state machine configuration.
pub const REG_MCSM2: u8 = 0x16;
/// Main radio control state machine configuration.
pub const REG_MCSM1: u8 = 0x17;
/// Main radio control state machine configuration.
pub const REG_MCSM0: u8 = 0x18;
/// Frequency offset compensation configuration.
pub const REG_FOCCFG: u8 = 0x19;
/// Bit synchronization configuration.
pub const REG_BSCFG: u8 = 0x1A;
/// AGC control.
pub const REG_AGCCTRL2: u8 = 0x1B;
/// AGC control.
pub const REG_AGCCTRL1: u8 = 0x1C;
/// AGC control.
pub const REG_AGCCTRL0: u8 = 0x1D;
/// High byte of the event 0 timeout.
pub const REG_WOREVT1: u8 = 0x1E;
/// Low byte of the event 0 timeout.
pub const REG_WOREVT0: u8 = 0x1F;
/// Wake-on-radio control.
pub const REG_WORCTRL: u8 = 0x20;
/// Front end RX configuration.
pub const REG_FREND1: u8 = 0x21;
/// Front end TX configuration.
pub const REG_FREND0: u8 = 0x22;
/// Frequency synthesizer calibration.
pub const REG_FSCAL3: u8 = 0x23;
/// Frequency synthesizer calibration.
pub const REG_FSCAL2: u8 = 0x24;
/// Frequency synthesizer calibration.
pub const REG_FSCAL1: u8 = 0x25;
/// Frequency synthesizer calibration.
pub const REG_FSCAL0: u8 = 0x26;
/// RC oscillator configuration.
pub const REG_RCCTRL1: u8 = 0x27;
/// RC oscillator configuration.
pub const REG_RCCTRL0: u8 = 0x28;
/// Frequency synthesizer calibration control.
pub const REG_FSTEST: u8 = 0x29;
/// Production test.
pub const REG_PTEST: u8 = 0x2A;
/// AGC test.
pub const REG_AGCTEST: u8 = 0x2B;
/// Various test settings.
pub const REG_TEST2: u8 = 0x2C;
/// Various test settings.
pub const REG_TEST1: u8 = 0x2D;
/// Various test settings.
pub const REG_TEST0: u8 = 0x2E;

/// Last configuration register.
pub const LAST_CONFIG_REGISTER: u8 = REG_TEST0;

/// Chip part number.
pub const REG_PARTNUM: u8 = 0x30;
/// Chip version.
pub const REG_VERSION: u8 = 0x31;
/// Frequency offset estimate from the demodulator.
pub const REG_FREQEST: u8 = 0x32;
/// Demodulator estimate for link quality.
pub const REG_LQI: u8 = 0x33;
/// Received signal strength indication.
pub const REG_RSSI: u8 = 0x34;
/// Main radio control state machine state.
pub const REG_MARCSTATE: u8 = 0x35;
/// High byte of the WOR timer.
pub const REG_WORTIME1: u8 = 0x36;
/// Low byte of the WOR timer.
pub const REG_WORTIME0: u8 = 0x37;
/// Current GDOx status and packet status.
pub const REG_PKTSTATUS: u8 = 0x38;
/// Current setting from the PLL calibration module.
pub const REG_VCO_VC_DAC: u8 = 0x39;
/// Underflow flag and number of bytes in the TX FIFO.
pub const REG_TXBYTES: u8 = 0x3A;
/// Overflow flag and number of bytes in the RX FIFO.
pub const REG_RXBYTES: u8 = 0x3B;

/// First status register.
pub const FIRST_STATUS_REGISTER: u8 = REG_PARTNUM;
/// Last status register.
pub const LAST_STATUS_REGISTER: u8 = 0x3D;

/// Power amplifier control table.
pub const REG_PATABLE: u8 = 0x3E;
/// TX FIFO on writes, RX FIFO on reads.
pub const REG_FIFO: u8 = 0x3F;

/// Highest address encodable in the 6-bit header field.
pub const MAX_REGISTER: u8 = 0x3F;

/// Header offset for single-byte writes.
pub const WRITE_SINGLE: u8 = 0x00;
/// Header offset for burst writes.
pub const WRITE_BURST: u8 = 0x40;
/// Header offset for single-byte reads.
pub const READ_SINGLE: u8 = 0x80;
/// Header offset for burst reads.
pub const READ_BURST: u8 = 0xC0;

/// Size of each of the RX and TX FIFOs in bytes.
pub const FIFO_SIZE: usize = 64;
/// Number of PATABLE entries.
pub const PATABLE_SIZE: usize = 8;

/// Expected `PARTNUM` value.
pub const EXPECTED_PARTNUM: u8 = 0x80;

/// `IOCFGx[6]` inverts the GDOx output.
pub const GDO_INV: u8 = 0x40;

/// Command strobes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Strobe {
    /// Reset chip.
    Sres = 0x30,
    /// Enable and calibrate frequency synthesizer.
    Sfstxon = 0x31,
    /// Turn off crystal oscillator.
    Sxoff = 0x32,
    /// Calibrate frequency synthesizer and turn it off.
    Scal = 0x33,
    /// Enable RX.
    Srx = 0x34,
    /// Enable TX.
    Stx = 0x35,
    /// Exit RX/TX and turn off the frequency synthesizer.
    Sidle = 0x36,
    /// Start automatic RX polling (wake-on-radio).
    Swor = 0x38,
    /// Enter power down mode when CSn goes high.
    Spwd = 0x39,
    /// Flush the RX FIFO.
    Sfrx = 0x3A,
    /// Flush the TX FIFO.
    Sftx = 0x3B,
    /// Reset the real time clock.
    Sworrst = 0x3C,
    /// No operation; returns the status byte.
    Snop = 0x3D,
}

impl Strobe {
    /// Header byte for this strobe.
    pub const fn opcode(self) -> u8 {
        self as u8
    }
}

/// Chip status byte returned on SO with every header byte.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipStatus {
    // FIFO bytes available, saturating at 15 (bits 3:0).
    pub fifo_bytes_available: B4,
    // Main radio control state (bits 6:4).
    pub state: RadioState,
    // Crystal not yet running (bit 7).
    pub chip_not_ready: bool,
}

impl From<u8> for ChipStatus {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<ChipStatus> for u8 {
    fn from(value: ChipStatus) -> Self {
        value.into_bytes()[0]
    }
}
