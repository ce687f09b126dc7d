//! CC2500 2.4 GHz transceiver driver.
//!
//! The chip drives its SO line high after chip-select is asserted until the
//! crystal oscillator is stable, so every transaction polls that line before
//! clocking any data. The poll is bounded by [`ReadyWait`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::ErrorType;

use crate::config::{DeviceSettings, ReadyWait};
use crate::device::ExternalDevice;
use crate::error::{Error, Result};
use crate::interface::BusHandle;
use crate::params::ClockDivider;
use crate::registers::cc2500::{
    ChipStatus,
    Strobe,
    EXPECTED_PARTNUM,
    FIFO_SIZE,
    FIRST_STATUS_REGISTER,
    LAST_STATUS_REGISTER,
    MAX_REGISTER,
    PATABLE_SIZE,
    READ_BURST,
    READ_SINGLE,
    REG_FIFO,
    REG_PARTNUM,
    REG_PATABLE,
    REG_RXBYTES,
    REG_TXBYTES,
    REG_VERSION,
    WRITE_BURST,
    WRITE_SINGLE,
};

// Chip-select low pulse at the start of a manual reset (microseconds).
const RESET_PULSE_US: u32 = 1;
// Chip-select must then stay high for at least 40 us.
const RESET_HOLD_US: u32 = 41;
// Byte clocked out while reading.
const DUMMY_BYTE: u8 = 0x00;
// Byte count field of TXBYTES/RXBYTES; bit 7 flags under/overflow.
const FIFO_BYTES_MASK: u8 = 0x7F;

/// Driver for an SPI-attached CC2500.
///
/// `ready` is an input connected to the same net as MISO (SO).
pub struct Cc2500<H, CS, RDY> {
    device: ExternalDevice<H, CS>,
    ready: RDY,
    wait: ReadyWait,
}

impl<H, CS, RDY> Cc2500<H, CS, RDY> {
    /// Bus settings used by this device.
    pub fn settings(&self) -> &DeviceSettings {
        self.device.settings()
    }

    /// Active ready-wait policy.
    pub fn ready_wait(&self) -> ReadyWait {
        self.wait
    }

    /// Consumes the driver and returns the bus handle, chip-select and ready pins.
    pub fn release(self) -> (H, CS, RDY) {
        let (bus, cs) = self.device.release();
        (bus, cs, self.ready)
    }
}

impl<H, CS, RDY, SpiE> Cc2500<H, CS, RDY>
where
    H: BusHandle,
    H::Bus: ErrorType<Error = SpiE>,
    CS: OutputPin,
    RDY: InputPin,
{
    // ==================================================================
    // == Driver Construction ===========================================
    // ==================================================================
    /// Creates a driver clocked at `f/4` with the default ready-wait budget.
    pub fn new(bus: H, cs: CS, ready: RDY) -> Result<Self, SpiE> {
        Self::with_config(bus, cs, ready, ClockDivider::Div4, ReadyWait::default())
    }

    /// Creates a driver with an explicit SCK divider and ready-wait policy.
    pub fn with_config(
        bus: H,
        cs: CS,
        ready: RDY,
        divider: ClockDivider,
        wait: ReadyWait,
    ) -> Result<Self, SpiE> {
        wait.validate().map_err(|_| Error::InvalidConfig)?;

        // CPOL=0, CPHA=0: SCK idles low, data sampled on the rising edge.
        let device = ExternalDevice::new(bus, cs, DeviceSettings::mode0(divider))?;
        Ok(Self {
            device,
            ready,
            wait,
        })
    }

    // ==================================================================
    // == Reset =========================================================
    // ==================================================================
    /// Manual power-on reset: pulse chip-select, hold it high, then strobe `SRES`.
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), SpiE> {
        debug!("CC2500 manual reset");

        self.device.select()?;
        delay.delay_us(RESET_PULSE_US);

        self.device.deselect()?;
        delay.delay_us(RESET_HOLD_US);

        self.send_strobe_command(Strobe::Sres.opcode())?;
        Ok(())
    }

    // ==================================================================
    // == Command Primitives ============================================
    // ==================================================================
    /// Sends one byte and returns the byte received with it.
    pub fn send_byte(&mut self, data: u8) -> Result<u8, SpiE> {
        self.transaction(|dev| dev.exchange(data))
    }

    /// Sends a header byte followed by one data byte; returns the byte received with the data.
    ///
    /// Used for single register reads (with dummy data) and writes.
    pub fn send_command(&mut self, command: u8, data: u8) -> Result<u8, SpiE> {
        self.transaction(|dev| {
            dev.exchange(command)?;
            dev.exchange(data)
        })
    }

    /// Sends a strobe that needs no data; returns the chip status byte.
    pub fn send_strobe_command(&mut self, command: u8) -> Result<u8, SpiE> {
        self.send_byte(command)
    }

    /// Sends a burst header, then exchanges `data` in place, first byte first.
    ///
    /// The caller sets the burst bit in `command`. Returns the last byte
    /// received, or `0` when `data` is empty.
    pub fn send_burst_command(&mut self, command: u8, data: &mut [u8]) -> Result<u8, SpiE> {
        self.transaction(|dev| {
            dev.exchange(command)?;

            let mut last = 0;
            for byte in data.iter_mut() {
                last = dev.exchange(*byte)?;
                *byte = last;
            }
            Ok(last)
        })
    }

    // ==================================================================
    // == Register Access ===============================================
    // ==================================================================
    /// Reads a configuration register.
    pub fn read_register(&mut self, register: u8) -> Result<u8, SpiE> {
        Self::check_register(register)?;
        self.send_command(register | READ_SINGLE, DUMMY_BYTE)
    }

    /// Writes a configuration register.
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), SpiE> {
        Self::check_register(register)?;
        self.send_command(register | WRITE_SINGLE, value)?;
        Ok(())
    }

    /// Reads a status register (`0x30..=0x3D`).
    ///
    /// Status registers share addresses with the strobes and must be read
    /// with the burst bit set.
    pub fn read_status_register(&mut self, register: u8) -> Result<u8, SpiE> {
        if !(FIRST_STATUS_REGISTER..=LAST_STATUS_REGISTER).contains(&register) {
            return Err(Error::InvalidRegister);
        }

        self.send_command(register | READ_BURST, DUMMY_BYTE)
    }

    /// Reads consecutive registers starting at `register` into `buf`.
    pub fn read_burst(&mut self, register: u8, buf: &mut [u8]) -> Result<(), SpiE> {
        Self::check_register(register)?;
        if buf.is_empty() {
            return Ok(());
        }

        buf.fill(DUMMY_BYTE);
        self.send_burst_command(register | READ_BURST, buf)?;
        Ok(())
    }

    /// Writes consecutive registers starting at `register`.
    pub fn write_burst(&mut self, register: u8, data: &[u8]) -> Result<(), SpiE> {
        Self::check_register(register)?;
        if data.is_empty() {
            return Ok(());
        }

        self.transaction(|dev| {
            dev.exchange(register | WRITE_BURST)?;
            for &byte in data {
                dev.exchange(byte)?;
            }
            Ok(())
        })
    }

    // ==================================================================
    // == Strobes & Status ==============================================
    // ==================================================================
    /// Issues a command strobe and decodes the returned status byte.
    pub fn strobe(&mut self, strobe: Strobe) -> Result<ChipStatus, SpiE> {
        trace!("CC2500 strobe {=u8:#x}", strobe.opcode());
        self.send_strobe_command(strobe.opcode()).map(ChipStatus::from)
    }

    /// Reads the chip status byte without side effects.
    pub fn status(&mut self) -> Result<ChipStatus, SpiE> {
        self.strobe(Strobe::Snop)
    }

    /// Reads `PARTNUM`.
    pub fn part_number(&mut self) -> Result<u8, SpiE> {
        self.read_status_register(REG_PARTNUM)
    }

    /// Reads `VERSION`.
    pub fn version(&mut self) -> Result<u8, SpiE> {
        self.read_status_register(REG_VERSION)
    }

    /// Verifies `PARTNUM`; a mismatch usually means a wiring problem.
    pub fn check_part_number(&mut self) -> Result<(), SpiE> {
        let part = self.part_number()?;
        if part != EXPECTED_PARTNUM {
            warn!("CC2500 part number mismatch: {=u8:#x}", part);
            return Err(Error::DeviceIdMismatch);
        }

        Ok(())
    }

    /// Number of bytes waiting in the TX FIFO.
    pub fn tx_bytes(&mut self) -> Result<u8, SpiE> {
        Ok(self.read_status_register(REG_TXBYTES)? & FIFO_BYTES_MASK)
    }

    /// Number of bytes waiting in the RX FIFO.
    pub fn rx_bytes(&mut self) -> Result<u8, SpiE> {
        Ok(self.read_status_register(REG_RXBYTES)? & FIFO_BYTES_MASK)
    }

    // ==================================================================
    // == PATABLE & FIFOs ===============================================
    // ==================================================================
    /// Loads the power amplifier table.
    pub fn write_pa_table(&mut self, entries: &[u8]) -> Result<(), SpiE> {
        if entries.len() > PATABLE_SIZE {
            return Err(Error::InvalidLength);
        }

        self.write_burst(REG_PATABLE, entries)
    }

    /// Queues bytes in the TX FIFO.
    pub fn write_tx_fifo(&mut self, data: &[u8]) -> Result<(), SpiE> {
        if data.len() > FIFO_SIZE {
            return Err(Error::InvalidLength);
        }

        self.write_burst(REG_FIFO, data)
    }

    /// Drains `buf.len()` bytes from the RX FIFO.
    pub fn read_rx_fifo(&mut self, buf: &mut [u8]) -> Result<(), SpiE> {
        if buf.len() > FIFO_SIZE {
            return Err(Error::InvalidLength);
        }

        self.read_burst(REG_FIFO, buf)
    }

    // ==================================================================
    // == Internal Helpers ==============================================
    // ==================================================================
    fn check_register(register: u8) -> Result<(), SpiE> {
        let is_strobe = (FIRST_STATUS_REGISTER..=LAST_STATUS_REGISTER).contains(&register);
        if register > MAX_REGISTER || is_strobe {
            return Err(Error::InvalidRegister);
        }

        Ok(())
    }

    fn wait_ready(&mut self) -> Result<(), SpiE> {
        for _ in 0..self.wait.max_polls {
            if !self.ready.is_high().map_err(Error::pin)? {
                return Ok(());
            }
        }

        warn!("CC2500 not ready after {=u32} polls", self.wait.max_polls);
        Err(Error::DeviceTimeout)
    }

    fn begin(&mut self) -> Result<(), SpiE> {
        self.device.begin()?;

        if let Err(err) = self.wait_ready() {
            if self.device.end().is_err() {
                warn!("CC2500 failed to close transaction after ready wait");
            }
            return Err(err);
        }

        Ok(())
    }

    fn transaction<R, F>(&mut self, f: F) -> Result<R, SpiE>
    where
        F: FnOnce(&mut ExternalDevice<H, CS>) -> Result<R, SpiE>,
    {
        self.begin()?;
        let result = f(&mut self.device);
        let ended = self.device.end();

        let value = result?;
        ended?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Cc2500;
    use crate::config::{DeviceSettings, ReadyWait};
    use crate::error::Error;
    use crate::interface::SpiMaster;
    use crate::params::{ClockDivider, RadioState};
    use crate::registers::cc2500::Strobe;
    use crate::sim::{Event, SimBus, SimDelay, SimPin, SimReady, event_log, exchanges};
    use core::cell::RefCell;
    use embedded_hal::digital::ErrorKind as PinErrorKind;
    use embedded_hal_mock::eh1::MockError;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use std::io;

    #[test]
    fn send_command_waits_for_ready_then_clocks_two_bytes() {
        let expectations = [
            SpiTransaction::transfer_in_place(vec![0x8A], vec![0x0F]),
            SpiTransaction::transfer_in_place(vec![0x00], vec![0x2A]),
            SpiTransaction::flush(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut cs = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let mut ready = PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::Low),
        ]);
        let mut master = SpiMaster::new(spi.clone());

        let mut radio = Cc2500::new(&mut master, cs.clone(), ready.clone()).unwrap();
        assert_eq!(radio.read_register(0x0A).unwrap(), 0x2A);
        drop(radio);

        spi.done();
        cs.done();
        ready.done();
    }

    #[test]
    fn reset_pulses_chip_select_then_strobes_sres() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::echo(&log));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::ready(&log)).unwrap();
        let mut delay = SimDelay::new(&log);
        log.borrow_mut().clear();

        radio.reset(&mut delay).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Cs(false),
                Event::DelayUs(1),
                Event::Cs(true),
                Event::DelayUs(41),
                Event::Configure(DeviceSettings::mode0(ClockDivider::Div4)),
                Event::Cs(false),
                Event::ReadyPoll(false),
                Event::Exchange { out: 0x30, back: 0x30 },
                Event::Flush,
                Event::Cs(true),
            ]
        );
    }

    #[test]
    fn burst_exchanges_buffer_in_place() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::new(&log, |byte| byte.wrapping_add(1)));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::ready(&log)).unwrap();

        let mut buffer = [0x11, 0x22, 0x33];
        let last = radio.send_burst_command(0x7F, &mut buffer).unwrap();

        assert_eq!(buffer, [0x12, 0x23, 0x34]);
        assert_eq!(last, 0x34);
        assert_eq!(
            exchanges(&log),
            vec![(0x7F, 0x80), (0x11, 0x12), (0x22, 0x23), (0x33, 0x34)]
        );
    }

    #[test]
    fn empty_burst_still_sends_header_and_returns_zero() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::echo(&log));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::ready(&log)).unwrap();

        assert_eq!(radio.send_burst_command(0xFF, &mut []).unwrap(), 0);
        assert_eq!(exchanges(&log), vec![(0xFF, 0xFF)]);
    }

    #[test]
    fn busy_chip_is_polled_until_ready() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::scripted(&log, &[0x0F]));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::after(&log, 3)).unwrap();

        assert_eq!(radio.send_byte(0x3D).unwrap(), 0x0F);

        let polls: Vec<bool> = log
            .borrow()
            .iter()
            .filter_map(|event| match *event {
                Event::ReadyPoll(high) => Some(high),
                _ => None,
            })
            .collect();
        assert_eq!(polls, vec![true, true, true, false]);
    }

    #[test]
    fn stuck_ready_line_times_out_and_releases_bus() {
        let log = event_log();
        let shared = RefCell::new(SpiMaster::new(SimBus::echo(&log)));
        let mut radio = Cc2500::with_config(
            &shared,
            SimPin::new(&log),
            SimReady::stuck(&log),
            ClockDivider::Div8,
            ReadyWait::new(5),
        )
        .unwrap();

        assert_eq!(radio.send_strobe_command(0x36), Err(Error::DeviceTimeout));

        let events = log.borrow();
        let polls = events.iter().filter(|e| **e == Event::ReadyPoll(true)).count();
        assert_eq!(polls, 5);
        assert_eq!(events.last(), Some(&Event::Cs(true)));
        assert!(exchanges(&log).is_empty());
        assert!(!shared.borrow().is_open());
    }

    #[test]
    fn ready_line_error_releases_bus() {
        let log = event_log();
        let shared = RefCell::new(SpiMaster::new(SimBus::echo(&log)));
        let mut ready = PinMock::new(&[
            PinTransaction::get(PinState::Low).with_error(MockError::Io(io::ErrorKind::BrokenPipe)),
        ]);
        let mut radio = Cc2500::new(&shared, SimPin::new(&log), ready.clone()).unwrap();
        log.borrow_mut().clear();

        assert_eq!(radio.send_strobe_command(0x36), Err(Error::Pin(PinErrorKind::Other)));

        assert!(exchanges(&log).is_empty());
        assert_eq!(log.borrow().last(), Some(&Event::Cs(true)));
        assert!(!shared.borrow().is_open());

        drop(radio);
        ready.done();
    }

    #[test]
    fn chip_recovers_after_timeout() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::echo(&log));
        let mut ready = SimReady::stuck(&log);
        ready.rearm(10);
        let mut radio = Cc2500::with_config(
            &mut master,
            SimPin::new(&log),
            ready,
            ClockDivider::Div4,
            ReadyWait::new(4),
        )
        .unwrap();

        assert_eq!(radio.send_byte(0x3D), Err(Error::DeviceTimeout));
        assert_eq!(radio.send_byte(0x3D), Err(Error::DeviceTimeout));
        assert_eq!(radio.send_byte(0x3D), Ok(0x3D));
    }

    #[test]
    fn zero_poll_budget_is_rejected() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::echo(&log));
        let result = Cc2500::with_config(
            &mut master,
            SimPin::new(&log),
            SimReady::ready(&log),
            ClockDivider::Div4,
            ReadyWait::new(0),
        );

        assert!(matches!(result, Err(Error::InvalidConfig)));
    }

    #[test]
    fn register_helpers_apply_access_offsets() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::echo(&log));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::ready(&log)).unwrap();

        radio.write_register(0x0D, 0x5D).unwrap();
        radio.read_register(0x0D).unwrap();
        radio.read_status_register(0x35).unwrap();
        radio.write_burst(0x0D, &[0x5D, 0x93]).unwrap();
        let mut regs = [0xAA; 2];
        radio.read_burst(0x0D, &mut regs).unwrap();

        let headers: Vec<u8> = exchanges(&log).iter().map(|&(out, _)| out).collect();
        assert_eq!(
            headers,
            vec![0x0D, 0x5D, 0x8D, 0x00, 0xF5, 0x00, 0x4D, 0x5D, 0x93, 0xCD, 0x00, 0x00]
        );
    }

    #[test]
    fn strobe_addresses_are_rejected_for_single_access() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::echo(&log));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::ready(&log)).unwrap();

        assert_eq!(radio.read_register(0x30), Err(Error::InvalidRegister));
        assert_eq!(radio.write_register(0x40, 0x00), Err(Error::InvalidRegister));
        assert_eq!(radio.read_status_register(0x0D), Err(Error::InvalidRegister));
        assert_eq!(radio.read_status_register(0x3E), Err(Error::InvalidRegister));
        assert!(exchanges(&log).is_empty());
    }

    #[test]
    fn fifo_and_patable_lengths_are_bounded() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::echo(&log));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::ready(&log)).unwrap();

        assert_eq!(radio.write_pa_table(&[0xFE; 9]), Err(Error::InvalidLength));
        assert_eq!(radio.write_tx_fifo(&[0x00; 65]), Err(Error::InvalidLength));
        assert_eq!(radio.read_rx_fifo(&mut [0x00; 65]), Err(Error::InvalidLength));

        radio.write_pa_table(&[0xFE]).unwrap();
        radio.write_tx_fifo(&[0x01, 0x02]).unwrap();
        let mut rx = [0u8; 2];
        radio.read_rx_fifo(&mut rx).unwrap();

        let headers: Vec<u8> = exchanges(&log).iter().map(|&(out, _)| out).collect();
        assert_eq!(headers, vec![0x7E, 0xFE, 0x7F, 0x01, 0x02, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn status_byte_is_decoded() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::scripted(&log, &[0x1F]));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::ready(&log)).unwrap();

        let status = radio.strobe(Strobe::Srx).unwrap();
        assert_eq!(status.state(), RadioState::Rx);
        assert_eq!(status.fifo_bytes_available(), 15);
        assert!(!status.chip_not_ready());
    }

    #[test]
    fn part_number_is_checked() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::scripted(&log, &[0x0F, 0x80, 0x0F, 0x81]));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::ready(&log)).unwrap();

        radio.check_part_number().unwrap();
        assert_eq!(radio.check_part_number(), Err(Error::DeviceIdMismatch));
        assert_eq!(exchanges(&log)[0], (0xF0, 0x0F));
    }

    #[test]
    fn fifo_counts_mask_overflow_flag() {
        let log = event_log();
        let mut master = SpiMaster::new(SimBus::scripted(&log, &[0x0F, 0x85, 0x0F, 0x03]));
        let mut radio = Cc2500::new(&mut master, SimPin::new(&log), SimReady::ready(&log)).unwrap();

        assert_eq!(radio.rx_bytes().unwrap(), 5);
        assert_eq!(radio.tx_bytes().unwrap(), 3);
    }

    #[test]
    fn two_drivers_share_one_bus() {
        use crate::bma180::Bma180;

        let log = event_log();
        let shared = RefCell::new(SpiMaster::new(SimBus::echo(&log)));
        let mut radio = Cc2500::with_config(
            &shared,
            SimPin::new(&log),
            SimReady::ready(&log),
            ClockDivider::Div2,
            ReadyWait::default(),
        )
        .unwrap();
        let mut accel = Bma180::with_divider(&shared, SimPin::new(&log), ClockDivider::Div64).unwrap();
        log.borrow_mut().clear();

        radio.send_strobe_command(0x36).unwrap();
        accel.read_byte(0x00).unwrap();

        let configured: Vec<ClockDivider> = log
            .borrow()
            .iter()
            .filter_map(|event| match *event {
                Event::Configure(settings) => Some(settings.clock_divider),
                _ => None,
            })
            .collect();
        assert_eq!(configured, vec![ClockDivider::Div2, ClockDivider::Div64]);
    }
}
