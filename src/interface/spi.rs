//! Shared SPI master built on top of `embedded-hal` `SpiBus`.

use crate::config::DeviceSettings;
use crate::error::{Error, Result};

use super::ConfigurableBus;

/// Owner of the shared SPI bus peripheral.
///
/// Chip-select lines belong to the devices; the master only tracks whether a
/// transaction is open so that a second `begin` is rejected instead of
/// clobbering the bus configuration mid-transfer.
pub struct SpiMaster<B> {
    bus: B,
    open: bool,
}

impl<B> SpiMaster<B> {
    /// Wraps the bus peripheral.
    pub const fn new(bus: B) -> Self {
        Self { bus, open: false }
    }

    /// Returns `true` while a transaction is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Provides mutable access to the wrapped bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consumes the master and returns the owned bus.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B> SpiMaster<B>
where
    B: ConfigurableBus,
{
    /// Reprograms the bus for `settings` and marks a transaction open.
    pub fn open(&mut self, settings: &DeviceSettings) -> Result<(), B::Error> {
        if self.open {
            warn!("SPI transaction already open");
            return Err(Error::TransactionInProgress);
        }

        self.bus.apply_settings(settings)?;
        self.open = true;
        Ok(())
    }

    /// Shifts one byte out and returns the byte shifted in.
    pub fn exchange(&mut self, byte: u8) -> Result<u8, B::Error> {
        if !self.open {
            return Err(Error::NoTransaction);
        }

        let mut buf = [byte];
        self.bus.transfer_in_place(&mut buf)?;
        Ok(buf[0])
    }

    /// Waits for the last byte to leave the shift register and closes the transaction.
    pub fn close(&mut self) -> Result<(), B::Error> {
        if !self.open {
            return Err(Error::NoTransaction);
        }

        self.open = false;
        self.bus.flush()?;
        Ok(())
    }

    /// Closes the transaction without touching the bus.
    pub(crate) fn abandon(&mut self) {
        self.open = false;
    }
}
