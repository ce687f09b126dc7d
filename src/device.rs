//! Binding of one chip-select line and its bus settings to a logical device.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::ErrorType;

use crate::config::DeviceSettings;
use crate::error::{Error, Result};
use crate::interface::BusHandle;

/// One SPI peripheral chip on the shared bus.
///
/// Chip drivers hold an `ExternalDevice` and sequence register access through
/// [`begin`](Self::begin), [`exchange`](Self::exchange) and [`end`](Self::end),
/// or through the scoped [`transaction`](Self::transaction) bracket.
pub struct ExternalDevice<H, CS> {
    bus: H,
    cs: CS,
    settings: DeviceSettings,
    selected: bool,
}

impl<H, CS> ExternalDevice<H, CS> {
    /// Bus settings applied whenever this device opens a transaction.
    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    /// Returns `true` between `begin` and `end`.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Provides mutable access to the bus handle.
    pub fn bus_mut(&mut self) -> &mut H {
        &mut self.bus
    }

    /// Consumes the device and returns the bus handle and chip-select pin.
    pub fn release(self) -> (H, CS) {
        (self.bus, self.cs)
    }
}

impl<H, CS, SpiE> ExternalDevice<H, CS>
where
    H: BusHandle,
    H::Bus: ErrorType<Error = SpiE>,
    CS: OutputPin,
{
    /// Creates the binding and drives chip-select high.
    pub fn new(bus: H, mut cs: CS, settings: DeviceSettings) -> Result<Self, SpiE> {
        cs.set_high().map_err(Error::pin)?;

        Ok(Self {
            bus,
            cs,
            settings,
            selected: false,
        })
    }

    /// Reprograms the bus for this device and asserts chip-select.
    pub fn begin(&mut self) -> Result<(), SpiE> {
        if self.selected {
            warn!("device already selected");
            return Err(Error::TransactionInProgress);
        }

        let settings = self.settings;
        self.bus.with_bus(|bus| bus.open(&settings))?;

        if let Err(err) = self.cs.set_low() {
            self.bus.with_bus(|bus| bus.abandon());
            return Err(Error::pin(err));
        }

        self.selected = true;
        Ok(())
    }

    /// Full-duplex single byte exchange inside an open transaction.
    pub fn exchange(&mut self, byte: u8) -> Result<u8, SpiE> {
        if !self.selected {
            return Err(Error::NoTransaction);
        }

        self.bus.with_bus(|bus| bus.exchange(byte))
    }

    /// Flushes the bus and deasserts chip-select.
    pub fn end(&mut self) -> Result<(), SpiE> {
        if !self.selected {
            return Err(Error::NoTransaction);
        }

        let flushed = self.bus.with_bus(|bus| bus.close());
        self.selected = false;
        self.cs.set_high().map_err(Error::pin)?;
        flushed
    }

    /// Runs `f` between `begin` and `end`.
    ///
    /// `end` runs even when `f` fails; the error from `f` takes precedence.
    pub fn transaction<R, F>(&mut self, f: F) -> Result<R, SpiE>
    where
        F: FnOnce(&mut Self) -> Result<R, SpiE>,
    {
        self.begin()?;
        let result = f(self);
        let ended = self.end();

        let value = result?;
        ended?;
        Ok(value)
    }

    /// Drives chip-select low without opening a transaction.
    pub fn select(&mut self) -> Result<(), SpiE> {
        if self.selected {
            return Err(Error::TransactionInProgress);
        }

        self.cs.set_low().map_err(Error::pin)
    }

    /// Drives chip-select high without closing a transaction.
    pub fn deselect(&mut self) -> Result<(), SpiE> {
        if self.selected {
            return Err(Error::TransactionInProgress);
        }

        self.cs.set_high().map_err(Error::pin)
    }
}
