//! Configuration primitives for SPI device bindings.

use embedded_hal::spi::{Mode, MODE_0};

use crate::params::{BitOrder, ClockDivider};

/// Electrical bus parameters a device needs while it is selected.
///
/// The bus peripheral is shared, so these are reprogrammed at the start of
/// every transaction from the device that opens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSettings {
    /// Clock polarity and phase.
    pub mode: Mode,
    /// SCK divider.
    pub clock_divider: ClockDivider,
    /// Bit order on the wire.
    pub bit_order: BitOrder,
}

impl DeviceSettings {
    /// Begins building [`DeviceSettings`] using the builder pattern.
    pub fn new() -> DeviceSettingsBuilder {
        DeviceSettingsBuilder::new()
    }

    /// Mode 0, MSB first, with the given divider.
    pub const fn mode0(clock_divider: ClockDivider) -> Self {
        Self {
            mode: MODE_0,
            clock_divider,
            bit_order: BitOrder::MsbFirst,
        }
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self::mode0(ClockDivider::Div4)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceSettings {
    fn format(&self, f: defmt::Formatter) {
        use embedded_hal::spi::{Phase, Polarity};

        let cpol = matches!(self.mode.polarity, Polarity::IdleHigh) as u8;
        let cpha = matches!(self.mode.phase, Phase::CaptureOnSecondTransition) as u8;
        defmt::write!(
            f,
            "DeviceSettings {{ CPOL: {}, CPHA: {}, divider: {}, bit_order: {} }}",
            cpol,
            cpha,
            self.clock_divider,
            self.bit_order
        );
    }
}

/// Builder for [`DeviceSettings`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSettingsBuilder {
    settings: DeviceSettings,
}

impl DeviceSettingsBuilder {
    /// Creates a new builder seeded with [`DeviceSettings::default()`].
    pub fn new() -> Self {
        Self {
            settings: DeviceSettings::default(),
        }
    }

    /// Overrides the clock polarity/phase mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.settings.mode = mode;
        self
    }

    /// Overrides the clock divider.
    pub fn clock_divider(mut self, clock_divider: ClockDivider) -> Self {
        self.settings.clock_divider = clock_divider;
        self
    }

    /// Overrides the bit order.
    pub fn bit_order(mut self, bit_order: BitOrder) -> Self {
        self.settings.bit_order = bit_order;
        self
    }

    /// Finalizes the builder and returns the [`DeviceSettings`].
    pub fn build(self) -> DeviceSettings {
        self.settings
    }
}

impl Default for DeviceSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded wait policy for the CC2500 ready handshake.
///
/// After chip-select goes low the chip holds SO high until its crystal is
/// running. Each poll is a single pin read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadyWait {
    /// Maximum number of ready-line reads before giving up.
    pub max_polls: u32,
}

impl ReadyWait {
    /// Creates a policy with the given poll budget.
    pub const fn new(max_polls: u32) -> Self {
        Self { max_polls }
    }

    /// Checks whether this policy can ever succeed.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.max_polls == 0 {
            return Err(ConfigError::ZeroPollBudget);
        }

        Ok(())
    }
}

impl Default for ReadyWait {
    fn default() -> Self {
        Self { max_polls: 100_000 }
    }
}

/// Validation errors generated while verifying a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A ready wait with no polls would time out unconditionally.
    ZeroPollBudget,
}
