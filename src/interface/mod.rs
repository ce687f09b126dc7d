//! Bus abstraction shared by every external device.

use core::cell::RefCell;

use embedded_hal::spi::SpiBus;

use crate::config::DeviceSettings;

pub mod spi;

pub use self::spi::SpiMaster;

/// SPI bus peripheral whose electrical parameters can be changed at runtime.
///
/// Implemented by the board support code for its concrete SPI peripheral.
/// [`SpiMaster`] calls it at the start of every transaction, before any
/// chip-select is asserted.
pub trait ConfigurableBus: SpiBus<u8> {
    /// Programs mode, clock divider and bit order.
    fn apply_settings(&mut self, settings: &DeviceSettings) -> core::result::Result<(), Self::Error>;
}

/// Access path from a device to the shared [`SpiMaster`].
///
/// Implemented for an owned master, a mutable borrow of one, and a
/// `&RefCell` so several drivers can share one bus in single-threaded code.
pub trait BusHandle {
    /// Concrete bus peripheral behind the master.
    type Bus: ConfigurableBus;

    /// Runs `f` with exclusive access to the master.
    fn with_bus<R>(&mut self, f: impl FnOnce(&mut SpiMaster<Self::Bus>) -> R) -> R;
}

impl<B: ConfigurableBus> BusHandle for SpiMaster<B> {
    type Bus = B;

    fn with_bus<R>(&mut self, f: impl FnOnce(&mut SpiMaster<B>) -> R) -> R {
        f(self)
    }
}

impl<B: ConfigurableBus> BusHandle for &mut SpiMaster<B> {
    type Bus = B;

    fn with_bus<R>(&mut self, f: impl FnOnce(&mut SpiMaster<B>) -> R) -> R {
        f(&mut **self)
    }
}

impl<B: ConfigurableBus> BusHandle for &RefCell<SpiMaster<B>> {
    type Bus = B;

    fn with_bus<R>(&mut self, f: impl FnOnce(&mut SpiMaster<B>) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}
