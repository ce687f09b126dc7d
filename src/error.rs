//! Error handling primitives shared by the bus layer and both chip drivers.

use embedded_hal::digital;

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Any error reported by the underlying SPI bus.
    Interface(E),
    /// A chip-select or ready line reported an error.
    Pin(digital::ErrorKind),
    /// The device did not signal ready within the configured poll budget.
    DeviceTimeout,
    /// The register address lies outside the chip's address space.
    InvalidRegister,
    /// The bit index does not fit in an 8-bit register.
    InvalidBit,
    /// The buffer is longer than the targeted on-chip memory.
    InvalidLength,
    /// A transaction is already open on the bus.
    TransactionInProgress,
    /// The operation requires an open transaction.
    NoTransaction,
    /// The identification register did not hold the expected value.
    DeviceIdMismatch,
    /// The provided configuration parameters are invalid.
    InvalidConfig,
}

impl<E> Error<E> {
    pub(crate) fn pin(err: impl digital::Error) -> Self {
        Self::Pin(err.kind())
    }
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}
