#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

mod error;

pub mod bma180;
pub mod cc2500;
pub mod config;
pub mod device;
pub mod interface;
pub mod params;
pub mod registers;

#[cfg(test)]
mod sim;

pub use crate::bma180::Bma180;
pub use crate::cc2500::Cc2500;
pub use crate::device::ExternalDevice;
pub use crate::error::{Error, Result};
pub use crate::interface::{BusHandle, ConfigurableBus, SpiMaster};
