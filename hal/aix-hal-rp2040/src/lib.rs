//! RP2040 bindings for the AIX Link board
//!
//! Implements the `aix-hal` traits on top of embassy-rp:
//!
//! - [`uart::BlockingUart`] - the command link on a blocking UART
//! - [`mmio::Mmio`] - device memory and engine registers through volatile access
//!
//! The delay comes straight from `embassy_time::Delay`, which already
//! implements `embedded_hal::delay::DelayNs`.

#![no_std]
#![deny(unsafe_code)]

pub mod mmio;
pub mod uart;

pub use mmio::Mmio;
pub use uart::{BlockingUart, UartBusError};
