//! AIX Link Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the command dispatcher is
//! written against. Chip-specific crates implement them for real
//! peripherals; `aix-core` ships fakes for host-side tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Dispatcher (aix-core)                  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aix-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ aix-hal-      │       │ aix-core      │
//! │   rp2040      │       │   ::fake      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Blocking serial link
//! - [`memory::MemoryBus`] - Byte access at absolute device addresses
//! - [`DelayNs`] - Blocking delays (re-exported from `embedded-hal`)

#![no_std]
#![deny(unsafe_code)]

pub mod memory;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use embedded_hal::delay::DelayNs;
pub use memory::MemoryBus;
pub use uart::{ErrorType, Uart, UartConfig, UartRx, UartTx};
