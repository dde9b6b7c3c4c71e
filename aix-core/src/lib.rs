//! Board-agnostic core of the accelerator command firmware
//!
//! This crate contains everything between the serial link and the memory
//! bus that does not depend on a specific board:
//!
//! - The command dispatcher and its per-command sub-protocols
//! - The configuration table programmed by STORE_CFG
//! - Memory window bounds checks for block transfers
//! - Engine register programming and pluggable completion detection
//! - Dispatch configuration (addresses, pointers, pause length)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod memory;

pub use config::{ConfigTable, DispatchConfig};
pub use dispatch::{Dispatch, Dispatcher};
pub use engine::{Completion, EngineLayout, PollStatus, SyntheticDone};
pub use error::{DispatchError, TableError};
pub use memory::MemoryWindow;
