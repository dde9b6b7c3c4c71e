//! AIX Link Command Protocol
//!
//! This crate defines the byte-level protocol between a host computer and
//! the accelerator board. The host drives every exchange; the board only
//! answers.
//!
//! # Protocol Overview
//!
//! Each exchange starts with a single opcode byte. There is no framing,
//! length prefix or checksum: both sides know the exact byte count of
//! every phase from the opcode alone.
//!
//! ```text
//! ┌────────┬──────────────────────────────────────────────────┐
//! │ OPCODE │ command-specific phases                          │
//! │ 1B     │ payloads, 16B status literals, 4B data words     │
//! └────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! All multi-byte integers are little-endian. Status messages are fixed
//! 16-byte, space-padded ASCII literals that hosts match bit-for-bit.
//! Unknown opcodes are dropped without a reply.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod status;
pub mod wire;

pub use command::Command;
pub use status::{Status, STATUS_LEN};
pub use wire::{
    ConfigEntry, Descriptor, CONFIG_ENTRY_LEN, CONFIG_SLOTS, DESCRIPTOR_LEN, ECHO_LEN,
    LAYER_COUNT, WORD_LEN,
};
