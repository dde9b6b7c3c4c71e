//! Host side of the AIX Link protocol
//!
//! The board only answers; the host drives every exchange. This crate
//! provides:
//!
//! - [`HostLink`], which runs the host half of each command over any
//!   `embedded-io` port and checks every status literal the board sends
//! - [`image`], which reads hex word files and lays out the memory image
//!   uploaded with STORE_RAM

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod client;
pub mod image;

pub use client::{HostError, HostLink};
pub use image::{
    pack_affine, pack_filter_32b, HexWords, ImageError, ImageLayout, LayerParams, Section,
};
