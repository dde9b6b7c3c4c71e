//! Memory window and word access
//!
//! STORE_RAM and LOAD_RAM address device memory relative to a fixed base.
//! Word `i` of a transfer at `offset` lives at `base + offset + 4·i`; the
//! whole word must fall inside the window or it is not touched.

use aix_hal::MemoryBus;
use aix_protocol::WORD_LEN;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default base of the addressable memory region (external DRAM)
pub const DEFAULT_WINDOW_BASE: u32 = 0x8000_0000;

/// Default size of the addressable memory region (512 MiB)
pub const DEFAULT_WINDOW_SIZE: u32 = 0x2000_0000;

/// Addressable memory region for block transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MemoryWindow {
    /// Absolute address of the first byte
    pub base: u32,
    /// Size of the region in bytes
    pub size: u32,
}

impl Default for MemoryWindow {
    fn default() -> Self {
        Self {
            base: DEFAULT_WINDOW_BASE,
            size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl MemoryWindow {
    /// Create a window
    pub const fn new(base: u32, size: u32) -> Self {
        Self { base, size }
    }

    /// Absolute address of word `index` of a transfer starting at `offset`
    ///
    /// Returns `None` when any byte of the word lies outside the window or
    /// the address space.
    pub fn word_address(&self, offset: u32, index: u32) -> Option<u32> {
        let relative = offset as u64 + index as u64 * WORD_LEN as u64;
        if relative + WORD_LEN as u64 > self.size as u64 {
            return None;
        }
        let absolute = self.base as u64 + relative;
        if absolute + WORD_LEN as u64 > u32::MAX as u64 + 1 {
            return None;
        }
        Some(absolute as u32)
    }

    /// Check whether the window fits in the 32-bit address space
    pub fn is_valid(&self) -> bool {
        self.base as u64 + self.size as u64 <= u32::MAX as u64 + 1
    }
}

/// Write a 4-byte word, byte by byte in ascending address order
///
/// `word` is already in wire (little-endian) order.
pub fn write_word<M: MemoryBus>(bus: &mut M, address: u32, word: &[u8; WORD_LEN]) {
    for (i, &byte) in word.iter().enumerate() {
        bus.write_byte(address.wrapping_add(i as u32), byte);
    }
}

/// Read a 4-byte word, byte by byte in ascending address order
pub fn read_word<M: MemoryBus>(bus: &mut M, address: u32) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    for (i, byte) in word.iter_mut().enumerate() {
        *byte = bus.read_byte(address.wrapping_add(i as u32));
    }
    word
}

/// Write a `u32` register value in little-endian byte order
pub fn write_u32<M: MemoryBus>(bus: &mut M, address: u32, value: u32) {
    write_word(bus, address, &value.to_le_bytes());
}

/// Read a `u32` register value in little-endian byte order
pub fn read_u32<M: MemoryBus>(bus: &mut M, address: u32) -> u32 {
    u32::from_le_bytes(read_word(bus, address))
}
