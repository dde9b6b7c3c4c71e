//! Payload layouts and byte order
//!
//! Every multi-byte integer on the link is little-endian. Fixed-size
//! payloads decode from exact-length arrays, so a short read is impossible
//! once the transport has filled the buffer.

/// Bytes per data word in STORE_RAM / LOAD_RAM
pub const WORD_LEN: usize = 4;

/// Bytes in a transfer descriptor
pub const DESCRIPTOR_LEN: usize = 8;

/// Bytes echoed by ECHO
pub const ECHO_LEN: usize = 16;

/// Bytes per configuration entry
pub const CONFIG_ENTRY_LEN: usize = 8;

/// Number of convolution layers the engine is configured for
pub const LAYER_COUNT: usize = 11;

/// Slots in the configuration table, two per layer
///
/// STORE_CFG always transfers exactly this many entries.
pub const CONFIG_SLOTS: usize = 2 * LAYER_COUNT;

/// Decode a little-endian `u32`
#[inline]
pub fn read_u32_le(bytes: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*bytes)
}

fn split_pair(bytes: &[u8; 8]) -> ([u8; 4], [u8; 4]) {
    let mut first = [0u8; 4];
    let mut second = [0u8; 4];
    first.copy_from_slice(&bytes[..4]);
    second.copy_from_slice(&bytes[4..]);
    (first, second)
}

fn join_pair(first: [u8; 4], second: [u8; 4]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&first);
    out[4..].copy_from_slice(&second);
    out
}

/// Block transfer descriptor
///
/// Sent by the host after the Waiting status of STORE_RAM and LOAD_RAM.
/// `address` is relative to the board's memory window; `count` is in
/// 4-byte words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor {
    /// Byte offset of the first word inside the memory window
    pub address: u32,
    /// Number of 4-byte words to transfer
    pub count: u32,
}

impl Descriptor {
    /// Create a descriptor
    pub const fn new(address: u32, count: u32) -> Self {
        Self { address, count }
    }

    /// Decode from the 8-byte wire form (address first)
    pub fn decode(bytes: &[u8; DESCRIPTOR_LEN]) -> Self {
        let (address, count) = split_pair(bytes);
        Self {
            address: u32::from_le_bytes(address),
            count: u32::from_le_bytes(count),
        }
    }

    /// Encode into the 8-byte wire form
    pub fn encode(&self) -> [u8; DESCRIPTOR_LEN] {
        join_pair(self.address.to_le_bytes(), self.count.to_le_bytes())
    }

    /// Number of data bytes that follow (or are streamed back)
    pub fn byte_len(&self) -> u64 {
        self.count as u64 * WORD_LEN as u64
    }
}

/// One STORE_CFG entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigEntry {
    /// Slot index in the configuration table, host supplied and unchecked
    pub offset: u32,
    /// Value to store
    pub value: i32,
}

impl ConfigEntry {
    /// Create an entry
    pub const fn new(offset: u32, value: i32) -> Self {
        Self { offset, value }
    }

    /// Decode from the 8-byte wire form (offset first)
    pub fn decode(bytes: &[u8; CONFIG_ENTRY_LEN]) -> Self {
        let (offset, value) = split_pair(bytes);
        Self {
            offset: u32::from_le_bytes(offset),
            value: i32::from_le_bytes(value),
        }
    }

    /// Encode into the 8-byte wire form
    pub fn encode(&self) -> [u8; CONFIG_ENTRY_LEN] {
        join_pair(self.offset.to_le_bytes(), self.value.to_le_bytes())
    }
}
