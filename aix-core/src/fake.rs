//! Fake collaborators for host-side testing
//!
//! - [`ScriptedLink`] replays a fixed input script and captures output;
//!   running out of script surfaces as [`LinkError::Exhausted`], which ends
//!   a dispatch loop cleanly.
//! - [`ArrayBus`] is device memory backed by a byte array.
//! - [`RecordingDelay`] records requested delays instead of sleeping.

use aix_hal::uart::ErrorType;
use aix_hal::{DelayNs, MemoryBus, UartRx, UartTx};
use heapless::Vec;

/// Default script and capture capacity of [`ScriptedLink`]
pub const DEFAULT_LINK_CAPACITY: usize = 4096;

/// Errors from the scripted link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// A read asked for more bytes than the script has left
    Exhausted,
    /// The script or captured output exceeded the link capacity
    Full,
}

/// Link that replays scripted input and captures everything written
pub struct ScriptedLink<
    const IN: usize = { DEFAULT_LINK_CAPACITY },
    const OUT: usize = { DEFAULT_LINK_CAPACITY },
> {
    input: Vec<u8, IN>,
    pos: usize,
    output: Vec<u8, OUT>,
}

impl<const IN: usize, const OUT: usize> Default for ScriptedLink<IN, OUT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const IN: usize, const OUT: usize> ScriptedLink<IN, OUT> {
    /// Create a link with an empty script
    pub fn new() -> Self {
        Self {
            input: Vec::new(),
            pos: 0,
            output: Vec::new(),
        }
    }

    /// Create a link that will replay `script`
    pub fn with_script(script: &[u8]) -> Result<Self, LinkError> {
        let mut link = Self::new();
        link.feed(script)?;
        Ok(link)
    }

    /// Append bytes to the input script
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.input
            .extend_from_slice(bytes)
            .map_err(|_| LinkError::Full)
    }

    /// Everything written so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Discard captured output
    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Script bytes not yet read
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }
}

impl<const IN: usize, const OUT: usize> ErrorType for ScriptedLink<IN, OUT> {
    type Error = LinkError;
}

impl<const IN: usize, const OUT: usize> UartTx for ScriptedLink<IN, OUT> {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.output
            .extend_from_slice(data)
            .map_err(|_| LinkError::Full)
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        Ok(())
    }
}

impl<const IN: usize, const OUT: usize> UartRx for ScriptedLink<IN, OUT> {
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<(), LinkError> {
        if buf.len() > self.remaining() {
            // Consume what is left so the next read fails too
            self.pos = self.input.len();
            return Err(LinkError::Exhausted);
        }
        let end = self.pos + buf.len();
        buf.copy_from_slice(&self.input[self.pos..end]);
        self.pos = end;
        Ok(())
    }
}

/// Device memory backed by a byte array
///
/// Covers `base..base + N`. Writes outside that range are dropped and reads
/// return zero; both are counted in [`ArrayBus::stray_accesses`].
pub struct ArrayBus<const N: usize> {
    base: u32,
    bytes: [u8; N],
    stray: u32,
}

impl<const N: usize> ArrayBus<N> {
    /// Create a zeroed bus starting at `base`
    pub fn new(base: u32) -> Self {
        Self {
            base,
            bytes: [0; N],
            stray: 0,
        }
    }

    /// Backing bytes, index 0 at `base`
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable backing bytes, index 0 at `base`
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Accesses that fell outside the array
    pub fn stray_accesses(&self) -> u32 {
        self.stray
    }

    fn index(&self, address: u32) -> Option<usize> {
        let offset = address.checked_sub(self.base)? as usize;
        (offset < N).then_some(offset)
    }
}

impl<const N: usize> MemoryBus for ArrayBus<N> {
    fn write_byte(&mut self, address: u32, value: u8) {
        match self.index(address) {
            Some(i) => self.bytes[i] = value,
            None => self.stray = self.stray.saturating_add(1),
        }
    }

    fn read_byte(&mut self, address: u32) -> u8 {
        match self.index(address) {
            Some(i) => self.bytes[i],
            None => {
                self.stray = self.stray.saturating_add(1);
                0
            }
        }
    }
}

/// Delay that only records how long it was asked to wait
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingDelay {
    total_ns: u64,
}

impl RecordingDelay {
    /// Total requested delay in nanoseconds
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }

    /// Total requested delay in whole milliseconds
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}
