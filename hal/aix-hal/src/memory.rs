//! Memory bus abstraction
//!
//! The board exposes device memory and the engine register block as a flat
//! byte-addressed space. Every wider access is composed from single-byte
//! operations by the caller, in ascending address order.

/// Byte access at absolute device addresses
///
/// Accesses are infallible: a bus fault is a hardware failure that stalls
/// the board, not something the protocol can report.
pub trait MemoryBus {
    /// Write one byte at `address`
    fn write_byte(&mut self, address: u32, value: u8);

    /// Read one byte from `address`
    fn read_byte(&mut self, address: u32) -> u8;
}

impl<T: MemoryBus + ?Sized> MemoryBus for &mut T {
    fn write_byte(&mut self, address: u32, value: u8) {
        (**self).write_byte(address, value);
    }

    fn read_byte(&mut self, address: u32) -> u8 {
        (**self).read_byte(address)
    }
}
