//! Memory-mapped device access
//!
//! Device memory and the engine register block sit in the processor's
//! address space. Each byte is a separate volatile access so the compiler
//! can neither merge nor reorder them.

use aix_hal::MemoryBus;

/// Volatile byte access to physical addresses
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Take ownership of the memory-mapped address space
    ///
    /// # Safety
    ///
    /// Every address later passed to this bus must be mapped on the board
    /// and must not alias memory owned by Rust code. The dispatcher only
    /// touches its configured memory window and engine register block, so
    /// those two ranges must satisfy this.
    #[allow(unsafe_code)]
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl MemoryBus for Mmio {
    #[allow(unsafe_code)]
    fn write_byte(&mut self, address: u32, value: u8) {
        // SAFETY: the caller of `Mmio::new` vouched for every address used
        unsafe { core::ptr::write_volatile(address as usize as *mut u8, value) }
    }

    #[allow(unsafe_code)]
    fn read_byte(&mut self, address: u32) -> u8 {
        // SAFETY: as above
        unsafe { core::ptr::read_volatile(address as usize as *const u8) }
    }
}
