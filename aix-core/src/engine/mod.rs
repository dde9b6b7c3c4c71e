//! Compute engine control
//!
//! The engine is a memory-mapped register block. RUN_ENGINE writes the
//! three feature-map/weight pointers, pulses the start bit and then polls
//! until a [`Completion`] strategy reports the engine as finished.
//!
//! Register map (offsets from [`EngineLayout::base`]):
//!
//! | Offset | Register                                     |
//! |--------|----------------------------------------------|
//! | 0x00   | Control/status (bit 0 START, bit 1 DONE)     |
//! | 0x04   | Input feature map pointer                    |
//! | 0x08   | Output feature map pointer                   |
//! | 0x0C   | Weight pointer                               |

pub mod completion;

pub use completion::{Completion, PollStatus, SyntheticDone};

use aix_hal::MemoryBus;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::memory;

/// Control/status register offset
pub const REG_CONTROL: u32 = 0x00;
/// Input feature map pointer register offset
pub const REG_IFM: u32 = 0x04;
/// Output feature map pointer register offset
pub const REG_OFM: u32 = 0x08;
/// Weight pointer register offset
pub const REG_WEIGHT: u32 = 0x0C;

/// Start bit in the control register
pub const CTRL_START: u32 = 1 << 0;
/// Done bit in the control register
pub const CTRL_DONE: u32 = 1 << 1;

/// Default engine register block base
pub const DEFAULT_ENGINE_BASE: u32 = 0x44A0_0000;
/// Default input feature map pointer
pub const DEFAULT_IFM_POINTER: u32 = 4096;
/// Default output feature map pointer
pub const DEFAULT_OFM_POINTER: u32 = 4096 + 256 * 256 * 4;
/// Default weight pointer
pub const DEFAULT_WEIGHT_POINTER: u32 = 4096 + 256 * 256 * 16;

/// Engine register block location and the pointers RUN_ENGINE programs
///
/// The pointers are fixed per board; they are not derived from the
/// configuration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineLayout {
    /// Absolute address of the register block
    pub base: u32,
    /// Value written to the IFM pointer register
    pub ifm_pointer: u32,
    /// Value written to the OFM pointer register
    pub ofm_pointer: u32,
    /// Value written to the weight pointer register
    pub weight_pointer: u32,
}

impl Default for EngineLayout {
    fn default() -> Self {
        Self {
            base: DEFAULT_ENGINE_BASE,
            ifm_pointer: DEFAULT_IFM_POINTER,
            ofm_pointer: DEFAULT_OFM_POINTER,
            weight_pointer: DEFAULT_WEIGHT_POINTER,
        }
    }
}

impl EngineLayout {
    /// Absolute address of the register at `offset`
    pub fn register(&self, offset: u32) -> u32 {
        self.base.wrapping_add(offset)
    }

    /// Write a 32-bit register
    pub fn write_register<M: MemoryBus>(&self, bus: &mut M, offset: u32, value: u32) {
        memory::write_u32(bus, self.register(offset), value);
    }

    /// Read a 32-bit register
    pub fn read_register<M: MemoryBus>(&self, bus: &mut M, offset: u32) -> u32 {
        memory::read_u32(bus, self.register(offset))
    }

    /// Program the IFM, OFM and weight pointers, in that order
    pub fn program_pointers<M: MemoryBus>(&self, bus: &mut M) {
        self.write_register(bus, REG_IFM, self.ifm_pointer);
        self.write_register(bus, REG_OFM, self.ofm_pointer);
        self.write_register(bus, REG_WEIGHT, self.weight_pointer);
    }

    /// Pulse the start bit: write 1, then 0, to the control register
    pub fn pulse_start<M: MemoryBus>(&self, bus: &mut M) {
        self.write_register(bus, REG_CONTROL, CTRL_START);
        self.write_register(bus, REG_CONTROL, 0);
    }

    /// Poll `completion` until it reports done
    ///
    /// Returns the number of polls it took. There is no timeout: an engine
    /// that never finishes blocks here forever.
    pub fn wait_done<M: MemoryBus, C: Completion>(&self, bus: &mut M, completion: &mut C) -> u32 {
        let mut polls: u32 = 0;
        loop {
            polls = polls.saturating_add(1);
            if completion.poll(bus, self) {
                return polls;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Bus that records every byte write in order
    #[derive(Default)]
    struct LogBus {
        writes: Vec<(u32, u8)>,
        memory: std::collections::BTreeMap<u32, u8>,
    }

    impl MemoryBus for LogBus {
        fn write_byte(&mut self, address: u32, value: u8) {
            self.writes.push((address, value));
            self.memory.insert(address, value);
        }

        fn read_byte(&mut self, address: u32) -> u8 {
            self.memory.get(&address).copied().unwrap_or(0)
        }
    }

    fn layout() -> EngineLayout {
        EngineLayout {
            base: 0x4000,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_pointers() {
        let layout = EngineLayout::default();
        assert_eq!(layout.ifm_pointer, 0x0000_1000);
        assert_eq!(layout.ofm_pointer, 0x0004_1000);
        assert_eq!(layout.weight_pointer, 0x0010_1000);
    }

    #[test]
    fn test_program_pointers_writes_registers_in_order() {
        let layout = layout();
        let mut bus = LogBus::default();
        layout.program_pointers(&mut bus);

        let addresses: Vec<u32> = bus.writes.iter().map(|(a, _)| *a).collect();
        assert_eq!(
            addresses,
            [
                0x4004, 0x4005, 0x4006, 0x4007, // IFM
                0x4008, 0x4009, 0x400A, 0x400B, // OFM
                0x400C, 0x400D, 0x400E, 0x400F, // WGT
            ]
        );
        assert_eq!(layout.read_register(&mut bus, REG_IFM), DEFAULT_IFM_POINTER);
        assert_eq!(layout.read_register(&mut bus, REG_OFM), DEFAULT_OFM_POINTER);
        assert_eq!(layout.read_register(&mut bus, REG_WEIGHT), DEFAULT_WEIGHT_POINTER);
    }

    #[test]
    fn test_pulse_start_writes_one_then_zero() {
        let layout = layout();
        let mut bus = LogBus::default();
        layout.pulse_start(&mut bus);

        let control: Vec<u8> = bus
            .writes
            .iter()
            .filter(|(a, _)| *a == 0x4000)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(control, [0x01, 0x00]);
        assert_eq!(bus.writes.len(), 8);
        assert_eq!(layout.read_register(&mut bus, REG_CONTROL), 0);
    }

    #[test]
    fn test_wait_done_with_synthetic_completion() {
        let layout = layout();
        let mut bus = LogBus::default();
        let polls = layout.wait_done(&mut bus, &mut SyntheticDone);

        assert_eq!(polls, 1);
        assert_eq!(layout.read_register(&mut bus, REG_CONTROL), CTRL_DONE);
    }

    #[test]
    fn test_wait_done_polls_until_predicate_holds() {
        let layout = layout();
        let mut bus = LogBus::default();
        let mut reads = 0;
        let mut completion = PollStatus::new(|_status: u32| {
            reads += 1;
            reads == 3
        });

        let polls = layout.wait_done(&mut bus, &mut completion);
        assert_eq!(polls, 3);
    }
}
