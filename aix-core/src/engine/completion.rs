//! Engine completion strategies
//!
//! How the engine signals completion is board specific, so the poll step
//! is injected. [`SyntheticDone`] reproduces the placeholder used while
//! hardware done detection is unavailable; [`PollStatus`] reads the
//! control/status register and hands it to a board-supplied predicate.

use aix_hal::MemoryBus;

use super::{EngineLayout, CTRL_DONE, REG_CONTROL};

/// One poll of the engine after the start pulse
pub trait Completion {
    /// Return `true` once the engine has finished
    fn poll<M: MemoryBus>(&mut self, bus: &mut M, layout: &EngineLayout) -> bool;
}

impl<T: Completion + ?Sized> Completion for &mut T {
    fn poll<M: MemoryBus>(&mut self, bus: &mut M, layout: &EngineLayout) -> bool {
        (**self).poll(bus, layout)
    }
}

/// Placeholder completion
///
/// Writes the DONE bit itself, reads the control register back and reports
/// completion on the first poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyntheticDone;

impl Completion for SyntheticDone {
    fn poll<M: MemoryBus>(&mut self, bus: &mut M, layout: &EngineLayout) -> bool {
        layout.write_register(bus, REG_CONTROL, CTRL_DONE);
        let _status = layout.read_register(bus, REG_CONTROL);
        true
    }
}

/// Completion decided by a predicate over the control/status word
pub struct PollStatus<F> {
    predicate: F,
}

impl<F: FnMut(u32) -> bool> PollStatus<F> {
    /// Create a strategy from a predicate on the control/status register
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F: FnMut(u32) -> bool> Completion for PollStatus<F> {
    fn poll<M: MemoryBus>(&mut self, bus: &mut M, layout: &EngineLayout) -> bool {
        let status = layout.read_register(bus, REG_CONTROL);
        (self.predicate)(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::ArrayBus;

    #[test]
    fn test_poll_status_sees_register_value() {
        let layout = EngineLayout {
            base: 0x10,
            ..Default::default()
        };
        let mut bus = ArrayBus::<32>::new(0);
        let mut completion = PollStatus::new(|status| status & CTRL_DONE != 0);

        assert!(!completion.poll(&mut bus, &layout));
        layout.write_register(&mut bus, REG_CONTROL, CTRL_DONE);
        assert!(completion.poll(&mut bus, &layout));
    }
}
