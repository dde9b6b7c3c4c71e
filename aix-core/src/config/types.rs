//! Dispatch configuration types
//!
//! These values describe the board the dispatcher runs on. The firmware
//! fills them from its board file at build time; tests construct them
//! directly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::EngineLayout;
use crate::memory::MemoryWindow;

/// Default PAUSE duration in milliseconds
pub const DEFAULT_PAUSE_MS: u32 = 2_000;

/// Board description used by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DispatchConfig {
    /// Memory range reachable by STORE_RAM / LOAD_RAM
    pub window: MemoryWindow,
    /// Engine register block and the pointers programmed by RUN_ENGINE
    pub engine: EngineLayout,
    /// How long PAUSE holds before answering Resume
    pub pause_ms: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            window: MemoryWindow::default(),
            engine: EngineLayout::default(),
            pause_ms: DEFAULT_PAUSE_MS,
        }
    }
}

impl DispatchConfig {
    /// Replace the memory window
    pub const fn with_window(mut self, window: MemoryWindow) -> Self {
        self.window = window;
        self
    }

    /// Replace the engine layout
    pub const fn with_engine(mut self, engine: EngineLayout) -> Self {
        self.engine = engine;
        self
    }

    /// Replace the pause duration
    pub const fn with_pause_ms(mut self, pause_ms: u32) -> Self {
        self.pause_ms = pause_ms;
        self
    }
}
