//! Configuration
//!
//! Two kinds of configuration live here: the board-level
//! [`DispatchConfig`] fixed at construction, and the [`ConfigTable`] the
//! host programs at runtime with STORE_CFG.

pub mod table;
pub mod types;

pub use table::*;
pub use types::*;
