//! Engine configuration table
//!
//! A fixed array of signed 32-bit slots, two per convolution layer. The
//! host addresses slots by explicit offset in every STORE_CFG entry, so
//! each write is bounds-checked before it lands.

use aix_protocol::{ConfigEntry, CONFIG_SLOTS, LAYER_COUNT};

use crate::error::TableError;

/// Configuration table owned by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigTable {
    slots: [i32; CONFIG_SLOTS],
}

impl Default for ConfigTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTable {
    /// Create a zeroed table
    pub const fn new() -> Self {
        Self {
            slots: [0; CONFIG_SLOTS],
        }
    }

    /// Store `value` at slot `offset`
    ///
    /// Offsets outside `0..CONFIG_SLOTS` are rejected and leave every slot
    /// untouched.
    pub fn set(&mut self, offset: u32, value: i32) -> Result<(), TableError> {
        let slot = usize::try_from(offset)
            .ok()
            .and_then(|index| self.slots.get_mut(index))
            .ok_or(TableError::OffsetOutOfRange { offset })?;
        *slot = value;
        Ok(())
    }

    /// Apply one decoded STORE_CFG entry
    pub fn apply(&mut self, entry: ConfigEntry) -> Result<(), TableError> {
        self.set(entry.offset, entry.value)
    }

    /// Read slot `offset`
    pub fn get(&self, offset: usize) -> Option<i32> {
        self.slots.get(offset).copied()
    }

    /// Both slots of convolution layer `layer`
    pub fn layer(&self, layer: usize) -> Option<[i32; 2]> {
        if layer >= LAYER_COUNT {
            return None;
        }
        Some([self.slots[2 * layer], self.slots[2 * layer + 1]])
    }

    /// All slots in index order
    pub fn as_slice(&self) -> &[i32] {
        &self.slots
    }

    /// Reset every slot to zero
    pub fn clear(&mut self) {
        self.slots = [0; CONFIG_SLOTS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_is_zeroed() {
        let table = ConfigTable::new();
        assert!(table.as_slice().iter().all(|&v| v == 0));
        assert_eq!(table.as_slice().len(), 22);
    }

    #[test]
    fn test_set_and_get() {
        let mut table = ConfigTable::new();
        table.set(0, 4096).unwrap();
        table.set(21, -7).unwrap();

        assert_eq!(table.get(0), Some(4096));
        assert_eq!(table.get(21), Some(-7));
        assert_eq!(table.get(22), None);
    }

    #[test]
    fn test_out_of_range_rejected_without_side_effects() {
        let mut table = ConfigTable::new();
        table.set(20, 1).unwrap();
        table.set(21, 2).unwrap();

        assert_eq!(
            table.set(22, 99),
            Err(TableError::OffsetOutOfRange { offset: 22 })
        );
        assert_eq!(
            table.apply(ConfigEntry::new(u32::MAX, 99)),
            Err(TableError::OffsetOutOfRange { offset: u32::MAX })
        );

        assert_eq!(table.get(20), Some(1));
        assert_eq!(table.get(21), Some(2));
        assert_eq!(table.as_slice().iter().filter(|&&v| v == 99).count(), 0);
    }

    #[test]
    fn test_layer_pairs() {
        let mut table = ConfigTable::new();
        table.set(4, 10).unwrap();
        table.set(5, 11).unwrap();

        assert_eq!(table.layer(2), Some([10, 11]));
        assert_eq!(table.layer(0), Some([0, 0]));
        assert_eq!(table.layer(LAYER_COUNT), None);
    }

    #[test]
    fn test_clear() {
        let mut table = ConfigTable::new();
        table.set(3, 3).unwrap();
        table.clear();
        assert_eq!(table, ConfigTable::new());
    }
}
