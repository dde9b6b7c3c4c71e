//! Error types
//!
//! The protocol has no error replies. The only failure the dispatcher
//! surfaces is a broken link; everything else is handled by policy and
//! logged.

/// Failure that ends a dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError<E> {
    /// The serial link failed while sending or receiving
    Link(E),
}

impl<E> DispatchError<E> {
    /// Unwrap the underlying link error
    pub fn into_inner(self) -> E {
        match self {
            DispatchError::Link(e) => e,
        }
    }
}

/// Errors from configuration table updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// Host sent a slot index outside the table
    OffsetOutOfRange {
        /// The rejected offset
        offset: u32,
    },
}
