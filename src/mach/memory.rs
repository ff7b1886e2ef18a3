use super::Address;
use crate::error;
use crate::lang::Error;
use std::cell::Cell;

type Result<T> = std::result::Result<T, Error>;

/// ## Variable space budget
///
/// One per session. Owns the byte ceiling shared by every variable
/// store and the absolute address where the variable area begins.
/// The scalar table is a sibling store; only its byte count is kept
/// here, so array records start after the scalars and their reported
/// addresses shift when the scalar table grows, as on the original
/// hardware.

#[derive(Debug)]
pub struct Memory {
    limit: usize,
    start: Address,
    scalar_bytes: Cell<usize>,
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new(60_300, 0)
    }
}

impl Memory {
    pub fn new(limit: usize, start: Address) -> Memory {
        Memory {
            limit,
            start,
            scalar_bytes: Cell::new(0),
        }
    }

    /// Fail if granting `wanted` more bytes to a store already holding
    /// `used` would break the session ceiling.
    pub fn check_free(&self, used: usize, wanted: usize) -> Result<()> {
        match used
            .checked_add(wanted)
            .and_then(|total| total.checked_add(self.scalar_bytes.get()))
        {
            Some(total) if total <= self.limit => Ok(()),
            _ => Err(error!(OutOfMemory)),
        }
    }

    /// Bytes still free for a store holding `used` bytes, as FRE reports.
    pub fn free(&self, used: usize) -> usize {
        self.limit
            .saturating_sub(used)
            .saturating_sub(self.scalar_bytes.get())
    }

    /// Absolute address of the first array record. Arrays are kept at
    /// the end of the variable area, after the scalars.
    pub fn array_start(&self) -> Address {
        self.start + self.scalar_bytes.get()
    }

    /// Record the sibling scalar table's size.
    pub fn set_scalar_bytes(&self, bytes: usize) {
        self.scalar_bytes.set(bytes);
    }
}
