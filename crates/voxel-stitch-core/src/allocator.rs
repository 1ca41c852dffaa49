use crate::error::{Result, StitchError};
use crate::model::Slot;

/// Hands out grid slots in row-major order (column fastest), starting at (0, 0).
///
/// Slots are never freed; once the last row is used up every call fails with
/// [`StitchError::GridExhausted`].
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    tile_count: u32,
    next_col: u32,
    next_row: u32,
}

impl SlotAllocator {
    pub fn new(tile_count: u32) -> Self {
        Self {
            tile_count,
            next_col: 0,
            next_row: 0,
        }
    }

    /// Returns the current cursor position and advances the cursor by one slot.
    pub fn allocate(&mut self) -> Result<Slot> {
        if self.next_row >= self.tile_count {
            return Err(StitchError::GridExhausted {
                tile_count: self.tile_count,
            });
        }
        let slot = Slot::new(self.next_col, self.next_row);
        self.next_col += 1;
        if self.next_col >= self.tile_count {
            self.next_col = 0;
            self.next_row += 1;
        }
        Ok(slot)
    }

    /// Next slot that `allocate` would return, if any.
    pub fn peek(&self) -> Option<Slot> {
        (self.next_row < self.tile_count).then(|| Slot::new(self.next_col, self.next_row))
    }

    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    /// Number of slots handed out so far.
    pub fn allocated(&self) -> u32 {
        if self.next_row >= self.tile_count {
            return self.capacity();
        }
        self.next_row * self.tile_count + self.next_col
    }

    pub fn remaining(&self) -> u32 {
        self.capacity() - self.allocated()
    }

    pub fn capacity(&self) -> u32 {
        self.tile_count * self.tile_count
    }
}
