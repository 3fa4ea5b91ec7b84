//! Tile arena.
//!
//! Decoding allocates one tile buffer per tile per frame; recycling them
//! through an arena keeps steady-state frames allocation-free. Slots are
//! addressed by index with an explicit in-use bitset. Exhaustion grows the
//! arena; nothing is ever handed out twice.

use crate::message::RfxTile;

/// Opaque reference to a pooled tile slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileHandle(pub(crate) usize);

#[derive(Debug, Default)]
pub struct TilePool {
    slots: Vec<RfxTile>,
    in_use: Vec<u64>,
}

impl TilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently marked in use.
    pub fn used(&self) -> usize {
        self.in_use.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn find_free(&self) -> Option<usize> {
        for (wi, &word) in self.in_use.iter().enumerate() {
            if word != u64::MAX {
                let bit = (!word).trailing_zeros() as usize;
                let idx = wi * 64 + bit;
                if idx < self.slots.len() {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Take a free slot, growing the arena when none is left. The slot's
    /// buffer is resized to `data_len` but not cleared; the caller
    /// overwrites every byte it uses.
    pub fn acquire(&mut self, data_len: usize) -> TileHandle {
        let idx = match self.find_free() {
            Some(idx) => idx,
            None => {
                self.slots.push(RfxTile::default());
                self.slots.len() - 1
            }
        };
        if idx / 64 >= self.in_use.len() {
            self.in_use.resize(idx / 64 + 1, 0);
        }
        self.in_use[idx / 64] |= 1 << (idx % 64);
        self.slots[idx].data.resize(data_len, 0);
        TileHandle(idx)
    }

    pub fn release(&mut self, handle: TileHandle) {
        if let Some(word) = self.in_use.get_mut(handle.0 / 64) {
            *word &= !(1 << (handle.0 % 64));
        }
    }

    pub fn get(&self, handle: TileHandle) -> &RfxTile {
        &self.slots[handle.0]
    }

    pub fn get_mut(&mut self, handle: TileHandle) -> &mut RfxTile {
        &mut self.slots[handle.0]
    }
}
