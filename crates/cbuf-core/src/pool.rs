use cbuf_common::util::BoundedIndex;
use cbuf_common::{dev_debug, dev_info, dev_warn};

use crate::{BufferDescriptor, CircularBuffer, InitError, ReturnError};

/// Opaque handle to one slot of a [`Pool`].
///
/// Handles are plain indices. A handle that does not name a slot of the
/// pool it is given to is rejected by every pool operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub const fn from_raw(index: usize) -> Self {
        Self(index)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Snapshot of the pool counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStats {
    pub slot_count: u32,
    pub used: u32,
    pub claim_count: u32,
    pub return_count: u32,
}

struct Slot<'a, T> {
    claimed: bool,
    buffer: Option<CircularBuffer<'a, T>>,
}

impl<T> Slot<'_, T> {
    const fn vacant() -> Self {
        Self {
            claimed: false,
            buffer: None,
        }
    }
}

/// A fixed set of `N` buffer slots.
///
/// Free slots live on a LIFO stack; [`Pool::claim`] pops from it and
/// [`Pool::return_slot`] pushes back. `used_slot_count() + free stack
/// size == N` holds after every operation. The claim and return counters
/// only ever grow and are purely informational.
///
/// Only `free[..free_len]` is meaningful; entries above it are stale.
pub struct Pool<'a, T, const N: usize> {
    slots: [Slot<'a, T>; N],
    free: [BoundedIndex<N>; N],
    free_len: usize,
    claim_count: u32,
    return_count: u32,
}

impl<'a, T, const N: usize> Pool<'a, T, N> {
    /// Creates a pool with every slot free. Being `const`, it can
    /// initialise a `static`.
    pub const fn new() -> Self {
        Self {
            slots: [const { Slot::vacant() }; N],
            free: BoundedIndex::<N>::all_array(),
            free_len: N,
            claim_count: 0,
            return_count: 0,
        }
    }

    /// Re-arms the pool: every slot goes back on the free stack, in array
    /// order, and the counters restart from zero. Outstanding handles
    /// become stale; callers must not hold claims across this call.
    pub fn init_pool(&mut self) {
        for idx in BoundedIndex::<N>::all() {
            self.slots[idx] = Slot::vacant();
        }
        self.free = BoundedIndex::<N>::all_array();
        self.free_len = N;
        self.claim_count = 0;
        self.return_count = 0;
        dev_info!("Buffer pool armed with {} slots", N);
    }

    /// Takes a slot off the free stack, or returns `None` when every slot
    /// is in use.
    pub fn claim(&mut self) -> Option<SlotId> {
        if self.free_len == 0 {
            dev_warn!("No free buffer slot ({} in use)", N);
            return None;
        }

        self.free_len -= 1;
        let idx = self.free[self.free_len];
        self.slots[idx].claimed = true;
        self.claim_count = self.claim_count.wrapping_add(1);
        dev_debug!("Claimed slot {}", idx.index());
        Some(SlotId(idx.index()))
    }

    /// Gives a claimed slot back to the pool. Its buffer, if any, is
    /// dropped and the backing storage borrow ends.
    pub fn return_slot(&mut self, slot: SlotId) -> Result<(), ReturnError> {
        let Some(idx) = BoundedIndex::<N>::from_value(slot.index()) else {
            dev_warn!("Rejected return of foreign slot {}", slot.index());
            return Err(ReturnError::NotOwned);
        };

        let entry = &mut self.slots[idx];
        if !entry.claimed {
            dev_warn!("Rejected duplicate return of slot {}", slot.index());
            return Err(ReturnError::AlreadyFree);
        }

        entry.claimed = false;
        entry.buffer = None;
        // A claimed slot is never on the free stack, so there is room.
        debug_assert!(self.free_len < N, "free stack full while slot {} was claimed", idx.index());
        self.free[self.free_len] = idx;
        self.free_len += 1;
        self.return_count = self.return_count.wrapping_add(1);
        dev_debug!("Returned slot {}", slot.index());
        Ok(())
    }

    /// Binds a claimed slot to the storage in `descriptor`, resetting it
    /// to an empty FIFO buffer.
    pub fn init(
        &mut self,
        slot: SlotId,
        descriptor: BufferDescriptor<'a, T>,
    ) -> Result<(), InitError> {
        let entry = self.claimed_slot_mut(slot).ok_or(InitError::InvalidTarget)?;
        entry.buffer = Some(CircularBuffer::new(descriptor)?);
        Ok(())
    }

    /// Claims a slot and initialises it in one go. Returns `None`, with
    /// nothing claimed, if no slot is free or the storage is unusable.
    pub fn claim_and_init(&mut self, descriptor: BufferDescriptor<'a, T>) -> Option<SlotId> {
        let slot = self.claim()?;
        match self.init(slot, descriptor) {
            Ok(()) => Some(slot),
            Err(_) => {
                let _ = self.return_slot(slot);
                None
            }
        }
    }

    /// The buffer of a claimed and initialised slot.
    pub fn get(&self, slot: SlotId) -> Option<&CircularBuffer<'a, T>> {
        let idx = BoundedIndex::<N>::from_value(slot.index())?;
        let entry = &self.slots[idx];
        if entry.claimed { entry.buffer.as_ref() } else { None }
    }

    /// The buffer of a claimed and initialised slot.
    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut CircularBuffer<'a, T>> {
        self.claimed_slot_mut(slot)?.buffer.as_mut()
    }

    pub fn is_claimed(&self, slot: SlotId) -> bool {
        BoundedIndex::<N>::from_value(slot.index()).is_some_and(|idx| self.slots[idx].claimed)
    }

    #[inline(always)]
    pub const fn slot_count(&self) -> usize {
        N
    }

    #[inline(always)]
    pub fn free_slot_count(&self) -> usize {
        self.free_len
    }

    #[inline(always)]
    pub fn used_slot_count(&self) -> usize {
        N - self.free_len
    }

    #[inline(always)]
    pub fn claim_count(&self) -> u32 {
        self.claim_count
    }

    #[inline(always)]
    pub fn return_count(&self) -> u32 {
        self.return_count
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            slot_count: N as u32,
            used: self.used_slot_count() as u32,
            claim_count: self.claim_count,
            return_count: self.return_count,
        }
    }

    fn claimed_slot_mut(&mut self, slot: SlotId) -> Option<&mut Slot<'a, T>> {
        let idx = BoundedIndex::<N>::from_value(slot.index())?;
        let entry = &mut self.slots[idx];
        if entry.claimed { Some(entry) } else { None }
    }
}

impl<T, const N: usize> Default for Pool<'_, T, N> {
    fn default() -> Self {
        Self::new()
    }
}
