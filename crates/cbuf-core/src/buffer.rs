use core::fmt::{self, Debug};

use bitflags::bitflags;
use cbuf_common::util::advance_wrapped;
use cbuf_common::{dev_debug, dev_trace, diff_wrapped};

use crate::{AddError, BufferDescriptor, BufferMode, InitError};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct BufferFlags: u8 {
        const EMPTY = 1 << 0;
        const FULL = 1 << 1;
        const ALLOW_OVERWRITE = 1 << 2;
        const FILLED_ONCE = 1 << 3;
    }
}

const DUMP_ROW_LEN: usize = 10;

/// A circular buffer working over a caller-owned slice.
///
/// Both cursors always point inside `[0, capacity)`. Equal cursors
/// alone cannot tell an empty buffer from a full one, so the `EMPTY`
/// and `FULL` flags carry that information: whenever the cursors meet
/// exactly one of them is set, and when they differ neither is.
///
/// The buffer borrows its storage for `'a` and never allocates.
pub struct CircularBuffer<'a, T> {
    backing: &'a mut [T],
    element_size: usize,
    read: usize,
    write: usize,
    flags: BufferFlags,
}

impl<'a, T> CircularBuffer<'a, T> {
    /// Binds a new, empty FIFO buffer to the storage described by
    /// `descriptor`. Fails with [`InitError::EmptyBacking`] if the
    /// storage cannot hold a single element.
    pub fn new(descriptor: BufferDescriptor<'a, T>) -> Result<Self, InitError> {
        if descriptor.element_count() == 0 {
            return Err(InitError::EmptyBacking);
        }

        dev_debug!(
            "Init buffer of {} elements ({} bytes each)",
            descriptor.element_count(),
            descriptor.element_size()
        );

        let element_size = descriptor.element_size();
        Ok(Self {
            backing: descriptor.into_array(),
            element_size,
            read: 0,
            write: 0,
            flags: BufferFlags::EMPTY,
        })
    }

    /// Same as [`CircularBuffer::new`]. Spelled out for call sites that
    /// never switch out of FIFO mode.
    #[inline]
    pub fn fifo(descriptor: BufferDescriptor<'a, T>) -> Result<Self, InitError> {
        Self::new(descriptor)
    }

    /// Creates a buffer that starts in ring mode.
    #[inline]
    pub fn ring(descriptor: BufferDescriptor<'a, T>) -> Result<Self, InitError> {
        let mut buffer = Self::new(descriptor)?;
        buffer.set_mode(BufferMode::Ring);
        Ok(buffer)
    }

    /// Changes the fill policy. Takes effect on the next write; stored
    /// elements and cursors are left alone.
    #[inline]
    pub fn set_mode(&mut self, mode: BufferMode) {
        self.flags
            .set(BufferFlags::ALLOW_OVERWRITE, mode.allows_overwrite());
    }

    #[inline]
    pub fn mode(&self) -> BufferMode {
        BufferMode::from_overwrite(self.flags.contains(BufferFlags::ALLOW_OVERWRITE))
    }

    /// Appends an element.
    ///
    /// On a full buffer, FIFO mode rejects the element and hands it
    /// back in [`AddError::Full`] without touching any state. Ring mode
    /// overwrites the oldest unread element instead, so the buffer keeps
    /// holding the last `capacity` writes.
    pub fn add(&mut self, element: T) -> Result<(), AddError<T>> {
        if self.is_full() {
            if !self.flags.contains(BufferFlags::ALLOW_OVERWRITE) {
                dev_trace!("Buffer full, write rejected");
                return Err(AddError::Full(element));
            }

            // The write cursor sits on the oldest unread element. Drop
            // it from the readable window before overwriting it.
            dev_trace!("Buffer full, overwriting slot {}", self.write);
            self.read = advance_wrapped(self.read, self.capacity());
        }

        *self.slot_mut(self.write) = element;
        self.write = advance_wrapped(self.write, self.capacity());
        self.flags.remove(BufferFlags::EMPTY);

        if self.write == self.read {
            self.flags
                .insert(BufferFlags::FULL | BufferFlags::FILLED_ONCE);
        }

        Ok(())
    }

    /// Returns `true` if there is nothing to read.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.flags.contains(BufferFlags::EMPTY)
    }

    /// Returns `true` if every slot holds an unread element.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.flags.contains(BufferFlags::FULL)
    }

    /// Returns `true` if the buffer has been full at least once since
    /// it was initialised.
    #[inline(always)]
    pub fn was_filled_once(&self) -> bool {
        self.flags.contains(BufferFlags::FILLED_ONCE)
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.backing.len()
    }

    /// Size in bytes of one element, as stated by the descriptor.
    #[inline(always)]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Number of unread elements.
    #[inline]
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            diff_wrapped!(self.capacity() - 1, self.write, self.read)
        }
    }

    #[inline(always)]
    pub fn read_cursor(&self) -> usize {
        self.read
    }

    #[inline(always)]
    pub fn write_cursor(&self) -> usize {
        self.write
    }

    /// The whole backing storage in physical order, including slots that
    /// were already read.
    #[inline(always)]
    pub fn backing(&self) -> &[T] {
        self.backing
    }

    #[inline(always)]
    fn slot(&self, pos: usize) -> &T {
        unsafe {
            // SAFETY: cursors are kept in `[0, capacity)` and capacity is
            // the backing length.
            self.backing.get_unchecked(pos)
        }
    }

    #[inline(always)]
    fn slot_mut(&mut self, pos: usize) -> &mut T {
        unsafe {
            // SAFETY: cursors are kept in `[0, capacity)` and capacity is
            // the backing length.
            self.backing.get_unchecked_mut(pos)
        }
    }
}

impl<T: Copy> CircularBuffer<'_, T> {
    /// Removes and returns the oldest unread element, or `None` if the
    /// buffer is empty.
    pub fn read(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let element = *self.slot(self.read);
        self.read = advance_wrapped(self.read, self.capacity());
        self.flags.remove(BufferFlags::FULL);

        if self.read == self.write {
            self.flags.insert(BufferFlags::EMPTY);
        }

        Some(element)
    }
}

impl<T: Debug> CircularBuffer<'_, T> {
    /// Logs the buffer state followed by the backing storage, ten
    /// elements per row.
    pub fn dump(&self) {
        dev_debug!("{:?}", self);
        for (row, chunk) in self.backing.chunks(DUMP_ROW_LEN).enumerate() {
            dev_debug!("[{:>4}] {:?}", row * DUMP_ROW_LEN, chunk);
        }
    }
}

impl<T> Debug for CircularBuffer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircularBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("mode", &self.mode())
            .field("read", &self.read)
            .field("write", &self.write)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::CircularBuffer;
    use crate::{AddError, BufferDescriptor, BufferMode, InitError};
    use heapless::Deque;
    use ringbuffer::{ConstGenericRingBuffer, RingBuffer};

    fn assert_flags_consistent<T>(buf: &CircularBuffer<'_, T>) {
        assert!(!(buf.is_empty() && buf.is_full()));
        let cursors_meet = buf.read_cursor() == buf.write_cursor();
        assert_eq!(cursors_meet, buf.is_empty() || buf.is_full());
        assert!(buf.read_cursor() < buf.capacity());
        assert!(buf.write_cursor() < buf.capacity());
    }

    // Small deterministic generator for driving long operation sequences.
    struct Lcg(u32);

    impl Lcg {
        fn next(&mut self) -> u32 {
            self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            self.0 >> 16
        }
    }

    #[test]
    fn test_new_is_empty_fifo() {
        let mut storage = [0i32; 4];
        let buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
        assert!(buf.is_empty());
        assert!(!buf.is_full());
        assert!(!buf.was_filled_once());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), 4);
        assert_eq!(buf.element_size(), 4);
        assert_eq!(buf.mode(), BufferMode::Fifo);
        assert_eq!(buf.read_cursor(), 0);
        assert_eq!(buf.write_cursor(), 0);
    }

    #[test]
    fn test_new_rejects_empty_backing() {
        let mut storage: [i32; 0] = [];
        let res = CircularBuffer::new(BufferDescriptor::new(&mut storage));
        assert_eq!(res.err(), Some(InitError::EmptyBacking));
    }

    #[test]
    fn test_ring_constructor_sets_mode() {
        let mut storage = [0i32; 4];
        let buf = CircularBuffer::ring(BufferDescriptor::new(&mut storage)).unwrap();
        assert_eq!(buf.mode(), BufferMode::Ring);
    }

    #[test]
    fn test_read_empty_is_none() {
        let mut storage = [0i32; 4];
        let mut buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
        assert_eq!(buf.read(), None);
        assert!(buf.is_empty());
        assert_eq!(buf.read_cursor(), 0);
    }

    #[test]
    fn test_add_then_read_single() {
        let mut storage = [0i32; 4];
        let mut buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
        buf.add(42).unwrap();
        assert!(!buf.is_empty());
        assert!(!buf.is_full());
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.read(), Some(42));
        assert!(buf.is_empty());
        assert_eq!(buf.read(), None);
    }

    #[test]
    fn test_fifo_capacity_boundary() {
        let mut storage = [0i32; 5];
        let mut buf = CircularBuffer::fifo(BufferDescriptor::new(&mut storage)).unwrap();
        for i in 0..5 {
            assert!(!buf.is_full());
            buf.add(i).unwrap();
        }
        assert!(buf.is_full());
        assert!(buf.was_filled_once());
        assert_eq!(buf.len(), 5);

        let cursors = (buf.read_cursor(), buf.write_cursor());
        assert_eq!(buf.add(99), Err(AddError::Full(99)));
        assert_eq!((buf.read_cursor(), buf.write_cursor()), cursors);
        assert!(buf.is_full());

        for i in 0..5 {
            assert_eq!(buf.read(), Some(i));
        }
        assert!(buf.is_empty());
        assert_eq!(buf.read(), None);
    }

    #[test]
    fn test_fifo_order_after_many_wraps() {
        let mut storage = [0u32; 7];
        let mut buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();

        // Shift the cursors around the buffer several times first.
        for i in 0..31 {
            buf.add(i).unwrap();
            assert_eq!(buf.read(), Some(i));
        }

        for k in 1..=7u32 {
            for e in 0..k {
                buf.add(1000 + e).unwrap();
            }
            for e in 0..k {
                assert_eq!(buf.read(), Some(1000 + e));
            }
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn test_ring_sliding_window_storage() {
        let mut storage = [0u32; 20];
        let mut buf = CircularBuffer::ring(BufferDescriptor::new(&mut storage)).unwrap();
        for i in 0..40 {
            buf.add(i).unwrap();
        }
        assert!(buf.is_full());
        for (j, v) in buf.backing().iter().enumerate() {
            assert_eq!(*v, 20 + j as u32);
        }
    }

    #[test]
    fn test_ring_reads_newest_window_in_order() {
        let mut storage = [0u32; 4];
        let mut buf = CircularBuffer::ring(BufferDescriptor::new(&mut storage)).unwrap();
        for i in 1..=10 {
            buf.add(i).unwrap();
            assert_flags_consistent(&buf);
        }
        assert_eq!(buf.len(), 4);
        for expected in 7..=10 {
            assert_eq!(buf.read(), Some(expected));
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn test_ring_capacity_1() {
        let mut storage = [0u8; 1];
        let mut buf = CircularBuffer::ring(BufferDescriptor::new(&mut storage)).unwrap();
        buf.add(1).unwrap();
        assert!(buf.is_full());
        buf.add(2).unwrap();
        assert!(buf.is_full());
        assert_eq!(buf.read(), Some(2));
        assert!(buf.is_empty());
        assert_flags_consistent(&buf);
    }

    #[test]
    fn test_fifo_capacity_1() {
        let mut storage = [0u8; 1];
        let mut buf = CircularBuffer::fifo(BufferDescriptor::new(&mut storage)).unwrap();
        buf.add(1).unwrap();
        assert_eq!(buf.add(2), Err(AddError::Full(2)));
        assert_eq!(buf.read(), Some(1));
        assert_eq!(buf.read(), None);
    }

    #[test]
    fn test_filled_once_same_in_both_modes() {
        for mode in [BufferMode::Fifo, BufferMode::Ring] {
            let mut storage = [0u8; 3];
            let mut buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
            buf.set_mode(mode);
            buf.add(1).unwrap();
            buf.add(2).unwrap();
            assert!(!buf.was_filled_once());
            buf.add(3).unwrap();
            assert!(buf.was_filled_once());
            buf.read();
            buf.read();
            buf.read();
            assert!(buf.is_empty());
            assert!(buf.was_filled_once());
        }
    }

    #[test]
    fn test_filled_once_cleared_by_new() {
        let mut storage = [0u8; 2];
        {
            let mut buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
            buf.add(1).unwrap();
            buf.add(2).unwrap();
            assert!(buf.was_filled_once());
        }
        let buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
        assert!(!buf.was_filled_once());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_mode_switch_keeps_state() {
        let mut storage = [0i32; 4];
        let mut buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
        buf.add(1).unwrap();
        buf.add(2).unwrap();
        buf.read();

        let before = (buf.is_empty(), buf.is_full(), buf.read_cursor(), buf.write_cursor());
        buf.set_mode(BufferMode::Ring);
        buf.set_mode(BufferMode::Fifo);
        let after = (buf.is_empty(), buf.is_full(), buf.read_cursor(), buf.write_cursor());
        assert_eq!(before, after);
        assert_eq!(buf.mode(), BufferMode::Fifo);
    }

    #[test]
    fn test_switch_to_ring_when_full_then_back() {
        let mut storage = [0i32; 3];
        let mut buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
        for i in 0..3 {
            buf.add(i).unwrap();
        }
        assert_eq!(buf.add(3), Err(AddError::Full(3)));

        buf.set_mode(BufferMode::Ring);
        buf.add(3).unwrap();
        buf.set_mode(BufferMode::Fifo);
        assert_eq!(buf.add(4), Err(AddError::Full(4)));

        assert_eq!(buf.read(), Some(1));
        assert_eq!(buf.read(), Some(2));
        assert_eq!(buf.read(), Some(3));
        assert_eq!(buf.read(), None);
    }

    #[test]
    fn test_len_tracks_partial_fill() {
        let mut storage = [0i32; 5];
        let mut buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
        for i in 0..4 {
            buf.add(i).unwrap();
        }
        buf.read();
        buf.read();
        buf.read();
        buf.add(10).unwrap();
        buf.add(11).unwrap();
        // Write cursor wrapped behind the read cursor.
        assert!(buf.write_cursor() < buf.read_cursor());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_ring_matches_ringbuffer_model() {
        let mut storage = [0u32; 8];
        let mut buf = CircularBuffer::ring(BufferDescriptor::new(&mut storage)).unwrap();
        let mut model = ConstGenericRingBuffer::<u32, 8>::new();
        let mut rng = Lcg(7);

        for step in 0..2000 {
            if rng.next() % 3 == 0 {
                assert_eq!(buf.read(), model.dequeue(), "step {}", step);
            } else {
                let v = rng.next();
                buf.add(v).unwrap();
                model.push(v);
            }
            assert_eq!(buf.len(), model.len());
            assert_eq!(buf.is_full(), model.is_full());
            assert_eq!(buf.is_empty(), model.is_empty());
            assert_flags_consistent(&buf);
        }
    }

    #[test]
    fn test_fifo_matches_deque_model() {
        let mut storage = [0u32; 5];
        let mut buf = CircularBuffer::fifo(BufferDescriptor::new(&mut storage)).unwrap();
        let mut model: Deque<u32, 5> = Deque::new();
        let mut rng = Lcg(11);

        for step in 0..2000 {
            if rng.next() % 2 == 0 {
                assert_eq!(buf.read(), model.pop_front(), "step {}", step);
            } else {
                let v = rng.next();
                let expected = model.push_back(v).map_err(AddError::Full);
                assert_eq!(buf.add(v), expected, "step {}", step);
            }
            assert_eq!(buf.len(), model.len());
            assert_eq!(buf.is_full(), model.is_full());
            assert_eq!(buf.is_empty(), model.is_empty());
            assert_flags_consistent(&buf);
        }
    }

    #[test]
    fn test_debug_output() {
        let mut storage = [0u8; 2];
        let mut buf = CircularBuffer::new(BufferDescriptor::new(&mut storage)).unwrap();
        buf.add(1).unwrap();
        let text = std::format!("{:?}", buf);
        assert!(text.starts_with("CircularBuffer"));
        assert!(text.contains("capacity: 2"));
        assert!(text.contains("len: 1"));
        buf.dump();
    }
}
