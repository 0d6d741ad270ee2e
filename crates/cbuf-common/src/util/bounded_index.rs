use core::ops::{Index, IndexMut};

/// An index into a `[A; LENGTH]` array that is known to be in range.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundedIndex<const LENGTH: usize>(usize);

impl<const LENGTH: usize> BoundedIndex<LENGTH> {
    pub const fn from_value(val: usize) -> Option<Self> {
        if val < LENGTH { Some(Self(val)) } else { None }
    }

    /// Every valid index, in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..LENGTH).map(Self)
    }

    /// Every valid index, in ascending order, as an array. Usable in
    /// `const` initialisers.
    pub const fn all_array() -> [Self; LENGTH] {
        // Placeholder values never survive: the loop rewrites every
        // element, and a zero-length array holds none.
        let mut out = [Self(0); LENGTH];
        let mut i = 0;
        while i < LENGTH {
            out[i] = Self(i);
            i += 1;
        }
        out
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl<A, const LENGTH: usize> Index<BoundedIndex<LENGTH>> for [A; LENGTH] {
    type Output = A;

    fn index(&self, index: BoundedIndex<LENGTH>) -> &Self::Output {
        unsafe {
            // SAFETY: index < LENGTH is checked on construction.
            self.get_unchecked(index.0)
        }
    }
}

impl<A, const LENGTH: usize> IndexMut<BoundedIndex<LENGTH>> for [A; LENGTH] {
    fn index_mut(&mut self, index: BoundedIndex<LENGTH>) -> &mut Self::Output {
        unsafe {
            // SAFETY: index < LENGTH is checked on construction.
            self.get_unchecked_mut(index.0)
        }
    }
}
