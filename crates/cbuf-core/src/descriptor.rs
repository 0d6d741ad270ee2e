use core::mem::size_of;

/// Caller-owned storage handed to a buffer at init time.
///
/// The element count is the length of the slice and becomes the buffer
/// capacity. The element size is informational only.
pub struct BufferDescriptor<'a, T> {
    array: &'a mut [T],
    element_size: usize,
}

impl<'a, T> BufferDescriptor<'a, T> {
    pub fn new(array: &'a mut [T]) -> Self {
        Self {
            array,
            element_size: size_of::<T>(),
        }
    }

    #[inline(always)]
    pub fn element_count(&self) -> usize {
        self.array.len()
    }

    #[inline(always)]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub(crate) fn into_array(self) -> &'a mut [T] {
        self.array
    }
}

impl<'a, T, const N: usize> From<&'a mut [T; N]> for BufferDescriptor<'a, T> {
    fn from(array: &'a mut [T; N]) -> Self {
        Self::new(array)
    }
}
