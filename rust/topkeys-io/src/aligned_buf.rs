use std::{
    alloc::Layout,
    ops::{Deref, DerefMut},
    ptr::NonNull,
};

/// A fixed-size, zero-initialized heap buffer whose start address is aligned
/// to a caller-specified power of two.
///
/// Unbuffered reads require the destination address to be aligned to the
/// storage block size, which `Vec<u8>` does not guarantee. The length is
/// rounded up to a multiple of the alignment, so any aligned sub-window of
/// the buffer is also a valid direct I/O target.
pub struct AlignedBuf {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: `AlignedBuf` exclusively owns its allocation, like `Box<[u8]>`.
unsafe impl Send for AlignedBuf {}
unsafe impl Sync for AlignedBuf {}

impl AlignedBuf {
    /// Allocates a zeroed buffer of at least `len` bytes (and at least one
    /// alignment unit) aligned to `alignment`.
    pub fn zeroed(len: usize, alignment: usize) -> std::io::Result<AlignedBuf> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid buffer alignment {alignment}"),
            ));
        }
        let size = crate::align::align_up(len.max(1), alignment);
        let layout = Layout::from_size_align(size, alignment).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid alignment")
        })?;

        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::OutOfMemory,
                "Failed to allocate aligned buffer",
            )
        })?;
        Ok(AlignedBuf { ptr, layout })
    }

    /// Returns the buffer length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the alignment of the buffer start address.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }
}

impl Deref for AlignedBuf {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        // SAFETY: the allocation is `layout.size()` initialized bytes owned by `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl DerefMut for AlignedBuf {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for AlignedBuf {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed` with this exact layout.
        unsafe { std::alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl std::fmt::Debug for AlignedBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuf")
            .field("len", &self.len())
            .field("alignment", &self.alignment())
            .finish()
    }
}
