/// Aligns a number up to the next multiple of the specified alignment.
///
/// If the input is already aligned, it is returned unchanged.
///
/// # Examples
///
/// ```
/// use topkeys_io::align::align_up_u64;
///
/// assert_eq!(align_up_u64(0, 8), 0);
/// assert_eq!(align_up_u64(1, 8), 8);
/// assert_eq!(align_up_u64(8, 8), 8);
/// assert_eq!(align_up_u64(9, 8), 16);
/// ```
///
/// # Panics
///
/// Panics in debug builds if `alignment` is 0 or not a power of 2.
#[inline]
pub fn align_up_u64(n: u64, alignment: u64) -> u64 {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    (n + alignment - 1) & !(alignment - 1)
}

/// Aligns a number down to the previous multiple of the specified alignment.
///
/// # Examples
///
/// ```
/// use topkeys_io::align::align_down_u64;
///
/// assert_eq!(align_down_u64(0, 8), 0);
/// assert_eq!(align_down_u64(7, 8), 0);
/// assert_eq!(align_down_u64(9, 8), 8);
/// assert_eq!(align_down_u64(16, 8), 16);
/// ```
///
/// # Panics
///
/// Panics in debug builds if `alignment` is 0 or not a power of 2.
#[inline]
pub fn align_down_u64(n: u64, alignment: u64) -> u64 {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    n & !(alignment - 1)
}

/// `usize` flavor of [`align_up_u64`].
#[inline]
pub fn align_up(n: usize, alignment: usize) -> usize {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    (n + alignment - 1) & !(alignment - 1)
}

/// Size of a buffer able to hold the aligned window around any `len`-byte range,
/// regardless of where that range starts.
///
/// The window of a range `[pos, pos + len)` spans from `pos` rounded down to
/// `pos + len` rounded up, which is at most `align_up(len) + alignment` bytes.
#[inline]
pub fn aligned_window_capacity(len: usize, alignment: usize) -> usize {
    align_up(len, alignment) + alignment
}
