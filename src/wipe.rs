use core::{
    ptr,
    sync::atomic::{compiler_fence, Ordering},
};

use zeroize::Zeroize;

/// Overwrites every byte of `bytes` with zero.
///
/// The writes cannot be elided by the optimizer even though the memory may
/// never be read again: zeroization goes through `zeroize`'s volatile write
/// path, the function is an opaque (never inlined) call boundary, and a
/// compiler fence orders the writes before anything that follows.
///
/// An empty slice is a no-op.
#[inline(never)]
pub fn wipe(bytes: &mut [u8]) {
    bytes.zeroize();
    compiler_fence(Ordering::SeqCst);
}

/// Raw-pointer form of [`wipe`] for extents not currently viewed as a slice.
///
/// A null `ptr` or zero `len` is a no-op, not an error. Cannot fail and has
/// no status to report: it is a pure memory-write loop.
///
/// # Safety
/// If `ptr` is non-null and `len` is non-zero, `ptr` must be valid for
/// reads and writes of `len` bytes and not aliased by any live reference.
pub(crate) unsafe fn wipe_extent(ptr: *mut u8, len: usize) {
    if ptr.is_null() || len == 0 {
        return;
    }

    wipe(&mut *ptr::slice_from_raw_parts_mut(ptr, len));
}
