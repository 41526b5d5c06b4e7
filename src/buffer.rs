use core::{fmt, ptr, ptr::NonNull};

use zeroize::Zeroize;

use crate::{alloc, wipe, Error};

/// An owned, fixed-capacity byte container for short-lived secret material.
///
/// The backing memory is requested directly from the operating system as an
/// anonymous mapping and locked into physical RAM for the buffer's whole
/// lifetime, so the secret is never written to swap. On release — explicit
/// [`release`](Self::release) or scope exit — the full mapped extent is
/// overwritten through the non-elidable [`wipe`](crate::wipe) primitive
/// before it is unlocked and returned to the operating system. Early
/// returns, `?` propagation, and panic unwinding all reach the same path.
///
/// The buffer is move-only: ownership hand-off transfers the extent without
/// wiping it, and there is no `Clone`, since a byte-for-byte duplicate would
/// escape the single-owner wipe guarantee.
///
/// `capacity` is fixed at construction; `length` tracks how many bytes are
/// logically valid and may move between 0 and `capacity` as the caller
/// writes data in.
///
/// Not safe for concurrent mutation without external synchronization: all
/// mutation requires `&mut self` and no internal locking is provided.
///
/// # Example
/// ```
/// use secure_buf::SecureBuffer;
///
/// # fn main() -> Result<(), secure_buf::Error> {
/// let mut key = SecureBuffer::new(32)?;
/// key.write(0, &[0xAA; 32])?;
/// assert_eq!(key.as_slice()?.len(), 32);
/// key.release(); // or just drop it
/// assert!(key.as_slice().is_err());
/// # Ok(())
/// # }
/// ```
pub struct SecureBuffer {
    ptr: NonNull<u8>,
    /// Bytes requested at construction; upper bound for `len`.
    capacity: usize,
    /// Page-rounded extent actually mapped and locked; `>= capacity`.
    mapped: usize,
    len: usize,
    released: bool,
}

impl SecureBuffer {
    /// Allocates `capacity` bytes of zero-filled memory and locks them into
    /// physical RAM.
    ///
    /// The length starts at 0; bytes become readable as they are written.
    ///
    /// # Errors
    /// - [`Error::Alloc`] if the mapping cannot be created (or `capacity`
    ///   is 0).
    /// - [`Error::Lock`] if the operating system denies the lock request.
    ///   The mapping is unmapped before the error is returned; a failed
    ///   construction leaves nothing behind.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 || capacity > isize::MAX as usize {
            return Err(Error::Alloc(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "capacity out of bounds",
            )));
        }

        let mapped = alloc::page_aligned(capacity);
        let ptr = alloc::alloc(mapped).map_err(Error::Alloc)?;

        if let Err(err) = alloc::lock(ptr, mapped) {
            // Nothing secret has been written yet; the fresh mapping only
            // needs to be unmapped.
            if let Err(free_err) = alloc::free(ptr, mapped) {
                log::warn!("failed to unmap after denied lock: {free_err}");
            }
            return Err(Error::Lock(err));
        }

        Ok(Self {
            ptr,
            capacity,
            mapped,
            len: 0,
            released: false,
        })
    }

    /// Bytes requested at construction. Remains queryable after release.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of logically valid bytes, `<= capacity()`. Reads 0 after
    /// release.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes are currently valid.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn guard(&self) -> Result<(), Error> {
        if self.released {
            return Err(Error::Released);
        }
        Ok(())
    }

    /// Sets the number of logically valid bytes.
    ///
    /// Growing exposes bytes that were previously written or wiped to zero;
    /// shrinking does not wipe the excluded tail — the tail stays covered
    /// by the next [`wipe_now`](Self::wipe_now) or by release, avoiding a
    /// partial-wipe cost on every resize.
    ///
    /// # Errors
    /// [`Error::Bounds`] if `new_len > capacity()`, [`Error::Released`]
    /// after release.
    pub fn set_len(&mut self, new_len: usize) -> Result<(), Error> {
        self.guard()?;
        if new_len > self.capacity {
            return Err(Error::bounds(0, new_len, self.capacity));
        }
        self.len = new_len;
        Ok(())
    }

    /// Immutable view over the valid bytes `[0, len)`.
    ///
    /// This is the only read path; there is no copy-out accessor that would
    /// place an unmanaged duplicate of the secret outside the buffer's
    /// control.
    ///
    /// # Errors
    /// [`Error::Released`] after release.
    pub fn as_slice(&self) -> Result<&[u8], Error> {
        self.guard()?;
        // Valid: `ptr` points at `mapped >= len` live bytes we exclusively own.
        Ok(unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) })
    }

    /// Mutable view over the valid bytes `[0, len)`.
    ///
    /// # Errors
    /// [`Error::Released`] after release.
    pub fn as_mut_slice(&mut self) -> Result<&mut [u8], Error> {
        self.guard()?;
        Ok(unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) })
    }

    /// Copies `src` into the buffer at `offset`, growing `len` to cover the
    /// written range.
    ///
    /// # Errors
    /// [`Error::Bounds`] if `offset + src.len()` exceeds `capacity()`,
    /// [`Error::Released`] after release. Nothing is written on error.
    pub fn write(&mut self, offset: usize, src: &[u8]) -> Result<(), Error> {
        self.guard()?;
        let end = offset
            .checked_add(src.len())
            .filter(|&end| end <= self.capacity)
            .ok_or_else(|| Error::bounds(offset, src.len(), self.capacity))?;

        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.ptr.as_ptr().add(offset), src.len());
        }
        self.len = self.len.max(end);
        Ok(())
    }

    /// Copies `dst.len()` valid bytes starting at `offset` into
    /// caller-provided storage. The caller owns that copy's lifecycle.
    ///
    /// # Errors
    /// [`Error::Bounds`] if `offset + dst.len()` exceeds `len()` — the
    /// uninitialized tail between `len` and `capacity` is not readable —
    /// and [`Error::Released`] after release. Nothing is read on error.
    pub fn read_into(&self, offset: usize, dst: &mut [u8]) -> Result<(), Error> {
        self.guard()?;
        if offset.checked_add(dst.len()).filter(|&end| end <= self.len).is_none() {
            return Err(Error::bounds(offset, dst.len(), self.len));
        }

        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr().add(offset), dst.as_mut_ptr(), dst.len());
        }
        Ok(())
    }

    /// Overwrites the full mapped extent (the whole capacity, not just the
    /// valid prefix) with zero and resets `len` to 0.
    ///
    /// The buffer stays locked and usable. Idempotent; a no-op after
    /// release, where the extent has already been wiped and returned.
    pub fn wipe_now(&mut self) {
        if self.released {
            return;
        }
        unsafe { wipe::wipe_extent(self.ptr.as_ptr(), self.mapped) };
        self.len = 0;
    }

    /// Releases the buffer early: wipe the full extent, unlock it, return
    /// it to the operating system — unconditionally and in that order.
    ///
    /// Unlock and unmap failures are logged, never returned: the release
    /// path always runs to completion so the extent is never left in an
    /// ambiguous state. Idempotent; dropping an already-released buffer is
    /// a no-op. Any subsequent access fails with [`Error::Released`].
    pub fn release(&mut self) {
        if self.released {
            return;
        }

        unsafe { wipe::wipe_extent(self.ptr.as_ptr(), self.mapped) };

        if let Err(err) = alloc::unlock(self.ptr, self.mapped) {
            log::warn!("failed to unlock secure buffer extent: {err}");
        }
        if let Err(err) = alloc::free(self.ptr, self.mapped) {
            log::warn!("failed to unmap secure buffer extent: {err}");
        }

        self.len = 0;
        self.released = true;
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl Zeroize for SecureBuffer {
    fn zeroize(&mut self) {
        self.wipe_now();
    }
}

// Safety: the buffer exclusively owns its unaliased extent, so sending it
// to another thread moves sole access along with it.
unsafe impl Send for SecureBuffer {}

// Safety: shared references only permit reads; all mutation requires
// `&mut self`.
unsafe impl Sync for SecureBuffer {}

/// Never prints buffer contents.
impl fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_empty_with_requested_capacity() {
        let buf = SecureBuffer::new(32).expect("failed to allocate");
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(SecureBuffer::new(0), Err(Error::Alloc(_))));
    }

    #[test]
    fn write_grows_len_and_round_trips() {
        let mut buf = SecureBuffer::new(64).expect("failed to allocate");
        buf.write(0, &[0x11; 16]).unwrap();
        assert_eq!(buf.len(), 16);
        buf.write(16, &[0x22; 16]).unwrap();
        assert_eq!(buf.len(), 32);

        let mut out = [0u8; 32];
        buf.read_into(0, &mut out).unwrap();
        assert_eq!(&out[..16], &[0x11; 16]);
        assert_eq!(&out[16..], &[0x22; 16]);
    }

    #[test]
    fn write_past_capacity_is_bounds_error() {
        let mut buf = SecureBuffer::new(16).expect("failed to allocate");
        let err = buf.write(1, &[0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::Bounds { .. }));
        assert_eq!(buf.len(), 0);

        // Offset large enough to overflow offset + len.
        let err = buf.write(usize::MAX, &[0u8; 2]).unwrap_err();
        assert!(matches!(err, Error::Bounds { .. }));
    }

    #[test]
    fn read_of_uninitialized_tail_is_bounds_error() {
        let mut buf = SecureBuffer::new(32).expect("failed to allocate");
        buf.write(0, &[0xEE; 8]).unwrap();

        let mut out = [0u8; 9];
        let err = buf.read_into(0, &mut out).unwrap_err();
        assert!(matches!(err, Error::Bounds { limit: 8, .. }));
    }

    #[test]
    fn set_len_grow_and_shrink() {
        let mut buf = SecureBuffer::new(32).expect("failed to allocate");
        buf.write(0, &[0xCC; 32]).unwrap();
        buf.set_len(4).unwrap();
        assert_eq!(buf.as_slice().unwrap(), &[0xCC; 4]);

        // Shrinking does not wipe the tail; growing makes it visible again.
        buf.set_len(32).unwrap();
        assert_eq!(buf.as_slice().unwrap(), &[0xCC; 32]);

        assert!(matches!(buf.set_len(33), Err(Error::Bounds { .. })));
    }

    #[test]
    fn wipe_now_covers_capacity_beyond_len() {
        for capacity in [1usize, 32, 4096] {
            let mut buf = SecureBuffer::new(capacity).expect("failed to allocate");
            buf.write(0, &vec![0xA5; capacity]).unwrap();
            buf.set_len(capacity / 2).unwrap();

            buf.wipe_now();
            assert_eq!(buf.len(), 0);

            // The whole extent must read back zero, tail included.
            buf.set_len(capacity).unwrap();
            assert!(
                buf.as_slice().unwrap().iter().all(|&b| b == 0),
                "residue at capacity {capacity}"
            );
        }
    }

    #[test]
    fn wipe_now_is_idempotent_and_buffer_stays_usable() {
        let mut buf = SecureBuffer::new(16).expect("failed to allocate");
        buf.write(0, &[0x7F; 16]).unwrap();
        buf.wipe_now();
        buf.wipe_now();

        buf.write(0, &[0x42; 4]).unwrap();
        assert_eq!(buf.as_slice().unwrap(), &[0x42; 4]);
    }

    #[test]
    fn zeroize_impl_forwards_to_wipe() {
        let mut buf = SecureBuffer::new(8).expect("failed to allocate");
        buf.write(0, &[0xFF; 8]).unwrap();
        Zeroize::zeroize(&mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn release_is_idempotent_and_access_fails_after() {
        let mut buf = SecureBuffer::new(32).expect("failed to allocate");
        buf.write(0, &[0xAB; 32]).unwrap();

        buf.release();
        buf.release();

        assert!(matches!(buf.as_slice(), Err(Error::Released)));
        assert!(matches!(buf.as_mut_slice(), Err(Error::Released)));
        assert!(matches!(buf.write(0, &[1]), Err(Error::Released)));
        let mut out = [0u8; 1];
        assert!(matches!(buf.read_into(0, &mut out), Err(Error::Released)));
        assert!(matches!(buf.set_len(1), Err(Error::Released)));

        // Observers stay callable.
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf.len(), 0);

        // Drop after explicit release must not double-free.
        drop(buf);
    }

    #[test]
    fn move_transfers_ownership_without_wiping() {
        fn consume(buf: SecureBuffer) -> SecureBuffer {
            buf
        }

        let mut buf = SecureBuffer::new(16).expect("failed to allocate");
        buf.write(0, &[0x5A; 16]).unwrap();

        let buf = consume(buf);
        assert_eq!(buf.as_slice().unwrap(), &[0x5A; 16]);
    }

    #[test]
    fn debug_never_shows_contents() {
        let mut buf = SecureBuffer::new(8).expect("failed to allocate");
        buf.write(0, &[0xD7; 8]).unwrap();
        let repr = format!("{buf:?}");
        assert!(repr.contains("capacity"));
        assert!(!repr.contains("0xd7") && !repr.contains("215"));
    }
}
