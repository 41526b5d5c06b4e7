use std::io;

/// Errors surfaced by [`SecureBuffer`](crate::SecureBuffer) operations.
///
/// Construction failures (`Alloc`, `Lock`) carry the underlying OS error so
/// callers can distinguish heap/address-space exhaustion from a denied
/// memory-lock request and react accordingly (e.g. reduce concurrent
/// secure-buffer usage when `RLIMIT_MEMLOCK` is the bottleneck).
///
/// `Bounds` and `Released` are programming errors: the operation is refused
/// before any byte is read or written.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The operating system refused to map memory for the buffer,
    /// or the requested capacity was zero.
    #[error("secure memory allocation failed")]
    Alloc(#[source] io::Error),

    /// The operating system denied the request to lock the mapping into
    /// physical RAM (resource limit reached or missing privilege).
    ///
    /// Construction never proceeds without the lock: the mapping acquired
    /// before the failed lock request is unmapped before this is returned.
    #[error("memory lock request denied by the operating system")]
    Lock(#[source] io::Error),

    /// An access at `offset..offset + requested` fell outside `0..limit`
    /// (`limit` is the capacity for writes, the current length for reads).
    #[error("out-of-bounds access: {requested} bytes at offset {offset} (limit {limit})")]
    Bounds {
        /// Start of the requested range.
        offset: usize,
        /// Number of bytes requested.
        requested: usize,
        /// Exclusive upper bound the range was checked against.
        limit: usize,
    },

    /// The buffer has been released; its backing memory is gone and no
    /// further access is possible.
    #[error("secure buffer already released")]
    Released,
}

impl Error {
    pub(crate) fn bounds(offset: usize, requested: usize, limit: usize) -> Self {
        Self::Bounds {
            offset,
            requested,
            limit,
        }
    }
}
