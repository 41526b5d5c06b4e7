//! Platform layer: anonymous page mappings that can be locked into RAM.
//!
//! Every function here is a thin wrapper over one system call, returning
//! `io::Result` built from `io::Error::last_os_error()`; policy (when to
//! lock, when to wipe, what to do on failure) lives in the buffer type.

use std::sync::OnceLock;

#[cfg(target_family = "unix")]
mod unix;
#[cfg(target_family = "unix")]
pub(crate) use unix::{alloc, free, lock, unlock};

#[cfg(target_family = "windows")]
mod windows;
#[cfg(target_family = "windows")]
pub(crate) use windows::{alloc, free, lock, unlock};

/// Retrieves the system's page size.
///
/// Queried once (`sysconf(_SC_PAGESIZE)` on unix, `GetSystemInfo` on
/// windows) and cached for the lifetime of the process.
pub(crate) fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

    #[cfg(target_family = "unix")]
    {
        *PAGE_SIZE.get_or_init(unix::page_size)
    }
    #[cfg(target_family = "windows")]
    {
        *PAGE_SIZE.get_or_init(windows::page_size)
    }
}

/// Rounds `len` up to a whole number of pages.
///
/// Locking operates at page granularity, so the buffer maps, locks, and
/// wipes the full rounded extent; the slack beyond the requested capacity
/// is never exposed through the API but is still covered by the wipe.
pub(crate) fn page_aligned(len: usize) -> usize {
    let page = page_size();
    match len % page {
        0 => len,
        rem => len + (page - rem),
    }
}
