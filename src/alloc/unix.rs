use core::ptr::{self, NonNull};
use std::io;

use libc::{MAP_ANON, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE};

/// Maps `size` bytes of anonymous, private, zero-filled memory.
///
/// On Linux the mapping is also excluded from core dumps
/// (`MADV_DONTDUMP`; `MADV_NOCORE` on FreeBSD/DragonFly); if that advice
/// is refused the mapping is unmapped and the error propagated rather
/// than handing out an extent with weaker guarantees than requested.
pub(crate) fn alloc(size: usize) -> io::Result<NonNull<u8>> {
    let mmap = unsafe {
        libc::mmap(
            ptr::null_mut(),
            size,
            PROT_WRITE | PROT_READ,
            MAP_PRIVATE | MAP_ANON,
            -1,
            0,
        )
    };

    if mmap == MAP_FAILED {
        return Err(io::Error::last_os_error());
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    let madvise_result = unsafe { libc::madvise(mmap, size, libc::MADV_DONTDUMP) };
    #[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
    let madvise_result = unsafe { libc::madvise(mmap, size, libc::MADV_NOCORE) };
    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "dragonfly"
    )))]
    let madvise_result = 0;

    if madvise_result < 0 {
        let last_os_error = io::Error::last_os_error();
        unsafe { libc::munmap(mmap, size) };
        return Err(last_os_error);
    }

    Ok(unsafe { NonNull::new_unchecked(mmap as *mut u8) })
}

/// Locks the extent into physical RAM, preventing it from being paged
/// out to swap. Wraps `mlock`.
pub(crate) fn lock(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
    match unsafe { libc::mlock(ptr.as_ptr() as *mut _, size) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Releases the residency guarantee. Wraps `munlock`.
pub(crate) fn unlock(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
    match unsafe { libc::munlock(ptr.as_ptr() as *mut _, size) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Returns the extent to the operating system. Wraps `munmap`.
pub(crate) fn free(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
    match unsafe { libc::munmap(ptr.as_ptr() as *mut _, size) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

pub(crate) fn page_size() -> usize {
    #[cfg(target_os = "macos")]
    unsafe {
        libc::vm_page_size
    }
    #[cfg(not(target_os = "macos"))]
    unsafe {
        libc::sysconf(libc::_SC_PAGESIZE) as usize
    }
}
