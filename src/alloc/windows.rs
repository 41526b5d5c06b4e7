use core::{
    mem::MaybeUninit,
    ptr::{self, NonNull},
};
use std::io;

use windows_sys::Win32::System::{
    Memory::{
        VirtualAlloc, VirtualFree, VirtualLock, VirtualUnlock, MEM_COMMIT, MEM_RELEASE,
        MEM_RESERVE, PAGE_READWRITE,
    },
    SystemInformation::GetSystemInfo,
};

/// Commits `size` bytes of zero-filled pages. Wraps `VirtualAlloc`.
pub(crate) fn alloc(size: usize) -> io::Result<NonNull<u8>> {
    let virt_alloc = unsafe {
        VirtualAlloc(
            ptr::null_mut(),
            size,
            MEM_COMMIT | MEM_RESERVE,
            PAGE_READWRITE,
        )
    };

    match NonNull::new(virt_alloc as *mut u8) {
        Some(ptr) => Ok(ptr),
        None => Err(io::Error::last_os_error()),
    }
}

/// Locks the extent into the working set, preventing it from being
/// written to the pagefile. Wraps `VirtualLock`.
pub(crate) fn lock(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
    match unsafe { VirtualLock(ptr.as_ptr() as *mut _, size) } {
        0 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Releases the residency guarantee. Wraps `VirtualUnlock`.
pub(crate) fn unlock(ptr: NonNull<u8>, size: usize) -> io::Result<()> {
    match unsafe { VirtualUnlock(ptr.as_ptr() as *mut _, size) } {
        0 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Returns the extent to the operating system. Wraps `VirtualFree`,
/// which releases the whole reservation and ignores `size`.
pub(crate) fn free(ptr: NonNull<u8>, _size: usize) -> io::Result<()> {
    match unsafe { VirtualFree(ptr.as_ptr() as *mut _, 0, MEM_RELEASE) } {
        0 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

pub(crate) fn page_size() -> usize {
    let mut system_info = MaybeUninit::uninit();
    unsafe {
        GetSystemInfo(system_info.as_mut_ptr());
        (*system_info.as_ptr()).dwPageSize as usize
    }
}
