//! Advice to back memory with transparent huge pages.
//!
//! This is purely a performance hint. The kernel may refuse it, for example when transparent
//! huge pages are disabled, which is never an error for the caller.
use core::ptr::NonNull;

#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
pub(crate) fn advise(ptr: NonNull<u8>, capacity: usize) {
    use crate::align::{align_down, HUGE_PAGE_SIZE};

    // Only whole huge pages, all of them inside the allocation.
    let len = align_down(capacity, HUGE_PAGE_SIZE);
    if len == 0 {
        return;
    }

    // SAFETY: `ptr` starts an allocation of at least `capacity >= len` bytes that is aligned to
    // `HUGE_PAGE_SIZE`, hence also to the system page size. The advice does not change contents.
    let ret = unsafe { libc::madvise(ptr.as_ptr().cast(), len, libc::MADV_HUGEPAGE) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        tracing::debug!(len, %err, "huge page advice rejected");
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn advise(_: NonNull<u8>, _: usize) {}
