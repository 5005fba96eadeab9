// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
#![allow(unsafe_code)]

use core::ptr::NonNull;
use core::{fmt, slice};
use std::alloc::{self, Layout};

use crate::align::{huge_capacity, padding_for, NativeAligned, HUGE_PAGE_SIZE, NATIVE_ALIGN};
use crate::huge;

/// The allocation path that produced a [`RawBuf`].
///
/// The tag is all that release needs to find the original allocation again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Aligned to a huge page and advised to be backed by huge pages.
    HugePage,
    /// Aligned by the system allocator itself.
    Native,
    /// Over-allocated with byte alignment, the usable region starts `offset` bytes into it.
    Padded { offset: usize },
    /// A zero-sized request, no memory was allocated.
    Dangling,
}

/// An owned, zero-initialized allocation of at least `len` bytes.
///
/// The start is aligned to at least [`NATIVE_ALIGN`]. Dropping the buffer, or passing it to
/// [`RawBuf::release`], frees the memory with the inverse of the [`Strategy`] that produced it.
pub struct RawBuf {
    /// Aligned start of the usable region.
    ptr: NonNull<u8>,
    /// The number of bytes requested.
    len: usize,
    /// The number of usable bytes starting at `ptr`, at least `len`.
    capacity: usize,
    /// The layout handed to the system allocator. Unused for `Dangling`.
    layout: Layout,
    strategy: Strategy,
}

// SAFETY: `RawBuf` uniquely owns its allocation, just like a `Vec<u8>`.
unsafe impl Send for RawBuf {}
unsafe impl Sync for RawBuf {}

impl RawBuf {
    /// A buffer of zero bytes that never touches the allocator.
    pub(crate) fn dangling() -> Self {
        RawBuf {
            ptr: NonNull::<NativeAligned>::dangling().cast(),
            len: 0,
            capacity: 0,
            layout: Layout::new::<NativeAligned>(),
            strategy: Strategy::Dangling,
        }
    }

    /// Allocate `size > 0` bytes aligned to a huge page, advising the kernel to use huge pages.
    pub(crate) fn huge(size: usize) -> Option<Self> {
        debug_assert!(size > 0);
        let capacity = huge_capacity(size)?;
        let layout = Layout::from_size_align(capacity, HUGE_PAGE_SIZE).ok()?;
        // SAFETY: the layout has a non-zero size.
        let ptr = NonNull::new(unsafe { alloc::alloc(layout) })?;
        // Advise before the first touch so the zeroing below already faults in huge pages.
        huge::advise(ptr, capacity);
        // SAFETY: `ptr` is valid for writes of `capacity` bytes.
        unsafe { ptr.as_ptr().write_bytes(0, capacity) };

        Some(RawBuf {
            ptr,
            len: size,
            capacity,
            layout,
            strategy: Strategy::HugePage,
        })
    }

    /// Allocate `size > 0` bytes with the aligned primitive of the system allocator.
    pub(crate) fn native(size: usize) -> Option<Self> {
        debug_assert!(size > 0);
        let layout = Layout::from_size_align(size, NATIVE_ALIGN).ok()?;
        // SAFETY: the layout has a non-zero size.
        let ptr = NonNull::new(unsafe { alloc::alloc_zeroed(layout) })?;

        Some(RawBuf {
            ptr,
            len: size,
            capacity: size,
            layout,
            strategy: Strategy::Native,
        })
    }

    /// Allocate `size > 0` bytes without relying on an aligned primitive.
    ///
    /// Reserves `NATIVE_ALIGN - 1` extra bytes so an aligned region of `size` bytes always fits.
    pub(crate) fn padded(size: usize) -> Option<Self> {
        debug_assert!(size > 0);
        let total = size.checked_add(NATIVE_ALIGN - 1)?;
        let layout = Layout::from_size_align(total, 1).ok()?;
        // SAFETY: the layout has a non-zero size.
        let base = NonNull::new(unsafe { alloc::alloc_zeroed(layout) })?;

        // Infallible from here on, `base` must not leak.
        let offset = padding_for(base.addr().get(), NATIVE_ALIGN);
        debug_assert!(offset < NATIVE_ALIGN);
        // SAFETY: `offset + size <= total`, so this stays within the allocation.
        let ptr = unsafe { base.add(offset) };

        Some(RawBuf {
            ptr,
            len: size,
            capacity: size,
            layout,
            strategy: Strategy::Padded { offset },
        })
    }

    /// Free the allocation now.
    ///
    /// Equivalent to dropping the buffer.
    pub fn release(self) {
        drop(self)
    }

    /// The allocation path this buffer was created by.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The number of bytes requested.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of bytes usable from the start, never less than [`Self::len`].
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// The aligned start of the buffer.
    pub fn as_non_null(&self) -> NonNull<u8> {
        self.ptr
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len` initialized bytes, or dangling and aligned for `len == 0`.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_bytes`, and we hold the unique reference to the allocation.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// View the bytes as a slice of plain old data.
    ///
    /// Fails if `T` requires more than the native alignment or the length is not a multiple of
    /// its size.
    pub fn as_slice_of<T: bytemuck::Pod>(&self) -> Option<&[T]> {
        bytemuck::try_cast_slice(self.as_bytes()).ok()
    }

    /// View the bytes as a mutable slice of plain old data.
    pub fn as_mut_slice_of<T: bytemuck::Pod>(&mut self) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(self.as_bytes_mut()).ok()
    }
}

impl Drop for RawBuf {
    fn drop(&mut self) {
        match self.strategy {
            Strategy::Dangling => {}
            Strategy::HugePage | Strategy::Native => {
                // SAFETY: allocated with exactly this layout and not freed before.
                unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
            }
            Strategy::Padded { offset } => {
                // SAFETY: `ptr` was derived as `base + offset` from an allocation with `layout`.
                unsafe {
                    let base = self.ptr.as_ptr().sub(offset);
                    alloc::dealloc(base, self.layout)
                }
            }
        }
    }
}

impl fmt::Debug for RawBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuf")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("strategy", &self.strategy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_aligned(buf: &RawBuf, align: usize) -> bool {
        buf.as_ptr().addr() % align == 0
    }

    #[test]
    fn native_is_zeroed_and_aligned() {
        let buf = RawBuf::native(100).unwrap();
        assert_eq!(buf.strategy(), Strategy::Native);
        assert!(is_aligned(&buf, NATIVE_ALIGN));
        assert_eq!(buf.len(), 100);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn padded_offset_stays_within_slack() {
        for size in [1, 7, 31, 32, 33, 4096] {
            let mut buf = RawBuf::padded(size).unwrap();
            match buf.strategy() {
                Strategy::Padded { offset } => {
                    assert!(offset < NATIVE_ALIGN);
                    let base = buf.as_ptr().addr() - offset;
                    assert_eq!(offset, padding_for(base, NATIVE_ALIGN));
                }
                other => panic!("unexpected strategy {:?}", other),
            }
            assert!(is_aligned(&buf, NATIVE_ALIGN));
            // The whole region is writable.
            buf.as_bytes_mut().fill(0xa5);
            assert!(buf.as_bytes().iter().all(|&b| b == 0xa5));
        }
    }

    #[test]
    fn huge_is_page_aligned() {
        let buf = RawBuf::huge(HUGE_PAGE_SIZE + 1).unwrap();
        assert_eq!(buf.strategy(), Strategy::HugePage);
        assert!(is_aligned(&buf, HUGE_PAGE_SIZE));
        assert!(buf.capacity() >= buf.len());
        assert_eq!(buf.as_bytes().last(), Some(&0));
    }

    #[test]
    fn dangling_is_empty_and_aligned() {
        let buf = RawBuf::dangling();
        assert!(buf.is_empty());
        assert!(is_aligned(&buf, NATIVE_ALIGN));
        assert_eq!(buf.as_bytes(), &[] as &[u8]);
    }

    #[test]
    fn overflowing_requests_fail() {
        assert!(RawBuf::native(usize::MAX).is_none());
        assert!(RawBuf::padded(usize::MAX).is_none());
        assert!(RawBuf::huge(usize::MAX).is_none());
    }

    #[test]
    fn typed_views() {
        let mut buf = RawBuf::native(8).unwrap();
        buf.as_mut_slice_of::<u16>().unwrap()[3] = 0xffff;
        assert_eq!(buf.as_slice_of::<u16>().unwrap(), &[0, 0, 0, 0xffff]);
        assert!(buf.as_slice_of::<[u8; 3]>().is_none());
    }
}
