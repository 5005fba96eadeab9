// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Alignment constants of the host.

macro_rules! def_native_align {
    (
        $($($arch:literal),* = $num:literal),*
    ) => {
        $(
            /// A byte-like-type that is aligned to the native alignment.
            ///
            /// This type does not contain padding and implements `Pod`. Its alignment is the
            /// widest vector load the target commonly performs on image rows.
            #[cfg(
                any($(target_arch = $arch),*),
            )]
            #[derive(Clone, Copy)]
            #[repr(align($num))]
            #[repr(C)]
            pub struct NativeAligned(pub(crate) [u8; $num]);

            #[cfg(
                any($(target_arch = $arch),*),
            )]
            pub const NATIVE_ALIGN: usize = $num;
        )*


        #[cfg(
            not(any(
                $(any($(target_arch = $arch),*)),*
            )),
        )]
        #[derive(Clone, Copy)]
        #[repr(align(8))]
        #[repr(C)]
        pub struct NativeAligned(pub(crate) [u8; 8]);

        #[cfg(
            not(any(
                $(any($(target_arch = $arch),*)),*
            )),
        )]
        pub const NATIVE_ALIGN: usize = 8;
    }
}

def_native_align! {
    "x86", "x86_64" = 32,
    "arm" = 16,
    "aarch64" = 16,
    "wasm32" = 16
}

// SAFETY: a plain byte array with alignment equal to its size, no padding.
#[allow(unsafe_code)]
unsafe impl bytemuck::Zeroable for NativeAligned {}
#[allow(unsafe_code)]
unsafe impl bytemuck::Pod for NativeAligned {}

/// The size of a transparent huge page.
pub const HUGE_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Requests of at least this many bytes try to use huge pages.
pub const HUGE_PAGE_THRESHOLD: usize = HUGE_PAGE_SIZE / 8 * 7;

const _: () = {
    assert!(NATIVE_ALIGN.is_power_of_two());
    assert!(core::mem::size_of::<NativeAligned>() == NATIVE_ALIGN);
    assert!(core::mem::align_of::<NativeAligned>() == NATIVE_ALIGN);
    assert!(HUGE_PAGE_SIZE.is_power_of_two());
};

/// Round `value` up to a multiple of `align`, which must be a power of two.
///
/// Returns `None` if the result does not fit into a `usize`.
#[inline]
pub const fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Round `value` down to a multiple of `align`, which must be a power of two.
#[inline]
pub const fn align_down(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    value & !(align - 1)
}

/// The number of bytes to skip from `addr` to reach the next multiple of `align`.
///
/// Unlike `align_up`, this can not fail: the result is always less than `align`.
#[inline]
pub const fn padding_for(addr: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    addr.wrapping_neg() & (align - 1)
}

/// The capacity reserved for a huge page request of `size` bytes.
///
/// A request that ends within an eighth of a page below a huge page boundary is extended to that
/// boundary, so the last page can be backed by a huge page as well. Everything else is kept
/// exact, a mostly empty trailing huge page would only waste memory.
pub(crate) const fn huge_capacity(size: usize) -> Option<usize> {
    let slack = HUGE_PAGE_SIZE - HUGE_PAGE_THRESHOLD;
    match size.checked_add(slack) {
        Some(padded) => {
            let rounded = align_down(padded, HUGE_PAGE_SIZE);
            if rounded > size {
                Some(rounded)
            } else {
                Some(size)
            }
        }
        None => None,
    }
}
