// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! # Aligned
//!
//! Raw, zero-initialized allocations for image data.
//!
//! Every allocation starts at an address aligned to [`NATIVE_ALIGN`], enough for the vector
//! loads of the target. Large requests are additionally aligned to a huge page and the kernel is
//! asked to back them with huge pages, which reduces TLB pressure when walking big frames. The
//! returned [`RawBuf`] is tagged with the [`Strategy`] that produced it and frees itself
//! accordingly.
//!
//! ## Usage
//!
//! ```
//! let mut buf = image_aligned::allocate(1920 * 1080)?;
//! buf.as_bytes_mut().fill(0x10);
//! image_aligned::release(buf);
//! # Ok::<(), image_aligned::AllocError>(())
//! ```
// Only `raw` and `huge` are allowed to be `unsafe`, besides the `Pod` impl of the aligned unit.
#![deny(unsafe_code)]

mod align;
mod allocator;
mod config;
mod error;
mod huge;
mod log;
mod raw;

pub use self::align::{
    align_down, align_up, padding_for, NativeAligned, HUGE_PAGE_SIZE, HUGE_PAGE_THRESHOLD,
    NATIVE_ALIGN,
};
pub use self::allocator::Allocator;
pub use self::config::AllocConfig;
pub use self::error::AllocError;
pub use self::log::{Diagnostics, TracingDiagnostics};
pub use self::raw::{RawBuf, Strategy};

/// Allocate with the platform configuration, see [`Allocator::allocate`].
pub fn allocate(size: usize) -> Result<RawBuf, AllocError> {
    Allocator::new(AllocConfig::platform()).allocate(size)
}

/// Free a buffer, see [`RawBuf::release`].
pub fn release(buf: RawBuf) {
    buf.release()
}
