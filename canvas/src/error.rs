use image_aligned::AllocError;

use crate::format::FormatCode;

/// Errors of computing a layout or allocating a picture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PictureError {
    /// The code is reserved, unknown, or names a format without a plane geometry.
    #[error("unsupported pixel format {0}")]
    UnsupportedFormat(FormatCode),

    /// The planes together would exceed the address space.
    #[error("picture dimensions too large: {width}x{height}")]
    TooLarge { width: u32, height: u32 },

    #[error(transparent)]
    AllocationFailed(#[from] AllocError),
}
