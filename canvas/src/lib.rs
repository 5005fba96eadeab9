//! Planar and packed picture buffers in one aligned allocation.
//!
//! A [`FormatCode`] names a pixel format and its flags. Together with the dimensions it
//! determines a [`PictureLayout`]: the stride, size and offset of every plane. A [`Picture`]
//! allocates the total size at once and hands out views of the individual planes.
//!
//! Pixel values are never interpreted here, this only computes geometry and owns the storage.
//!
//! # Usage
//!
//! Allocating a 4:2:0 picture for an encoder:
//! 1. Pick the format code, with [`FormatCode::HIGH_DEPTH`] for 16-bit samples
//! 2. Allocate the picture with width and height
//! 3. Fill each plane through its view
//!
//! ```
//! use image_planes::{FormatCode, Picture, PixelFormat};
//!
//! let code = FormatCode::new(PixelFormat::I420).high_depth();
//! let mut picture = Picture::alloc(code, 64, 48)?;
//!
//! let [luma, cb, cr] = picture.planes_mut();
//! assert_eq!(luma.len(), 64 * 2 * 48);
//! assert_eq!(cb.len(), cr.len());
//!
//! let luma: &mut [u16] = picture.plane_as_mut(0).unwrap();
//! luma.fill(64 << 2);
//! # Ok::<(), image_planes::PictureError>(())
//! ```
#![deny(unsafe_code)]

mod error;
mod format;
mod layout;
mod picture;


pub use self::error::PictureError;
pub use self::format::{FormatCode, FormatDescriptor, PixelFormat, MAX_PLANES};
pub use self::layout::{PictureLayout, PlaneLayout};
pub use self::picture::{Picture, PictureState};

pub use image_aligned::{AllocConfig, AllocError, Allocator, Diagnostics, Strategy};

/// Compute the plane layout of a picture, see [`PictureLayout::new`].
pub fn compute_layout(
    code: FormatCode,
    width: u32,
    height: u32,
) -> Result<PictureLayout, PictureError> {
    PictureLayout::new(code, width, height)
}

/// Allocate a picture, see [`Picture::alloc`].
pub fn allocate_buffer(
    code: FormatCode,
    width: u32,
    height: u32,
) -> Result<Picture, PictureError> {
    Picture::alloc(code, width, height)
}

/// Release the memory of a picture, see [`Picture::release`].
pub fn release_buffer(picture: &mut Picture) {
    picture.release()
}
