//! The owned buffer holding all planes of a picture.
use core::ptr::NonNull;

use image_aligned::{AllocConfig, Allocator, Diagnostics, RawBuf};

use crate::error::PictureError;
use crate::format::{FormatCode, MAX_PLANES};
use crate::layout::PictureLayout;

/// The lifecycle of a [`Picture`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PictureState {
    /// Never allocated.
    #[default]
    Uninitialized,
    /// Owns memory for all planes.
    Allocated,
    /// The memory was given back, the layout cleared.
    Released,
}

/// A picture whose planes share one aligned allocation.
///
/// Plane views are derived from the layout on each access, there are no stored plane pointers
/// that could outlive the allocation. Once released, all views return `None`.
///
/// ```
/// use image_planes::{Picture, PixelFormat};
///
/// let mut picture = Picture::alloc(PixelFormat::I420.into(), 16, 16)?;
/// picture.plane_mut(0).unwrap().fill(0x10);
/// picture.plane_mut(1).unwrap().fill(0x80);
///
/// assert_eq!(picture.plane(2).unwrap().len(), 8 * 8);
///
/// picture.release();
/// assert!(picture.plane(0).is_none());
/// # Ok::<(), image_planes::PictureError>(())
/// ```
#[derive(Debug, Default)]
pub struct Picture {
    buf: Option<RawBuf>,
    layout: PictureLayout,
    state: PictureState,
}

impl Picture {
    /// Allocate a picture with the platform allocator configuration.
    pub fn alloc(code: FormatCode, width: u32, height: u32) -> Result<Self, PictureError> {
        Self::alloc_in(&Allocator::new(AllocConfig::platform()), code, width, height)
    }

    /// Allocate a picture with a specific allocator.
    ///
    /// Nothing is allocated when the format is unsupported. When allocation fails the
    /// allocator's diagnostics are informed once and the error is returned.
    pub fn alloc_in<D: Diagnostics>(
        allocator: &Allocator<D>,
        code: FormatCode,
        width: u32,
        height: u32,
    ) -> Result<Self, PictureError> {
        let layout = PictureLayout::new(code, width, height)?;
        let buf = allocator.allocate(layout.total_size())?;

        tracing::trace!(
            %code,
            width,
            height,
            total = layout.total_size(),
            strategy = ?buf.strategy(),
            "picture allocated"
        );

        Ok(Picture {
            buf: Some(buf),
            layout,
            state: PictureState::Allocated,
        })
    }

    /// Free the memory of all planes and clear the layout.
    ///
    /// Calling this again, or on a picture that was never allocated, does nothing.
    pub fn release(&mut self) {
        if let Some(buf) = self.buf.take() {
            buf.release();
            self.state = PictureState::Released;
        }

        self.layout = PictureLayout::EMPTY;
    }

    pub fn state(&self) -> PictureState {
        self.state
    }

    pub fn is_allocated(&self) -> bool {
        self.state == PictureState::Allocated
    }

    /// The layout of all planes, empty unless allocated.
    pub fn layout(&self) -> &PictureLayout {
        &self.layout
    }

    pub fn code(&self) -> FormatCode {
        self.layout.code()
    }

    pub fn plane_count(&self) -> usize {
        self.layout.plane_count()
    }

    /// The bytes of all planes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.buf {
            Some(buf) => buf.as_bytes(),
            None => &[],
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.buf {
            Some(buf) => buf.as_bytes_mut(),
            None => &mut [],
        }
    }

    /// The bytes of one plane.
    pub fn plane(&self, idx: usize) -> Option<&[u8]> {
        let range = self.layout.plane_range(idx)?;
        self.buf.as_ref()?.as_bytes().get(range)
    }

    pub fn plane_mut(&mut self, idx: usize) -> Option<&mut [u8]> {
        let range = self.layout.plane_range(idx)?;
        self.buf.as_mut()?.as_bytes_mut().get_mut(range)
    }

    /// The samples of one plane, e.g. `u16` for high depth pictures.
    pub fn plane_as<T: bytemuck::Pod>(&self, idx: usize) -> Option<&[T]> {
        bytemuck::try_cast_slice(self.plane(idx)?).ok()
    }

    pub fn plane_as_mut<T: bytemuck::Pod>(&mut self, idx: usize) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(self.plane_mut(idx)?).ok()
    }

    /// A read-only pointer to the start of a plane.
    ///
    /// Usable while the picture is shared without mutable access. The pointer is valid for the
    /// plane's size until the picture is released or dropped, and must not be written through.
    pub fn plane_as_ptr(&self, idx: usize) -> Option<*const u8> {
        self.plane(idx).map(<[u8]>::as_ptr)
    }

    /// A pointer to the start of a plane, for writers that work on raw memory.
    ///
    /// The pointer is valid for the plane's size until the picture is released or dropped.
    pub fn plane_ptr(&mut self, idx: usize) -> Option<NonNull<u8>> {
        NonNull::new(self.plane_mut(idx)?.as_mut_ptr())
    }

    /// Mutable views of all planes at once.
    ///
    /// Planes the format does not have are empty.
    pub fn planes_mut(&mut self) -> [&mut [u8]; MAX_PLANES] {
        let sizes = self.layout.all_sizes();
        let mut rest = self.as_bytes_mut();

        sizes.map(|size| {
            let (plane, tail) = core::mem::take(&mut rest).split_at_mut(size);
            rest = tail;
            plane
        })
    }
}
