//! Computes the plane geometry of a picture.
use core::ops::Range;

use crate::error::PictureError;
use crate::format::{FormatCode, MAX_PLANES};

/// The byte layout of all planes of a picture within one allocation.
///
/// Planes follow each other without padding: the first starts at offset zero, every other one
/// right where the previous one ends, and the total size is the sum of all plane sizes.
///
/// ```
/// use image_planes::{PixelFormat, PictureLayout};
///
/// let layout = PictureLayout::new(PixelFormat::Nv12.into(), 64, 32)?;
/// assert_eq!(layout.strides(), &[64, 64]);
/// assert_eq!(layout.offsets(), &[0, 64 * 32]);
/// assert_eq!(layout.total_size(), 64 * 32 + 64 * 16);
/// # Ok::<(), image_planes::PictureError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PictureLayout {
    code: FormatCode,
    width: u32,
    height: u32,
    planes: u8,
    /// Bytes per row of each plane.
    stride: [usize; MAX_PLANES],
    /// Rows of each plane.
    rows: [usize; MAX_PLANES],
    /// Bytes of each plane, `rows * stride`.
    size: [usize; MAX_PLANES],
    /// Start of each plane within the allocation.
    offset: [usize; MAX_PLANES],
    total: usize,
}

/// The geometry of one plane within a [`PictureLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaneLayout {
    pub stride: usize,
    pub rows: usize,
    pub size: usize,
    pub offset: usize,
}

impl PictureLayout {
    /// The layout without any planes, which a released picture is reset to.
    pub const EMPTY: Self = PictureLayout {
        code: FormatCode::NONE,
        width: 0,
        height: 0,
        planes: 0,
        stride: [0; MAX_PLANES],
        rows: [0; MAX_PLANES],
        size: [0; MAX_PLANES],
        offset: [0; MAX_PLANES],
        total: 0,
    };

    /// Compute the layout of a picture with the given format and dimensions.
    ///
    /// Each plane has a stride of `(width * width_scale) >> 8` samples and
    /// `(height * height_scale) >> 8` rows. Samples are two bytes wide for high depth codes.
    pub fn new(code: FormatCode, width: u32, height: u32) -> Result<Self, PictureError> {
        let (_, descriptor) = code.resolve()?;
        let too_large = PictureError::TooLarge { width, height };
        let depth = u64::from(code.depth_factor());

        let mut layout = PictureLayout {
            code,
            width,
            height,
            planes: descriptor.plane_count() as u8,
            ..Self::EMPTY
        };

        // Strides and rows fit a u64, a scale is at most 4 * 256 and a dimension is a u32.
        let mut total: u64 = 0;
        for (plane, (width_fix8, height_fix8)) in descriptor.scales().enumerate() {
            let stride = ((u64::from(width) * u64::from(width_fix8)) >> 8) * depth;
            let rows = (u64::from(height) * u64::from(height_fix8)) >> 8;
            let size = rows.checked_mul(stride).ok_or(too_large)?;

            layout.stride[plane] = addressable(stride).ok_or(too_large)?;
            layout.rows[plane] = addressable(rows).ok_or(too_large)?;
            layout.size[plane] = addressable(size).ok_or(too_large)?;
            layout.offset[plane] = addressable(total).ok_or(too_large)?;
            total = total.checked_add(size).ok_or(too_large)?;
        }

        layout.total = addressable(total).ok_or(too_large)?;
        Ok(layout)
    }

    pub fn code(&self) -> FormatCode {
        self.code
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn plane_count(&self) -> usize {
        usize::from(self.planes)
    }

    /// The number of bytes needed for all planes together.
    pub fn total_size(&self) -> usize {
        self.total
    }

    pub fn strides(&self) -> &[usize] {
        &self.stride[..self.plane_count()]
    }

    pub fn sizes(&self) -> &[usize] {
        &self.size[..self.plane_count()]
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offset[..self.plane_count()]
    }

    /// The geometry of one plane, if it exists.
    pub fn plane(&self, idx: usize) -> Option<PlaneLayout> {
        if idx >= self.plane_count() {
            return None;
        }

        Some(PlaneLayout {
            stride: self.stride[idx],
            rows: self.rows[idx],
            size: self.size[idx],
            offset: self.offset[idx],
        })
    }

    /// The byte range of one plane within the allocation.
    pub fn plane_range(&self, idx: usize) -> Option<Range<usize>> {
        self.plane(idx).map(|plane| plane.byte_range())
    }

    /// Iterate over the geometry of all planes, in memory order.
    pub fn planes(&self) -> impl Iterator<Item = PlaneLayout> + '_ {
        (0..self.plane_count()).filter_map(|idx| self.plane(idx))
    }

    pub(crate) fn all_sizes(&self) -> [usize; MAX_PLANES] {
        self.size
    }
}

impl PlaneLayout {
    pub fn byte_range(&self) -> Range<usize> {
        self.offset..self.offset + self.size
    }
}

impl Default for PictureLayout {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Sizes must stay addressable by pointer offsets.
fn addressable(value: u64) -> Option<usize> {
    let value = usize::try_from(value).ok()?;
    (value <= isize::MAX as usize).then_some(value)
}
