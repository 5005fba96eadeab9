//! Pixel format codes and their plane geometry.
use core::fmt;

use crate::error::PictureError;

/// A raw pixel format code, possibly carrying flags.
///
/// The low byte selects a [`PixelFormat`], the remaining bits are flags. Only
/// [`FormatCode::HIGH_DEPTH`] changes the geometry, [`FormatCode::VFLIP`] is carried along for
/// the consumers of the picture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FormatCode(pub u32);

/// A pixel format with a known plane structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, Y then U then V.
    I420 = 0x0001,
    /// Planar YUV 4:2:0, Y then V then U.
    Yv12 = 0x0002,
    /// Y plane followed by an interleaved UV plane, 4:2:0.
    Nv12 = 0x0003,
    /// Y plane followed by an interleaved VU plane, 4:2:0.
    Nv21 = 0x0004,
    /// Planar YUV 4:2:2, Y then U then V.
    I422 = 0x0005,
    /// Planar YUV 4:2:2, Y then V then U.
    Yv16 = 0x0006,
    /// Y plane followed by an interleaved UV plane, 4:2:2.
    Nv16 = 0x0007,
    /// Packed YUYV 4:2:2.
    Yuyv = 0x0008,
    /// Packed UYVY 4:2:2.
    Uyvy = 0x0009,
    /// Packed 10-bit YUV 4:2:2. Its rows are grouped in blocks, there is no per-pixel geometry.
    V210 = 0x000a,
    /// Planar YUV 4:4:4, Y then U then V.
    I444 = 0x000b,
    /// Planar YUV 4:4:4, Y then V then U.
    Yv24 = 0x000c,
    /// Packed BGR, 24 bits.
    Bgr = 0x000d,
    /// Packed BGR with alpha, 32 bits.
    Bgra = 0x000e,
    /// Packed RGB, 24 bits.
    Rgb = 0x000f,
}

/// The geometry of each plane of a format, relative to the full picture.
///
/// Scales are fixed point fractions where 256 is 1.0. A width scale also includes the number of
/// bytes per sample, a packed BGR plane for instance has a width scale of 768.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    planes: u8,
    width_fix8: [u16; 3],
    height_fix8: [u16; 3],
}

/// The largest number of planes of any format.
pub const MAX_PLANES: usize = 3;

const ONE: u16 = 256;
const HALF: u16 = 128;

const YUV420: FormatDescriptor = FormatDescriptor::planar([ONE, HALF, HALF], [ONE, HALF, HALF]);
const YUV422: FormatDescriptor = FormatDescriptor::planar([ONE, HALF, HALF], [ONE, ONE, ONE]);
const YUV444: FormatDescriptor = FormatDescriptor::planar([ONE, ONE, ONE], [ONE, ONE, ONE]);
const SEMI420: FormatDescriptor = FormatDescriptor::semi_planar([ONE, ONE], [ONE, HALF]);
const SEMI422: FormatDescriptor = FormatDescriptor::semi_planar([ONE, ONE], [ONE, ONE]);
const PACKED_2: FormatDescriptor = FormatDescriptor::packed(2 * ONE);
const PACKED_3: FormatDescriptor = FormatDescriptor::packed(3 * ONE);
const PACKED_4: FormatDescriptor = FormatDescriptor::packed(4 * ONE);

impl FormatCode {
    /// The reserved code of no format.
    pub const NONE: Self = FormatCode(0x0000);
    /// The first code past all known formats.
    pub const MAX: Self = FormatCode(0x0010);
    /// Selects the format from a code.
    pub const MASK: u32 = 0x00ff;
    /// The picture is stored bottom row first.
    pub const VFLIP: u32 = 0x1000;
    /// Samples are 16 bits wide instead of 8.
    pub const HIGH_DEPTH: u32 = 0x2000;

    /// The code of a format, without flags.
    pub const fn new(format: PixelFormat) -> Self {
        FormatCode(format as u32)
    }

    /// Add flag bits.
    #[must_use]
    pub const fn with_flags(self, flags: u32) -> Self {
        FormatCode(self.0 | flags)
    }

    #[must_use]
    pub const fn high_depth(self) -> Self {
        self.with_flags(Self::HIGH_DEPTH)
    }

    /// The format selected by this code, if it is a known one.
    ///
    /// Returns `None` for [`Self::NONE`], [`Self::MAX`] and everything beyond.
    pub const fn format(self) -> Option<PixelFormat> {
        use PixelFormat::*;
        Some(match self.0 & Self::MASK {
            0x01 => I420,
            0x02 => Yv12,
            0x03 => Nv12,
            0x04 => Nv21,
            0x05 => I422,
            0x06 => Yv16,
            0x07 => Nv16,
            0x08 => Yuyv,
            0x09 => Uyvy,
            0x0a => V210,
            0x0b => I444,
            0x0c => Yv24,
            0x0d => Bgr,
            0x0e => Bgra,
            0x0f => Rgb,
            _ => return None,
        })
    }

    /// Resolve to the format and its plane geometry.
    ///
    /// Fails with [`PictureError::UnsupportedFormat`] for reserved codes and for formats
    /// without a plane geometry.
    pub fn resolve(self) -> Result<(PixelFormat, &'static FormatDescriptor), PictureError> {
        self.format()
            .and_then(|format| Some((format, format.descriptor()?)))
            .ok_or(PictureError::UnsupportedFormat(self))
    }

    /// Bytes per sample, 2 for high depth codes and 1 otherwise.
    pub const fn depth_factor(self) -> u8 {
        if self.0 & Self::HIGH_DEPTH != 0 {
            2
        } else {
            1
        }
    }

    pub const fn is_vflip(self) -> bool {
        self.0 & Self::VFLIP != 0
    }
}

impl From<PixelFormat> for FormatCode {
    fn from(format: PixelFormat) -> Self {
        FormatCode::new(format)
    }
}

impl fmt::Display for FormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

impl PixelFormat {
    /// The plane geometry, if this format has a per-pixel one.
    pub const fn descriptor(self) -> Option<&'static FormatDescriptor> {
        use PixelFormat::*;
        Some(match self {
            I420 | Yv12 => &YUV420,
            Nv12 | Nv21 => &SEMI420,
            I422 | Yv16 => &YUV422,
            Nv16 => &SEMI422,
            Yuyv | Uyvy => &PACKED_2,
            I444 | Yv24 => &YUV444,
            Bgr | Rgb => &PACKED_3,
            Bgra => &PACKED_4,
            V210 => return None,
        })
    }
}

impl FormatDescriptor {
    const fn planar(width_fix8: [u16; 3], height_fix8: [u16; 3]) -> Self {
        FormatDescriptor {
            planes: 3,
            width_fix8,
            height_fix8,
        }
    }

    const fn semi_planar(width: [u16; 2], height: [u16; 2]) -> Self {
        FormatDescriptor {
            planes: 2,
            width_fix8: [width[0], width[1], 0],
            height_fix8: [height[0], height[1], 0],
        }
    }

    const fn packed(width: u16) -> Self {
        FormatDescriptor {
            planes: 1,
            width_fix8: [width, 0, 0],
            height_fix8: [ONE, 0, 0],
        }
    }

    /// The number of planes, between 1 and [`MAX_PLANES`].
    pub const fn plane_count(&self) -> usize {
        self.planes as usize
    }

    /// The fixed point width and height scales of all planes, in memory order.
    pub fn scales(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        let planes = self.plane_count();
        self.width_fix8[..planes]
            .iter()
            .copied()
            .zip(self.height_fix8[..planes].iter().copied())
    }

    /// The fixed point width and height scale of a plane.
    pub fn scale(&self, plane: usize) -> Option<(u16, u16)> {
        if plane < self.plane_count() {
            Some((self.width_fix8[plane], self.height_fix8[plane]))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PixelFormat; 15] = {
        use PixelFormat::*;
        [
            I420, Yv12, Nv12, Nv21, I422, Yv16, Nv16, Yuyv, Uyvy, V210, I444, Yv24, Bgr, Bgra, Rgb,
        ]
    };

    #[test]
    fn codes_round_trip_through_flags() {
        for format in ALL {
            let code = FormatCode::new(format).with_flags(FormatCode::VFLIP);
            assert_eq!(code.format(), Some(format));
            assert!(code.is_vflip());
            assert_eq!(code.high_depth().depth_factor(), 2);
            assert_eq!(code.depth_factor(), 1);
        }
    }

    #[test]
    fn sentinels_are_unknown() {
        assert_eq!(FormatCode::NONE.format(), None);
        assert_eq!(FormatCode::MAX.format(), None);
        assert_eq!(FormatCode(0xff).format(), None);
        assert_eq!(FormatCode::NONE.high_depth().format(), None);
    }

    #[test]
    fn descriptors_are_consistent() {
        for format in ALL {
            let Some(desc) = format.descriptor() else {
                assert_eq!(format, PixelFormat::V210);
                continue;
            };

            assert!((1..=MAX_PLANES).contains(&desc.plane_count()));
            for plane in 0..desc.plane_count() {
                let (w, h) = desc.scale(plane).unwrap();
                assert!(w > 0 && h > 0, "{:?} plane {}", format, plane);
            }
            assert_eq!(desc.scale(desc.plane_count()), None);
        }
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(FormatCode::MAX.to_string(), "0x0010");
        assert_eq!(
            PictureError::UnsupportedFormat(FormatCode::NONE).to_string(),
            "unsupported pixel format 0x0000"
        );
    }

    #[test]
    fn v210_is_not_allocatable() {
        let err = FormatCode::new(PixelFormat::V210).resolve().unwrap_err();
        assert_eq!(
            err,
            PictureError::UnsupportedFormat(FormatCode::new(PixelFormat::V210))
        );
    }
}
