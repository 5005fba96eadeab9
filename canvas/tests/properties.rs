use image_planes::{compute_layout, FormatCode, PictureError, PixelFormat};
use proptest::prelude::*;

fn arb_supported() -> impl Strategy<Value = FormatCode> {
    let formats = prop_oneof![
        Just(PixelFormat::I420),
        Just(PixelFormat::Yv12),
        Just(PixelFormat::Nv12),
        Just(PixelFormat::Nv21),
        Just(PixelFormat::I422),
        Just(PixelFormat::Yv16),
        Just(PixelFormat::Nv16),
        Just(PixelFormat::Yuyv),
        Just(PixelFormat::Uyvy),
        Just(PixelFormat::I444),
        Just(PixelFormat::Yv24),
        Just(PixelFormat::Bgr),
        Just(PixelFormat::Bgra),
        Just(PixelFormat::Rgb),
    ];

    (formats, any::<bool>(), any::<bool>()).prop_map(|(format, high, flip)| {
        let mut code = FormatCode::new(format);
        if high {
            code = code.high_depth();
        }
        if flip {
            code = code.with_flags(FormatCode::VFLIP);
        }
        code
    })
}

proptest! {
    #[test]
    fn offsets_accumulate_sizes(
        code in arb_supported(),
        width in 1u32..8192,
        height in 1u32..8192,
    ) {
        let layout = compute_layout(code, width, height).unwrap();

        let mut expected = 0;
        for (size, offset) in layout.sizes().iter().zip(layout.offsets()) {
            prop_assert_eq!(*offset, expected);
            expected += size;
        }
        prop_assert_eq!(layout.total_size(), expected);
        prop_assert_eq!(layout.sizes().iter().sum::<usize>(), layout.total_size());
    }

    #[test]
    fn strides_scale_with_depth(
        code in arb_supported(),
        width in 1u32..8192,
        height in 1u32..64,
    ) {
        let narrow = compute_layout(FormatCode(code.0 & !FormatCode::HIGH_DEPTH), width, height)
            .unwrap();
        let wide = compute_layout(code.high_depth(), width, height).unwrap();

        for (n, w) in narrow.strides().iter().zip(wide.strides()) {
            prop_assert_eq!(n * 2, *w);
        }
        prop_assert_eq!(narrow.total_size() * 2, wide.total_size());
        prop_assert!(narrow.strides()[0] >= width as usize);
    }

    #[test]
    fn unknown_codes_are_rejected(
        low in prop_oneof![Just(0u32), 0x10u32..0x100],
        flags in prop_oneof![Just(0u32), Just(FormatCode::VFLIP), Just(FormatCode::HIGH_DEPTH)],
    ) {
        let code = FormatCode(low | flags);
        prop_assert_eq!(
            compute_layout(code, 64, 64),
            Err(PictureError::UnsupportedFormat(code))
        );
    }
}
