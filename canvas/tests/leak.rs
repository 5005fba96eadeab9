//! Every allocation of a picture is matched by exactly one deallocation.
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use image_planes::{
    allocate_buffer, release_buffer, AllocConfig, Allocator, FormatCode, Picture, PixelFormat,
};

struct Counting;

thread_local! {
    static ALLOCS: Cell<usize> = const { Cell::new(0) };
    static FREES: Cell<usize> = const { Cell::new(0) };
}

fn bump(counter: &'static std::thread::LocalKey<Cell<usize>>) {
    let _ = counter.try_with(|c| c.set(c.get() + 1));
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            bump(&ALLOCS);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            bump(&ALLOCS);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        bump(&FREES);
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn counts() -> (usize, usize) {
    (ALLOCS.with(Cell::get), FREES.with(Cell::get))
}

const FORMATS: [PixelFormat; 5] = [
    PixelFormat::I420,
    PixelFormat::Nv21,
    PixelFormat::Uyvy,
    PixelFormat::Yv24,
    PixelFormat::Bgr,
];

fn cycle(allocator: &Allocator) {
    for format in FORMATS {
        for (width, height) in [(16, 16), (1920, 1080)] {
            let code = FormatCode::new(format);
            let mut picture = Picture::alloc_in(allocator, code, width, height).unwrap();
            assert!(picture.is_allocated());
            release_buffer(&mut picture);
            release_buffer(&mut picture);
        }
    }
}

#[test]
fn allocate_and_release_are_paired() {
    let configs = [
        AllocConfig::platform(),
        AllocConfig::platform().with_huge_pages(false),
        AllocConfig::platform()
            .with_huge_pages(false)
            .with_native_aligned(false),
    ];

    // Let lazily initialized statics settle first.
    cycle(&Allocator::new(AllocConfig::platform()));

    for config in configs {
        let allocator = Allocator::new(config);
        let (allocs, frees) = counts();

        cycle(&allocator);

        let (allocs_after, frees_after) = counts();
        let allocated = allocs_after - allocs;
        assert_eq!(allocated, FORMATS.len() * 2, "{:?}", config);
        assert_eq!(frees_after - frees, allocated, "{:?}", config);
    }

    // Dropping without an explicit release frees as well.
    let (allocs, frees) = counts();
    drop(allocate_buffer(PixelFormat::I422.into(), 640, 480).unwrap());
    assert_eq!(counts(), (allocs + 1, frees + 1));

    // Rejected formats never allocate.
    let (allocs, frees) = counts();
    assert!(allocate_buffer(FormatCode::NONE, 640, 480).is_err());
    assert_eq!(counts(), (allocs, frees));
}
