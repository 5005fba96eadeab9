use crate::align::HUGE_PAGE_THRESHOLD;
use crate::config::AllocConfig;
use crate::error::AllocError;
use crate::log::{Diagnostics, TracingDiagnostics};
use crate::raw::{RawBuf, Strategy};

/// Chooses an allocation path per request and reports failures.
///
/// Requests of at least [`HUGE_PAGE_THRESHOLD`] bytes first try a huge page aligned allocation,
/// when enabled. Everything else, and huge page requests the system could not serve, use the
/// standard aligned path. The returned [`RawBuf`] records which path was taken, so releasing it
/// never needs a hint from the caller.
///
/// ```
/// use image_aligned::{AllocConfig, Allocator, Strategy, NATIVE_ALIGN};
///
/// let allocator = Allocator::new(AllocConfig::platform().with_huge_pages(false));
/// let buf = allocator.allocate(1000)?;
///
/// assert_eq!(buf.strategy(), Strategy::Native);
/// assert_eq!(buf.as_ptr() as usize % NATIVE_ALIGN, 0);
/// allocator.release(buf);
/// # Ok::<(), image_aligned::AllocError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Allocator<D = TracingDiagnostics> {
    config: AllocConfig,
    diagnostics: D,
}

impl Allocator {
    /// An allocator reporting failures through `tracing`.
    pub const fn new(config: AllocConfig) -> Self {
        Allocator {
            config,
            diagnostics: TracingDiagnostics,
        }
    }
}

impl<D: Diagnostics> Allocator<D> {
    /// An allocator reporting failures to a custom collaborator.
    pub const fn with_diagnostics(config: AllocConfig, diagnostics: D) -> Self {
        Allocator {
            config,
            diagnostics,
        }
    }

    pub fn config(&self) -> AllocConfig {
        self.config
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// The path a request of `size` bytes tries first.
    ///
    /// The huge page path may still fall back to the standard one when the system can not
    /// provide such an allocation. For the padded path the offset depends on the address the
    /// system returns, so this reports `Padded { offset: 0 }`; compare with
    /// `matches!(.., Strategy::Padded { .. })` instead of equality.
    pub fn strategy_for(&self, size: usize) -> Strategy {
        if size == 0 {
            Strategy::Dangling
        } else if self.config.huge_pages && size >= HUGE_PAGE_THRESHOLD {
            Strategy::HugePage
        } else if self.config.native_aligned {
            Strategy::Native
        } else {
            // The offset is only known once allocated.
            Strategy::Padded { offset: 0 }
        }
    }

    /// Allocate at least `size` zeroed bytes aligned to [`NATIVE_ALIGN`](crate::NATIVE_ALIGN).
    ///
    /// On failure the diagnostics collaborator receives exactly one report.
    pub fn allocate(&self, size: usize) -> Result<RawBuf, AllocError> {
        if let Strategy::Dangling = self.strategy_for(size) {
            return Ok(RawBuf::dangling());
        }

        if let Strategy::HugePage = self.strategy_for(size) {
            match RawBuf::huge(size) {
                Some(buf) => return Ok(buf),
                None => tracing::debug!(size, "huge page allocation failed, using standard path"),
            }
        }

        let buf = if self.config.native_aligned {
            RawBuf::native(size)
        } else {
            RawBuf::padded(size)
        };

        buf.ok_or_else(|| {
            self.diagnostics.allocation_failed(size);
            AllocError { size }
        })
    }

    /// Free a buffer allocated by any allocator.
    pub fn release(&self, buf: RawBuf) {
        buf.release()
    }
}
