//! Allocator configuration.

/// Which allocation paths an [`Allocator`](crate::Allocator) may take.
///
/// A plain value, chosen once when the allocator is built. The default reflects the
/// capabilities of the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AllocConfig {
    /// Try huge page backed allocations for requests above the threshold.
    ///
    /// Default: `true` on Linux, where transparent huge pages can be requested.
    pub huge_pages: bool,
    /// Use the aligned allocation primitive of the system allocator.
    ///
    /// When disabled, memory is over-allocated with byte alignment and an aligned interior
    /// region is handed out instead. Default: `true`.
    pub native_aligned: bool,
}

impl AllocConfig {
    /// Whether the platform can back allocations with huge pages.
    pub const HUGE_PAGES_SUPPORTED: bool = cfg!(target_os = "linux");

    /// The configuration matching the platform capabilities.
    pub const fn platform() -> Self {
        AllocConfig {
            huge_pages: Self::HUGE_PAGES_SUPPORTED,
            native_aligned: true,
        }
    }

    #[must_use]
    pub const fn with_huge_pages(self, huge_pages: bool) -> Self {
        AllocConfig { huge_pages, ..self }
    }

    #[must_use]
    pub const fn with_native_aligned(self, native_aligned: bool) -> Self {
        AllocConfig {
            native_aligned,
            ..self
        }
    }
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self::platform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_follows_platform() {
        let config = AllocConfig::default();
        assert_eq!(config.huge_pages, cfg!(target_os = "linux"));
        assert!(config.native_aligned);
    }

    #[test]
    fn builders_touch_one_field() {
        let config = AllocConfig::platform()
            .with_huge_pages(false)
            .with_native_aligned(false);
        assert!(!config.huge_pages);
        assert!(!config.native_aligned);
    }
}
