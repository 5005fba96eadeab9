//! The diagnostics collaborator informed about failed allocations.

/// Receives one report per failed allocation.
///
/// The allocator never retries, so a report always corresponds to an error returned to the
/// caller.
pub trait Diagnostics {
    fn allocation_failed(&self, size: usize);
}

/// Reports through `tracing` at error level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn allocation_failed(&self, size: usize) {
        tracing::error!("allocation of {} bytes failed", size);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &'_ D {
    fn allocation_failed(&self, size: usize) {
        (**self).allocation_failed(size)
    }
}
