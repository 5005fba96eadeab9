/// The system allocator had no memory for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("allocation of {size} bytes failed")]
pub struct AllocError {
    /// The number of bytes requested.
    pub size: usize,
}
