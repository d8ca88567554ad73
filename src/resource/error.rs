//! Resource pipeline errors.

use thiserror::Error;

/// Failure while answering a resource request.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource needs to write data but never installed a write callback.
    /// This is a defect in the resource implementation.
    #[error("ResourceResponse::set_write_callback must be called when resource data needs to be written")]
    MissingWriteCallback,

    /// I/O failure while streaming the body. Headers may already be committed.
    #[error("failed to stream resource data: {0}")]
    Stream(#[from] std::io::Error),
}
