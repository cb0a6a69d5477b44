//! Error types for screenmatch.

use thiserror::Error;

/// Result alias for screenmatch operations.
pub type Result<T> = std::result::Result<T, ScreenMatchError>;

/// Errors that can occur when searching for patterns or waiting on a screen.
///
/// Argument and bounds errors indicate programmer error and are never retried.
/// A wait that runs out of time is not an error; it yields `Ok(None)`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScreenMatchError {
    /// The input data or parameters are invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Pixel buffer length does not match `width * height`.
    #[error("pixel buffer holds {got} values, expected {expected}")]
    BufferSizeMismatch { expected: usize, got: usize },
    /// A pixel coordinate lies outside the image.
    #[error("pixel ({x}, {y}) is outside a {width}x{height} image")]
    PixelOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// An index (row, column, ...) is out of bounds.
    #[error("{context} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// A rectangular region does not fit inside the image.
    #[error(
        "region {width}x{height} at ({x}, {y}) exceeds a {img_width}x{img_height} image"
    )]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Cross-validated finders returned different results.
    #[error("{operation}: {message}")]
    ConsistencyViolation {
        operation: &'static str,
        message: String,
    },
    /// Image decoding, encoding, or file access failed.
    #[error("image I/O error: {reason}")]
    ImageIo { reason: String },
    /// The wait was cancelled through its handle before it finished.
    #[error("wait cancelled")]
    Cancelled,
    /// The worker running an asynchronous wait went away without a result.
    #[error("wait worker terminated without producing a result")]
    WorkerLost,
    /// The worker pool could not be created.
    #[error("thread pool error: {reason}")]
    ThreadPool { reason: String },
}

impl ScreenMatchError {
    /// Returns true for argument errors detected at the call boundary.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::BufferSizeMismatch { .. }
        )
    }

    /// Returns true for coordinate or region errors.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(
            self,
            Self::PixelOutOfBounds { .. }
                | Self::IndexOutOfBounds { .. }
                | Self::RegionOutOfBounds { .. }
        )
    }
}
