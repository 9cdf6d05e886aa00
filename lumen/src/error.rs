//! Error types for kernel operations.

use thiserror::Error;

/// Errors reported by kernel operations.
///
/// Precondition violations (bad dimensions, short buffers, bad parameters) are
/// rejected before any pixel is touched, so a failed call leaves the buffer
/// unchanged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid image dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Pixel buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Invalid kernel size {0}: must be odd and between 1 and 65535")]
    InvalidKernelSize(usize),

    #[error(
        "Invalid Gaussian sigma {0}: must be finite and non-negative with a kernel radius \
         of at most {max}",
        max = crate::convolution::MAX_GAUSSIAN_RADIUS
    )]
    InvalidSigma(f32),

    #[error("No cached forward transform to invert")]
    NoCachedTransform,

    #[error(
        "Buffer dimensions {actual_width}x{actual_height} do not match the cached transform \
         ({expected_width}x{expected_height})"
    )]
    SpectrumDimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse engine configuration")]
    Config(#[from] common::SerdeFormatError),

    #[error("Failed to build worker thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
