use thiserror::Error;

/// Result type used by the resampler.
pub type ResampleResult<T> = Result<T, ResampleError>;

/// Errors the resampler reports to its caller.
///
/// A full destination buffer is not an error: [`crate::Processed`] simply reports fewer
/// generated samples and the caller calls again.
#[derive(Debug, Error, Copy, Clone, PartialEq)]
pub enum ResampleError {
    /// The factor bounds given at construction are unusable.
    #[error("invalid factor range: min {min} must be > 0 and <= max {max}")]
    InvalidFactorRange { min: f64, max: f64 },

    /// The smallest factor stretches the filter beyond the supported history size.
    #[error("min factor {min} needs a filter wider than {max_half_width} taps per side")]
    FilterTooWide { min: f64, max_half_width: usize },

    /// The factor passed to a process call lies outside the configured bounds.
    #[error("factor {factor} outside configured range [{min}, {max}]")]
    FactorOutOfRange { factor: f64, min: f64, max: f64 },

    /// An offset/length pair does not fit inside the lent buffer.
    #[error("buffer range {offset}..{offset}+{len} exceeds buffer of {capacity} samples")]
    BufferRange {
        offset: usize,
        len: usize,
        capacity: usize,
    },
}
