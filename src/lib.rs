//! Streaming band-limited sample-rate conversion.
//!
//! [`Resampler`] converts a mono `f32` stream by an arbitrary, possibly time-varying factor
//! (output rate / input rate). Every output sample is the convolution of the input with a
//! Kaiser-windowed sinc low-pass, evaluated at the exact fractional read position through a
//! phase table with linear interpolation between phases. When downsampling the filter is
//! stretched so its cutoff follows the output Nyquist frequency of the current factor.
//!
//! Input and output are exchanged in blocks of any size. The resampler keeps the input
//! history the filter needs across calls, so the produced samples are the same no matter
//! how the stream is split up.
//!
//! ```rust
//! use bandlimit::Resampler;
//!
//! let input: Vec<f32> = (0..4096).map(|i| (i as f32 / 100.0).sin()).collect();
//! let mut resampler = Resampler::new(true, 0.5, 0.5).unwrap();
//!
//! let mut output = Vec::new();
//! let mut block = [0.0f32; 256];
//! let mut position = 0;
//! loop {
//!     let chunk = &input[position..(position + 512).min(input.len())];
//!     let last = position + chunk.len() == input.len();
//!     let processed = resampler.process(0.5, chunk, last, &mut block).unwrap();
//!     position += processed.input_consumed;
//!     output.extend_from_slice(&block[..processed.output_generated]);
//!     if resampler.is_finished() {
//!         break;
//!     }
//! }
//!
//! assert_eq!(output.len(), 2048);
//! ```

mod engine;
mod error;
mod filter;
mod fir;
mod history;
mod resampler;
mod window;

pub use error::{ResampleError, ResampleResult};
pub use filter::FilterQuality;
pub use resampler::{Processed, Resampler};
