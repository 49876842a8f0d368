use tracing::{debug, trace};

use crate::{
    FilterQuality,
    engine::{ResamplerEngine, StreamState},
    error::{ResampleError, ResampleResult},
    filter::FilterTable,
};

/// Outcome of a single [`Resampler::process`] call.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Processed {
    /// Input samples taken from the source buffer. The rest must be offered again.
    pub input_consumed: usize,
    /// Output samples written to the front of the destination buffer.
    pub output_generated: usize,
}

/// Streaming band-limited resampler for a single mono stream.
///
/// The resample factor (output rate / input rate) is passed to every
/// [`process`](Self::process) call and may change between calls, as long as it stays
/// inside the range given at construction. Input and output may be chunked arbitrarily:
/// for a fixed factor the produced samples do not depend on the block sizes.
///
/// The output is time-aligned with the input: output sample `n` sits at input position
/// `n / factor`.
#[derive(Debug, Clone)]
pub struct Resampler {
    table: FilterTable,
    engine: ResamplerEngine,
    min_factor: f64,
    max_factor: f64,
}

impl Resampler {
    /// Create a new [`Resampler`].
    ///
    /// Parameters are:
    /// - `interpolate_filter`: `true` selects the longer, more accurate filter
    ///   ([`FilterQuality::Best`]), `false` the faster one ([`FilterQuality::Fast`]).
    /// - `min_factor`: Smallest factor any process call will use.
    /// - `max_factor`: Largest factor any process call will use.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bandlimit::Resampler;
    ///
    /// // Convert 44.1 kHz to 48 kHz.
    /// let factor = 48000.0 / 44100.0;
    /// let resampler = Resampler::new(true, factor, factor).unwrap();
    /// assert!(resampler.filter_width() > 0);
    /// ```
    pub fn new(
        interpolate_filter: bool,
        min_factor: f64,
        max_factor: f64,
    ) -> ResampleResult<Self> {
        Self::with_quality(
            FilterQuality::from(interpolate_filter),
            min_factor,
            max_factor,
        )
    }

    /// Create a new [`Resampler`] with an explicit [`FilterQuality`].
    ///
    /// ## Errors
    ///
    /// [`ResampleError::InvalidFactorRange`] unless `0 < min_factor <= max_factor` with both
    /// finite. [`ResampleError::FilterTooWide`] if `min_factor` is so small that the
    /// stretched filter would not fit the history.
    pub fn with_quality(
        quality: FilterQuality,
        min_factor: f64,
        max_factor: f64,
    ) -> ResampleResult<Self> {
        let valid = min_factor.is_finite()
            && max_factor.is_finite()
            && min_factor > 0.0
            && min_factor <= max_factor;
        if !valid {
            return Err(ResampleError::InvalidFactorRange {
                min: min_factor,
                max: max_factor,
            });
        }

        let table = FilterTable::new(quality, min_factor)?;
        let engine = ResamplerEngine::new(&table);

        debug!(
            ?quality,
            min_factor,
            max_factor,
            filter_width = table.half_width(),
            capacity = engine.capacity(),
            "created resampler"
        );

        Ok(Resampler {
            table,
            engine,
            min_factor,
            max_factor,
        })
    }

    /// Number of input samples on each side of the read position the filter looks at.
    ///
    /// Constant for the lifetime of the resampler. The last outputs of a stream are computed
    /// against the zero padding behind the input and are less accurate.
    pub fn filter_width(&self) -> usize {
        self.table.half_width()
    }

    /// Filter design this resampler was created with.
    pub fn quality(&self) -> FilterQuality {
        self.table.quality()
    }

    /// Smallest factor accepted by [`process`](Self::process).
    pub fn min_factor(&self) -> f64 {
        self.min_factor
    }

    /// Largest factor accepted by [`process`](Self::process).
    pub fn max_factor(&self) -> f64 {
        self.max_factor
    }

    /// Returns `true` once the last block has been fully drained.
    pub fn is_finished(&self) -> bool {
        self.engine.state() == StreamState::Done
    }

    /// Upper bound of the output samples a stream of `input_len` samples yields in total.
    pub fn output_len_bound(&self, input_len: usize) -> usize {
        (input_len as f64 * self.max_factor).ceil() as usize + 2
    }

    /// Resample the next block of the stream.
    ///
    /// This is a streaming API: `input` is taken in as far as the internal history has room,
    /// and `output` receives as many samples as the available look-ahead allows. Set `last`
    /// on the final block; the stream is then drained to its end over as many calls as the
    /// destination size requires, and afterwards every call returns zero counts.
    ///
    /// ## Returns
    ///
    /// [`Processed`] with the number of consumed input samples (unconsumed ones must be
    /// offered again) and the number of samples written to the front of `output`.
    ///
    /// ## Errors
    ///
    /// [`ResampleError::FactorOutOfRange`] if `factor` lies outside the configured range.
    /// The resampler state is left untouched.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use bandlimit::Resampler;
    ///
    /// let mut resampler = Resampler::new(true, 0.5, 2.0).unwrap();
    /// let input: Vec<f32> = (0..1000).map(|i| (i as f32 / 50.0).sin()).collect();
    /// let mut output = vec![0.0f32; resampler.output_len_bound(input.len())];
    ///
    /// let processed = resampler.process(2.0, &input, true, &mut output).unwrap();
    /// assert_eq!(processed.input_consumed, 1000);
    /// assert_eq!(processed.output_generated, 2000);
    /// ```
    pub fn process(
        &mut self,
        factor: f64,
        input: &[f32],
        last: bool,
        output: &mut [f32],
    ) -> ResampleResult<Processed> {
        self.check_factor(factor)?;
        Ok(self
            .engine
            .process(&self.table, factor, input, last, output))
    }

    /// Offset/length form of [`process`](Self::process).
    ///
    /// Reads `source[source_offset..source_offset + source_len]` and writes at most
    /// `dest_max_len` samples starting at `dest[dest_offset]`.
    ///
    /// ## Errors
    ///
    /// [`ResampleError::BufferRange`] if a range does not fit its buffer, in addition to the
    /// errors of [`process`](Self::process). The resampler state is left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn process_at(
        &mut self,
        factor: f64,
        source: &[f32],
        source_offset: usize,
        source_len: usize,
        last: bool,
        dest: &mut [f32],
        dest_offset: usize,
        dest_max_len: usize,
    ) -> ResampleResult<Processed> {
        check_range(source.len(), source_offset, source_len)?;
        check_range(dest.len(), dest_offset, dest_max_len)?;

        self.process(
            factor,
            &source[source_offset..source_offset + source_len],
            last,
            &mut dest[dest_offset..dest_offset + dest_max_len],
        )
    }

    /// Resets the resampler state, clearing all internal buffers.
    ///
    /// Call this when starting to process a new stream. The filter is kept.
    pub fn reset(&mut self) {
        self.engine.reset();
        trace!("resampler reset");
    }

    fn check_factor(&self, factor: f64) -> ResampleResult<()> {
        // Written so that NaN fails the check.
        if factor >= self.min_factor && factor <= self.max_factor {
            return Ok(());
        }

        debug!(factor, min = self.min_factor, max = self.max_factor, "rejected factor");
        Err(ResampleError::FactorOutOfRange {
            factor,
            min: self.min_factor,
            max: self.max_factor,
        })
    }
}

fn check_range(capacity: usize, offset: usize, len: usize) -> ResampleResult<()> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(ResampleError::BufferRange {
            offset,
            len,
            capacity,
        }),
    }
}
