use tracing::trace;

use crate::{Processed, filter::FilterTable, fir, history::InputHistory};

/// Where a stream currently stands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum StreamState {
    /// Not enough look-ahead for the next output; more input is needed.
    Filling,
    /// Look-ahead available, outputs are produced while there is room.
    Producing,
    /// The last block was accepted and the tail is zero-padded.
    Draining,
    /// Every output of the stream has been produced.
    Done,
}

/// Fractional stepping state of one stream.
#[derive(Debug, Clone)]
pub(crate) struct ResamplerEngine {
    history: InputHistory,
    /// Absolute read position in input samples. Never rebased, so the rounding of the
    /// position sequence does not depend on how the stream is chunked.
    position: f64,
    state: StreamState,
    /// Number of real input samples, known once the last block was accepted.
    end: Option<i64>,
    /// Scratch tap row, `2 * half_width` long.
    row: Box<[f32]>,
    half_width: usize,
}

impl ResamplerEngine {
    pub(crate) fn new(table: &FilterTable) -> Self {
        let half_width = table.half_width();
        ResamplerEngine {
            history: InputHistory::new(half_width),
            position: 0.0,
            state: StreamState::Filling,
            end: None,
            row: vec![0.0; table.row_len()].into_boxed_slice(),
            half_width,
        }
    }

    pub(crate) fn state(&self) -> StreamState {
        self.state
    }

    pub(crate) fn capacity(&self) -> usize {
        self.history.capacity()
    }

    pub(crate) fn reset(&mut self) {
        self.history.reset();
        self.position = 0.0;
        self.state = StreamState::Filling;
        self.end = None;
    }

    /// Feeds `input` and fills `output` as far as the stream allows.
    ///
    /// Input is taken in as long as the history has room and outputs keep coming; `last`
    /// only starts the drain once every sample of `input` has been taken. `factor` must
    /// already be validated against the configured range.
    pub(crate) fn process(
        &mut self,
        table: &FilterTable,
        factor: f64,
        input: &[f32],
        last: bool,
        output: &mut [f32],
    ) -> Processed {
        if self.state == StreamState::Done {
            return Processed::default();
        }

        let mut consumed = 0;
        let mut generated = 0;

        loop {
            let accepted = match self.end {
                None => self.history.append(&input[consumed..]),
                Some(_) => 0,
            };
            consumed += accepted;

            if last && self.end.is_none() && consumed == input.len() {
                self.begin_drain();
            }

            let produced = self.produce(table, factor, &mut output[generated..]);
            generated += produced;
            self.history.discard_before(self.position.floor() as i64);

            let input_pending = self.end.is_none() && consumed < input.len();
            if self.state == StreamState::Done
                || generated == output.len()
                || !input_pending
                || (accepted == 0 && produced == 0)
            {
                break;
            }
        }

        Processed {
            input_consumed: consumed,
            output_generated: generated,
        }
    }

    fn begin_drain(&mut self) {
        let end = self.history.end();
        self.history.flush();
        self.end = Some(end);
        self.state = StreamState::Draining;
        trace!(end, "last block accepted, draining");
    }

    /// Produces outputs until `output` is full, look-ahead runs out or the stream ends.
    fn produce(&mut self, table: &FilterTable, factor: f64, output: &mut [f32]) -> usize {
        let step = factor.recip();
        let scale = factor.min(1.0);
        let reach = self.half_width as i64;

        let mut generated = 0;
        for sample in output.iter_mut() {
            let index = self.position.floor() as i64;

            match self.end {
                Some(end) if self.position >= end as f64 => break,
                None if index + reach >= self.history.end() => {
                    self.state = StreamState::Filling;
                    break;
                }
                Some(_) => {}
                None => self.state = StreamState::Producing,
            }

            debug_assert!(index - reach + 1 >= self.history.start());

            let frac = self.position - index as f64;
            table.fill_row(frac, scale, &mut self.row);
            let window = self.history.window(index - reach + 1, self.row.len());
            *sample = fir::convolve(window, &self.row);

            generated += 1;
            self.position += step;
        }

        if let Some(end) = self.end {
            if self.position >= end as f64 {
                self.state = StreamState::Done;
                trace!(position = self.position, "stream drained");
            }
        }

        generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterQuality;

    fn engine(min_factor: f64) -> (FilterTable, ResamplerEngine) {
        let table = FilterTable::new(FilterQuality::Best, min_factor).unwrap();
        let engine = ResamplerEngine::new(&table);
        (table, engine)
    }

    #[test]
    fn test_fills_until_look_ahead_is_available() {
        let (table, mut engine) = engine(1.0);
        let mut output = [0.0; 64];

        let processed = engine.process(&table, 1.0, &[0.0; 20], false, &mut output);
        assert_eq!(processed.input_consumed, 20);
        assert_eq!(processed.output_generated, 0);
        assert_eq!(engine.state(), StreamState::Filling);

        // Output i needs input i + 28; 40 samples give 12 outputs.
        let processed = engine.process(&table, 1.0, &[0.0; 20], false, &mut output);
        assert_eq!(processed.output_generated, 12);
        assert_eq!(engine.state(), StreamState::Filling);
    }

    #[test]
    fn test_full_destination_suspends_producing() {
        let (table, mut engine) = engine(1.0);
        let mut output = [0.0; 8];

        let processed = engine.process(&table, 1.0, &[0.25; 100], false, &mut output);
        assert_eq!(processed.input_consumed, 100);
        assert_eq!(processed.output_generated, 8);
        assert_eq!(engine.state(), StreamState::Producing);

        let processed = engine.process(&table, 1.0, &[], false, &mut output);
        assert_eq!(processed.output_generated, 8);
    }

    #[test]
    fn test_last_block_drains_to_done() {
        let (table, mut engine) = engine(1.0);
        let mut output = [0.0; 30];

        let processed = engine.process(&table, 1.0, &[1.0; 50], true, &mut output);
        assert_eq!(processed.input_consumed, 50);
        assert_eq!(processed.output_generated, 30);
        assert_eq!(engine.state(), StreamState::Draining);

        let processed = engine.process(&table, 1.0, &[], true, &mut output);
        assert_eq!(processed.output_generated, 20);
        assert_eq!(engine.state(), StreamState::Done);

        let processed = engine.process(&table, 1.0, &[1.0; 10], true, &mut output);
        assert_eq!(processed, Processed::default());
    }

    #[test]
    fn test_empty_stream_is_done_immediately() {
        let (table, mut engine) = engine(1.0);
        let mut output = [0.0; 4];

        let processed = engine.process(&table, 1.0, &[], true, &mut output);
        assert_eq!(processed, Processed::default());
        assert_eq!(engine.state(), StreamState::Done);
    }

    #[test]
    fn test_last_flag_waits_for_remaining_input() {
        let (table, mut engine) = engine(1.0);
        let input = vec![0.5; 3 * engine.capacity()];
        let mut output = vec![0.0; 16];

        // The destination fills up long before all input fits into the history.
        let processed = engine.process(&table, 1.0, &input, true, &mut output);
        assert!(processed.input_consumed < input.len());
        assert_eq!(processed.output_generated, 16);
        assert_ne!(engine.state(), StreamState::Draining);
    }

    #[test]
    fn test_downsampling_halves_output_count() {
        let (table, mut engine) = engine(0.5);
        let mut output = vec![0.0; 1000];

        let processed = engine.process(&table, 0.5, &[0.0; 1000], true, &mut output);
        assert_eq!(processed.input_consumed, 1000);
        assert_eq!(processed.output_generated, 500);
        assert_eq!(engine.state(), StreamState::Done);
    }

    #[test]
    fn test_dc_input_passes_with_unity_gain() {
        let (table, mut engine) = engine(0.5);
        let mut output = vec![0.0; 600];

        let processed = engine.process(&table, 0.75, &[1.0; 400], true, &mut output);
        let settled = &output[60..processed.output_generated - 60];
        assert!(settled.iter().all(|sample| (sample - 1.0).abs() < 5e-3));
    }

    #[test]
    fn test_reset_restarts_stream() {
        let (table, mut engine) = engine(1.0);
        let mut output = [0.0; 100];

        engine.process(&table, 1.0, &[1.0; 50], true, &mut output);
        engine.reset();
        assert_eq!(engine.state(), StreamState::Filling);

        let processed = engine.process(&table, 1.0, &[1.0; 50], true, &mut output);
        assert_eq!(processed.output_generated, 50);
    }
}
