use tracing::trace;

use crate::filter::MAX_HALF_WIDTH;

/// Smallest number of real samples the history accepts between two discards.
const MIN_CAPACITY: usize = 4096;

/// Sliding window over the input stream.
///
/// Samples are addressed by their absolute position in the stream: the first sample ever
/// appended sits at position 0. The window starts out holding `half_width` zeros at the
/// negative positions so the very first output has a full (silent) left half.
///
/// Storage is a double-sized buffer: retained samples live in
/// `buffer[read_position..read_position + available]` and are only copied back to the
/// front when an append would run past the end.
#[derive(Debug, Clone)]
pub(crate) struct InputHistory {
    buffer: Box<[f32]>,
    /// Index of the oldest retained sample inside `buffer`.
    read_position: usize,
    /// Number of retained samples, starting at `read_position`.
    available: usize,
    /// Absolute stream position of `buffer[read_position]`.
    origin: i64,
    /// Upper bound of `available` for appended input.
    capacity: usize,
    half_width: usize,
}

impl InputHistory {
    pub(crate) fn new(half_width: usize) -> Self {
        debug_assert!(half_width <= MAX_HALF_WIDTH);
        let capacity = (4 * half_width).max(MIN_CAPACITY);
        // The flush padding may land on top of a full window.
        let buffer = vec![0.0; 2 * capacity + half_width].into_boxed_slice();

        let mut history = InputHistory {
            buffer,
            read_position: 0,
            available: 0,
            origin: 0,
            capacity,
            half_width,
        };
        history.reset();
        history
    }

    /// Drops all retained input and restores the silent prefix.
    pub(crate) fn reset(&mut self) {
        self.buffer[..self.half_width].fill(0.0);
        self.read_position = 0;
        self.available = self.half_width;
        self.origin = -(self.half_width as i64);
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Absolute position of the oldest retained sample.
    pub(crate) fn start(&self) -> i64 {
        self.origin
    }

    /// Absolute position one past the newest retained sample.
    pub(crate) fn end(&self) -> i64 {
        self.origin + self.available as i64
    }

    /// Appends as many samples as fit and returns how many were taken.
    pub(crate) fn append(&mut self, samples: &[f32]) -> usize {
        let count = samples
            .len()
            .min(self.capacity.saturating_sub(self.available));
        if count == 0 {
            return 0;
        }

        let write_position = self.make_room(count);
        self.buffer[write_position..write_position + count].copy_from_slice(&samples[..count]);
        self.available += count;
        count
    }

    /// Pads the tail with `half_width` zeros so the filter can reach past the last sample.
    pub(crate) fn flush(&mut self) {
        let write_position = self.make_room(self.half_width);
        self.buffer[write_position..write_position + self.half_width].fill(0.0);
        self.available += self.half_width;
        trace!(end = self.end(), "zero-padded input tail");
    }

    /// Evicts every sample whose absolute position is below `position - half_width`.
    pub(crate) fn discard_before(&mut self, position: i64) {
        let keep_from = position - self.half_width as i64;
        let evict = (keep_from - self.origin).clamp(0, self.available as i64) as usize;

        self.read_position += evict;
        self.available -= evict;
        self.origin += evict as i64;
    }

    /// Returns `len` contiguous samples starting at absolute position `start`.
    ///
    /// # Panics
    ///
    /// If any of the requested samples was already discarded or not yet appended. The engine
    /// only asks for samples it made sure to retain, so this is a logic error.
    pub(crate) fn window(&self, start: i64, len: usize) -> &[f32] {
        assert!(
            start >= self.origin && start + len as i64 <= self.end(),
            "input history lost samples {start}..{} (retained {}..{})",
            start + len as i64,
            self.origin,
            self.end(),
        );

        let offset = self.read_position + (start - self.origin) as usize;
        &self.buffer[offset..offset + len]
    }

    /// Returns the index at which `count` more samples can be written, compacting first if
    /// they would not fit behind the retained window.
    fn make_room(&mut self, count: usize) -> usize {
        if self.read_position + self.available + count > self.buffer.len() {
            self.buffer.copy_within(
                self.read_position..self.read_position + self.available,
                0,
            );
            self.read_position = 0;
        }
        self.read_position + self.available
    }
}
