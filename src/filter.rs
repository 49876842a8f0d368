use core::f64::consts::PI;

use tracing::debug;

use crate::{
    error::{ResampleError, ResampleResult},
    window::make_kaiser_wing,
};

/// Kaiser window shape of the low-pass prototype.
const KAISER_BETA: f64 = 6.0;
/// Passband edge as a fraction of the Nyquist frequency.
const ROLLOFF: f64 = 0.90;
/// History samples kept beyond the reach of the filter.
const WIDTH_MARGIN: usize = 10;
/// Largest half width a table is designed for. Keeps the history and tap row allocations
/// bounded for tiny minimum factors.
pub(crate) const MAX_HALF_WIDTH: usize = 1 << 20;

/// Filter design point. Both designs share the same passband and stopband tolerances and
/// only differ in length, and therefore in CPU cost and filter width.
///
/// Defaults to [`FilterQuality::Best`].
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterQuality {
    /// 5 zero crossings per side, 256 phases per zero crossing.
    Fast,
    /// 17 zero crossings per side, 4096 phases per zero crossing.
    #[default]
    Best,
}

impl FilterQuality {
    /// Number of zero crossings of the windowed sinc on each side of its center.
    pub const fn zero_crossings(self) -> usize {
        match self {
            FilterQuality::Fast => 5,
            FilterQuality::Best => 17,
        }
    }

    /// Number of table entries per zero crossing.
    pub const fn phases(self) -> usize {
        match self {
            FilterQuality::Fast => 256,
            FilterQuality::Best => 4096,
        }
    }
}

impl From<bool> for FilterQuality {
    /// `true` selects the larger, interpolating filter.
    fn from(interpolate_filter: bool) -> Self {
        match interpolate_filter {
            true => FilterQuality::Best,
            false => FilterQuality::Fast,
        }
    }
}

/// Windowed-sinc low-pass filter sampled at `phases` points per zero crossing.
///
/// Only the right wing of the symmetric impulse response is stored:
/// `coeffs[k] = h(k / phases)` for `k` in `0..=zero_crossings * phases`, with the unit of `x`
/// being one input sample at a factor of 1. `deltas[k]` holds the difference to the next
/// entry so a lookup between two phases is a first-order correction instead of a
/// recomputation. The tap row for any fractional position is gathered from this wing.
#[derive(Debug, Clone)]
pub(crate) struct FilterTable {
    quality: FilterQuality,
    phases: usize,
    zero_crossings: usize,
    /// Taps on each side of the current read position.
    half_width: usize,
    coeffs: Box<[f32]>,
    deltas: Box<[f32]>,
}

impl FilterTable {
    /// Designs the table for the given quality.
    ///
    /// The filter is stretched by `1 / factor` whenever the factor drops below 1, so the
    /// span it covers in input samples is largest at `min_factor`. The half width is sized
    /// for that worst case.
    ///
    /// Fails with [`ResampleError::FilterTooWide`] if that half width exceeds
    /// [`MAX_HALF_WIDTH`].
    pub(crate) fn new(quality: FilterQuality, min_factor: f64) -> ResampleResult<Self> {
        let half_width =
            half_width_for(quality, min_factor).ok_or(ResampleError::FilterTooWide {
                min: min_factor,
                max_half_width: MAX_HALF_WIDTH,
            })?;

        let phases = quality.phases();
        let zero_crossings = quality.zero_crossings();
        let points = zero_crossings * phases;

        let window = make_kaiser_wing(points, KAISER_BETA);
        let mut wing: Vec<f64> = window
            .iter()
            .enumerate()
            .map(|(index, w)| {
                let x = index as f64 / phases as f64;
                let sinc = match index == 0 {
                    true => ROLLOFF,
                    false => (PI * ROLLOFF * x).sin() / (PI * x),
                };
                sinc * w
            })
            .collect();

        // Unity DC gain: taps one input sample apart must sum to 1.
        let dc_gain = wing[0] + 2.0 * (1..=zero_crossings).map(|n| wing[n * phases]).sum::<f64>();
        wing.iter_mut().for_each(|value| *value /= dc_gain);

        let coeffs: Box<[f32]> = wing.iter().map(|&value| value as f32).collect();
        let deltas: Box<[f32]> = wing
            .windows(2)
            .map(|pair| (pair[1] - pair[0]) as f32)
            .chain(core::iter::once(0.0))
            .collect();

        debug!(
            ?quality,
            phases, zero_crossings, half_width, "designed low-pass filter table"
        );

        Ok(FilterTable {
            quality,
            phases,
            zero_crossings,
            half_width,
            coeffs,
            deltas,
        })
    }

    pub(crate) fn quality(&self) -> FilterQuality {
        self.quality
    }

    pub(crate) fn half_width(&self) -> usize {
        self.half_width
    }

    /// Length of a tap row: `2 * half_width`.
    pub(crate) fn row_len(&self) -> usize {
        2 * self.half_width
    }

    /// Impulse response at distance `x` (in filter units) from the center.
    #[inline]
    fn coefficient(&self, x: f64) -> f32 {
        let position = x * self.phases as f64;
        let index = position as usize;
        match (self.coeffs.get(index), self.deltas.get(index)) {
            (Some(&coeff), Some(&delta)) => coeff + delta * (position - index as f64) as f32,
            _ => 0.0,
        }
    }

    /// Gathers the tap row for an output at fractional offset `frac` past input sample `i`.
    ///
    /// `row[n]` weighs input sample `i - half_width + 1 + n`. `scale` is `min(1, factor)`: it
    /// stretches the filter in time (lowering its cutoff to the output Nyquist) and scales
    /// its amplitude so the passband gain stays at 1.
    pub(crate) fn fill_row(&self, frac: f64, scale: f64, row: &mut [f32]) {
        debug_assert_eq!(row.len(), self.row_len());
        debug_assert!(
            self.zero_crossings as f64 / scale < self.half_width as f64,
            "filter reach exceeds the history window"
        );

        let first = 1 - self.half_width as i64;
        let gain = scale as f32;
        for (tap, value) in row.iter_mut().enumerate() {
            let offset = first + tap as i64;
            let x = (frac - offset as f64).abs() * scale;
            *value = self.coefficient(x) * gain;
        }
    }
}

/// Half width needed to hold the filter stretched for `min_factor`, plus the history
/// margin. `None` if it is larger than [`MAX_HALF_WIDTH`].
fn half_width_for(quality: FilterQuality, min_factor: f64) -> Option<usize> {
    let reach = ((quality.zero_crossings() + 1) as f64 / min_factor.min(1.0)).ceil();
    // Checked before the cast, which would saturate.
    if reach.is_nan() || reach > MAX_HALF_WIDTH as f64 {
        return None;
    }

    (reach as usize)
        .checked_add(WIDTH_MARGIN)
        .filter(|&half_width| half_width <= MAX_HALF_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_for(table: &FilterTable, frac: f64, scale: f64) -> Vec<f32> {
        let mut row = vec![0.0; table.row_len()];
        table.fill_row(frac, scale, &mut row);
        row
    }

    #[test]
    fn test_half_width_follows_min_factor() {
        assert_eq!(FilterTable::new(FilterQuality::Best, 1.0).unwrap().half_width(), 28);
        assert_eq!(FilterTable::new(FilterQuality::Best, 4.0).unwrap().half_width(), 28);
        assert_eq!(FilterTable::new(FilterQuality::Best, 0.5).unwrap().half_width(), 46);
        assert_eq!(FilterTable::new(FilterQuality::Fast, 1.0).unwrap().half_width(), 16);
        assert_eq!(FilterTable::new(FilterQuality::Fast, 0.25).unwrap().half_width(), 34);
    }

    #[test]
    fn test_half_width_is_bounded() {
        let smallest = 18.0 / (MAX_HALF_WIDTH - 2 * WIDTH_MARGIN) as f64;
        let half_width = half_width_for(FilterQuality::Best, smallest).unwrap();
        assert!(half_width <= MAX_HALF_WIDTH);
        assert_eq!(half_width_for(FilterQuality::Best, smallest * 0.99), None);
        assert_eq!(half_width_for(FilterQuality::Best, 1e-300), None);
        assert_eq!(half_width_for(FilterQuality::Fast, f64::MIN_POSITIVE), None);

        let error = FilterTable::new(FilterQuality::Best, 1e-7).unwrap_err();
        assert!(matches!(error, ResampleError::FilterTooWide { .. }));
    }

    #[test]
    fn test_table_dimensions() {
        let table = FilterTable::new(FilterQuality::Fast, 1.0).unwrap();
        assert_eq!(table.coeffs.len(), 5 * 256 + 1);
        assert_eq!(table.deltas.len(), table.coeffs.len());
        assert_eq!(table.deltas[table.deltas.len() - 1], 0.0);
    }

    #[test]
    fn test_wing_tail_decays_toward_zero() {
        for quality in [FilterQuality::Fast, FilterQuality::Best] {
            let table = FilterTable::new(quality, 1.0).unwrap();
            let edge = table.coeffs[table.coeffs.len() - 1];
            assert!(edge.abs() < 2e-3, "{quality:?}: edge tap {edge} too large");
            assert!(table.coeffs[0] > 0.8);
        }
    }

    #[test]
    fn test_row_is_symmetric_at_integer_position() {
        let table = FilterTable::new(FilterQuality::Best, 1.0).unwrap();
        let row = row_for(&table, 0.0, 1.0);
        let center = table.half_width() - 1;

        assert_eq!(row[center], table.coeffs[0]);
        for distance in 1..center {
            assert_eq!(row[center - distance], row[center + distance]);
        }
    }

    #[test]
    fn test_row_is_mirrored_at_half_position() {
        let table = FilterTable::new(FilterQuality::Best, 1.0).unwrap();
        let row = row_for(&table, 0.5, 1.0);
        let center = table.half_width() - 1;

        // Distances 0.5, 1.5, ... on both sides of the read position.
        for distance in 0..center {
            let left = row[center - distance];
            let right = row[center + 1 + distance];
            assert!((left - right).abs() < 1e-6, "{left} != {right}");
        }
    }

    #[test]
    fn test_dc_gain_is_unity() {
        for quality in [FilterQuality::Fast, FilterQuality::Best] {
            let table = FilterTable::new(quality, 0.25).unwrap();

            let exact: f32 = row_for(&table, 0.0, 1.0).iter().sum();
            assert!((exact - 1.0).abs() < 1e-5, "{quality:?}: gain {exact}");

            for frac in [0.1, 0.25, 0.5, 0.9] {
                for scale in [1.0, 0.5, 0.25] {
                    let gain: f32 = row_for(&table, frac, scale).iter().sum();
                    assert!(
                        (gain - 1.0).abs() < 5e-3,
                        "{quality:?}: gain {gain} at frac {frac}, scale {scale}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_stretched_row_stays_inside_window() {
        let table = FilterTable::new(FilterQuality::Best, 0.5).unwrap();
        let row = row_for(&table, 0.75, 0.5);

        // The outermost taps lie beyond the stretched reach of 34 samples.
        assert_eq!(row[0], 0.0);
        assert_eq!(row[row.len() - 1], 0.0);
        assert!(row.iter().filter(|value| **value != 0.0).count() > 60);
    }

    #[test]
    fn test_quality_from_flag() {
        assert_eq!(FilterQuality::from(true), FilterQuality::Best);
        assert_eq!(FilterQuality::from(false), FilterQuality::Fast);
        assert_eq!(FilterQuality::default(), FilterQuality::Best);
    }
}
