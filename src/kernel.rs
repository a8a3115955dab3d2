//! The part of the convolution that only needs the sinc table, not the
//! surrounding driver state: turning a Q8.24 tap position into a windowed
//! sinc value via linear interpolation between adjacent table entries.

use crate::fixed::QTime;
use crate::sinc::SincTable;

/// Evaluate the windowed sinc at tap position `qt_sinc_cur` (Q8.24), given
/// the precomputed fractional part `f_fract` of that position (which stays
/// constant across every tap of a single output sample, since the
/// table-index step is an integer number of Q-units).
///
/// `scaling > 1.0` (decimation) divides the result by `scaling`: the filter
/// is being stretched to lower the cutoff, so its peak gain must be brought
/// back down to keep the passband near unity (spec's gain compensation,
/// P5).
#[inline]
pub fn sinc_value(
    table: &SincTable,
    window_interp_bits: u32,
    fract_bits: u32,
    qt_sinc_cur: QTime,
    f_fract: f32,
    scaling: f32,
) -> f32 {
    let k = qt_sinc_cur.shr(fract_bits - window_interp_bits).0 as usize;
    let (lo, hi) = table.taps(k);
    let v = lo + f_fract * (hi - lo);
    if scaling > 1.0 {
        v / scaling
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FRACT_BITS;

    #[test]
    fn fractional_continuity_bounded_by_tap_delta() {
        let table = SincTable::new(16, 128);
        let window_interp_bits = 7; // log2(128)
        let x = QTime::from_float(2.0);
        let k = x.shr(FRACT_BITS - window_interp_bits).0 as usize;
        let (lo, hi) = table.taps(k);

        let at_zero = sinc_value(&table, window_interp_bits, FRACT_BITS, x, 0.0, 1.0);
        let at_one = sinc_value(&table, window_interp_bits, FRACT_BITS, x, 1.0, 1.0);
        assert!((at_zero - at_one).abs() <= (hi - lo).abs() + 1e-6);
    }

    #[test]
    fn decimation_divides_by_scaling() {
        let table = SincTable::new(16, 128);
        let x = QTime::from_float(0.0);
        let unscaled = sinc_value(&table, 7, FRACT_BITS, x, 0.0, 1.0);
        let scaled = sinc_value(&table, 7, FRACT_BITS, x, 0.0, 2.0);
        assert!((scaled - unscaled / 2.0).abs() < 1e-6);
    }
}
