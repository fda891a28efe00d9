//! Wilder building blocks shared by the directional indicators.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! Directional movement: +DM / -DM from consecutive highs and lows.
//! Wilder sum: seed = sum of the first `period` values, then
//! S[t] = S[t-1] - S[t-1]/period + x[t].

use crate::domain::Candle;

/// Compute the True Range series from candles.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let n = candles.len();
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    tr[0] = candles[0].high - candles[0].low;

    for i in 1..n {
        let h = candles[i].high;
        let l = candles[i].low;
        let pc = candles[i - 1].close;
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            tr[i] = f64::NAN;
        } else {
            tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
        }
    }

    tr
}

/// +DM and -DM per candle. Index 0 is NaN (no previous candle).
///
/// A move counts only when it is positive and strictly larger than the
/// opposite move; otherwise it is 0.
pub fn directional_movement(candles: &[Candle]) -> (Vec<f64>, Vec<f64>) {
    let n = candles.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up_move = candles[i].high - candles[i - 1].high;
        let down_move = candles[i - 1].low - candles[i].low;

        if up_move.is_nan() || down_move.is_nan() {
            continue;
        }

        plus_dm[i] = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
    }

    (plus_dm, minus_dm)
}

/// Wilder running sum. The seed is the plain sum of the first `period` values
/// starting at `start`; output before the seed index is NaN. A NaN after the
/// seed poisons the rest of the series.
pub fn wilder_sum(values: &[f64], period: usize, start: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < start + period {
        return result;
    }

    let seed_end = start + period;
    let seed_window = &values[start..seed_end];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }

    let mut prev: f64 = seed_window.iter().sum();
    result[seed_end - 1] = prev;

    let p = period as f64;
    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        prev = prev - prev / p + values[i];
        result[i] = prev;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use chrono::{Duration, TimeZone, Utc};

    fn make_ohlc(data: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        data.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Candle {
                timestamp: base + Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn true_range_basic() {
        let candles = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),  // TR = 105-95 = 10
            (102.0, 108.0, 100.0, 106.0), // TR = max(8, |108-102|, |100-102|) = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = max(9, |107-106|, |98-106|) = 9
        ]);
        let tr = true_range(&candles);
        assert_approx(tr[0], 10.0, DEFAULT_EPSILON);
        assert_approx(tr[1], 8.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let candles = make_ohlc(&[
            (98.0, 102.0, 97.0, 100.0),
            (110.0, 115.0, 108.0, 112.0), // TR = max(7, |115-100|, |108-100|) = 15
        ]);
        let tr = true_range(&candles);
        assert_approx(tr[1], 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn directional_movement_picks_dominant_side() {
        let candles = make_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 94.0, 106.0), // up 3, down 1 → +DM 3
            (106.0, 107.0, 90.0, 99.0),  // up -1, down 4 → -DM 4
            (99.0, 109.0, 88.0, 101.0),  // up 2, down 2 → both 0
        ]);
        let (plus, minus) = directional_movement(&candles);
        assert!(plus[0].is_nan() && minus[0].is_nan());
        assert_eq!((plus[1], minus[1]), (3.0, 0.0));
        assert_eq!((plus[2], minus[2]), (0.0, 4.0));
        assert_eq!((plus[3], minus[3]), (0.0, 0.0));
    }

    #[test]
    fn wilder_sum_seed_and_recurrence() {
        // Seed over values[1..4] = 8 + 9 + 6 = 23
        // Next = 23 - 23/3 + 6 = 64/3
        let values = [f64::NAN, 8.0, 9.0, 6.0, 6.0];
        let result = wilder_sum(&values, 3, 1);
        assert!(result[..3].iter().all(|v| v.is_nan()));
        assert_approx(result[3], 23.0, DEFAULT_EPSILON);
        assert_approx(result[4], 64.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_sum_too_short() {
        let result = wilder_sum(&[1.0, 2.0], 3, 0);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
