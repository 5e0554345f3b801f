use rust_decimal::Decimal;

/// Simple moving average over a price series
///
/// Output is aligned with the input: positions before the window has
/// filled are None.
pub fn sma(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let period_dec = Decimal::from(period as u64);
    let mut window_sum: Decimal = values[..period].iter().copied().sum();
    out[period - 1] = Some(window_sum / period_dec);

    for i in period..values.len() {
        window_sum += values[i] - values[i - period];
        out[i] = Some(window_sum / period_dec);
    }

    out
}

/// Relative strength index with Wilder smoothing
///
/// The first `period` positions are None (not enough changes to seed the
/// averages). A window with no losses reads 100.
pub fn rsi(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period + 1 {
        return out;
    }

    let period_dec = Decimal::from(period as u64);
    let hundred = Decimal::ONE_HUNDRED;

    // Seed with the simple mean of the first `period` changes
    let mut avg_gain = Decimal::ZERO;
    let mut avg_loss = Decimal::ZERO;
    for i in 1..=period {
        let change = values[i] - values[i - 1];
        if change > Decimal::ZERO {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period_dec;
    avg_loss /= period_dec;
    out[period] = Some(rsi_value(avg_gain, avg_loss, hundred));

    let smoothing = period_dec - Decimal::ONE;
    for i in (period + 1)..values.len() {
        let change = values[i] - values[i - 1];
        let (gain, loss) = if change > Decimal::ZERO {
            (change, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -change)
        };

        avg_gain = (avg_gain * smoothing + gain) / period_dec;
        avg_loss = (avg_loss * smoothing + loss) / period_dec;
        out[i] = Some(rsi_value(avg_gain, avg_loss, hundred));
    }

    out
}

fn rsi_value(avg_gain: Decimal, avg_loss: Decimal, hundred: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        return hundred;
    }
    let rs = avg_gain / avg_loss;
    hundred - hundred / (Decimal::ONE + rs)
}

/// Average true range with Wilder smoothing
///
/// `highs`/`lows` may be sparse (settlement-only futures rows); where
/// either is missing the true range degrades to |close - prev close|.
/// The first bar has no previous close and is ignored, so output starts
/// at index `period`.
pub fn atr(
    highs: &[Option<Decimal>],
    lows: &[Option<Decimal>],
    closes: &[Decimal],
    period: usize,
) -> Vec<Option<Decimal>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    let true_ranges: Vec<Decimal> = (1..closes.len())
        .map(|i| true_range(highs.get(i).copied().flatten(), lows.get(i).copied().flatten(), closes[i], closes[i - 1]))
        .collect();

    let period_dec = Decimal::from(period as u64);
    let mut atr_val: Decimal =
        true_ranges[..period].iter().copied().sum::<Decimal>() / period_dec;
    out[period] = Some(atr_val);

    let smoothing = period_dec - Decimal::ONE;
    for (i, tr) in true_ranges.iter().enumerate().skip(period) {
        atr_val = (atr_val * smoothing + *tr) / period_dec;
        // true_ranges[i] belongs to closes[i + 1]
        out[i + 1] = Some(atr_val);
    }

    out
}

fn true_range(
    high: Option<Decimal>,
    low: Option<Decimal>,
    close: Decimal,
    prev_close: Decimal,
) -> Decimal {
    match (high, low) {
        (Some(high), Some(low)) => {
            let hl = high - low;
            let hc = (high - prev_close).abs();
            let lc = (low - prev_close).abs();
            hl.max(hc).max(lc)
        }
        _ => (close - prev_close).abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn decs(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|v| Decimal::from(*v)).collect()
    }

    #[test]
    fn test_sma_alignment() {
        let values = decs(&[1, 2, 3, 4]);
        let out = sma(&values, 2);

        assert_eq!(out, vec![None, Some(dec!(1.5)), Some(dec!(2.5)), Some(dec!(3.5))]);
    }

    #[test]
    fn test_sma_short_series() {
        let values = decs(&[1, 2]);
        assert_eq!(sma(&values, 5), vec![None, None]);
        assert!(sma(&[], 3).is_empty());
    }

    #[test]
    fn test_rsi_all_gains_reads_100() {
        let values = decs(&[1, 2, 3, 4, 5, 6]);
        let out = rsi(&values, 5);

        assert_eq!(out[4], None);
        assert_eq!(out[5], Some(dec!(100)));
    }

    #[test]
    fn test_rsi_wilder_smoothing() {
        let values = decs(&[10, 11, 10, 11, 10, 11]);
        let out = rsi(&values, 2);

        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(dec!(50)));
        assert_eq!(out[3], Some(dec!(75)));
        assert_eq!(out[4], Some(dec!(37.5)));
        assert_eq!(out[5], Some(dec!(68.75)));
    }

    #[test]
    fn test_rsi_short_series() {
        let values = decs(&[10, 11]);
        assert_eq!(rsi(&values, 2), vec![None, None]);
    }

    #[test]
    fn test_atr_settlement_only_fallback() {
        // No highs/lows: TR degrades to |close - prev close|
        let closes = decs(&[10, 12, 11, 15]);
        let none = vec![None; closes.len()];
        let out = atr(&none, &none, &closes, 2);

        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(dec!(1.5)));
        assert_eq!(out[3], Some(dec!(2.75)));
    }

    #[test]
    fn test_atr_uses_true_range_when_ohlc_present() {
        let closes = decs(&[10, 12]);
        let highs = vec![Some(dec!(11)), Some(dec!(13))];
        let lows = vec![Some(dec!(9)), Some(dec!(10))];
        let out = atr(&highs, &lows, &closes, 1);

        // TR = max(13-10, |13-10|, |10-10|) = 3
        assert_eq!(out[1], Some(dec!(3)));
    }
}
