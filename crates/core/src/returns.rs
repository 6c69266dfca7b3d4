use crate::domain::portfolio::Portfolio;
use crate::domain::prices::PriceTable;

/// Weights aligned to `table`'s columns; tickers the portfolio does not hold get zero.
pub fn weight_vector(portfolio: &Portfolio, table: &PriceTable) -> Vec<f64> {
    table
        .tickers()
        .iter()
        .map(|ticker| portfolio.weight(ticker))
        .collect()
}

/// Simple daily returns of one price column. Index 0 has no prior price and is `NaN`.
///
/// A missing, zero or non-finite price on either side yields `NaN`.
pub fn daily_returns(prices: &[Option<f64>]) -> Vec<f64> {
    let usable = |p: Option<f64>| p.filter(|v| v.is_finite() && *v != 0.0);

    let mut out = Vec::with_capacity(prices.len());
    for t in 0..prices.len() {
        let r = if t == 0 {
            f64::NAN
        } else {
            match (usable(prices[t - 1]), usable(prices[t])) {
                (Some(prev), Some(cur)) => cur / prev - 1.0,
                _ => f64::NAN,
            }
        };
        out.push(r);
    }
    out
}

/// Weighted cumulative return per date: `Π(1 + r_p) - 1`, starting at 0 on the first date.
///
/// Zero-weight columns are skipped. Once a held ticker's return is `NaN` the series stays
/// `NaN` from that date on.
pub fn cumulative_returns(table: &PriceTable, weights: &[f64]) -> anyhow::Result<Vec<f64>> {
    anyhow::ensure!(
        weights.len() == table.tickers().len(),
        "weight vector has {} entries for {} price columns",
        weights.len(),
        table.tickers().len()
    );

    let mut portfolio_returns = vec![0.0; table.len()];
    for (idx, &weight) in weights.iter().enumerate() {
        if weight == 0.0 {
            continue;
        }
        let column = table.column(idx);
        anyhow::ensure!(
            column.len() == table.len(),
            "price column {} has {} rows for {} dates",
            table.tickers()[idx],
            column.len(),
            table.len()
        );
        for (t, r) in daily_returns(column).into_iter().enumerate().skip(1) {
            portfolio_returns[t] += weight * r;
        }
    }

    let mut growth = 1.0;
    let mut out = Vec::with_capacity(table.len());
    for (t, r) in portfolio_returns.into_iter().enumerate() {
        if t > 0 {
            growth *= 1.0 + r;
        }
        out.push(growth - 1.0);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn table(columns: &[(&str, &[Option<f64>])]) -> PriceTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series: BTreeMap<_, _> = columns
            .iter()
            .map(|(ticker, prices)| {
                let obs = prices
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (start + chrono::Days::new(i as u64), *p))
                    .collect::<Vec<_>>();
                (ticker.to_string(), obs)
            })
            .collect();
        PriceTable::from_observations(series)
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn single_ticker_compounds_to_price_ratio() {
        let t = table(&[("X", &[Some(100.0), Some(110.0), Some(121.0)])]);
        let out = cumulative_returns(&t, &[1.0]).unwrap();
        assert_close(&out, &[0.0, 0.10, 0.21]);
    }

    #[test]
    fn weighted_sum_of_daily_returns() {
        let t = table(&[
            ("A", &[Some(100.0), Some(110.0)]),
            ("B", &[Some(50.0), Some(45.0)]),
        ]);
        // 0.5 * 10% + 0.5 * -10%
        let out = cumulative_returns(&t, &[0.5, 0.5]).unwrap();
        assert_close(&out, &[0.0, 0.0]);

        // Weights are not normalized.
        let out = cumulative_returns(&t, &[2.0, 0.0]).unwrap();
        assert_close(&out, &[0.0, 0.2]);
    }

    #[test]
    fn missing_price_poisons_rest_of_series() {
        let t = table(&[("X", &[Some(100.0), None, Some(121.0), Some(130.0)])]);
        let out = cumulative_returns(&t, &[1.0]).unwrap();
        assert_eq!(out[0], 0.0);
        assert!(out[1..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn zero_price_is_undefined() {
        let r = daily_returns(&[Some(10.0), Some(0.0), Some(5.0)]);
        assert!(r[0].is_nan());
        assert!(r[1].is_nan());
        assert!(r[2].is_nan());
    }

    #[test]
    fn unheld_ticker_gaps_do_not_leak() {
        let t = table(&[
            ("HELD", &[Some(10.0), Some(11.0), Some(12.1)]),
            ("OTHER", &[Some(5.0), None, Some(5.0)]),
        ]);
        let w = [1.0, 0.0];
        let out = cumulative_returns(&t, &w).unwrap();
        assert_close(&out, &[0.0, 0.1, 0.21]);
    }

    #[test]
    fn weight_vector_zeroes_unknown_tickers() {
        let t = table(&[("A", &[Some(1.0)]), ("B", &[Some(1.0)])]);
        let p = Portfolio::new(vec![("B".to_string(), 0.7), ("ZZZ".to_string(), 0.3)]);
        assert_eq!(weight_vector(&p, &t), vec![0.0, 0.7]);
    }

    #[test]
    fn rejects_misaligned_weights() {
        let t = table(&[("A", &[Some(1.0), Some(2.0)])]);
        assert!(cumulative_returns(&t, &[0.5, 0.5]).is_err());
    }

    proptest! {
        #[test]
        fn single_ticker_matches_price_ratio(prices in prop::collection::vec(1.0f64..1000.0, 1..60)) {
            let col: Vec<Option<f64>> = prices.iter().copied().map(Some).collect();
            let t = table(&[("X", col.as_slice())]);
            let out = cumulative_returns(&t, &[1.0]).unwrap();
            for (i, v) in out.iter().enumerate() {
                let expected = prices[i] / prices[0] - 1.0;
                prop_assert!((v - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            }
        }
    }
}
