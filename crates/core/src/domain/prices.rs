use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Daily adjusted-close prices: ascending unique dates × tickers.
///
/// A cell is `None` when the source had no quote for that ticker on that date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    // One column per ticker, each `dates.len()` long.
    columns: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Aligns per-ticker observations on the union of their dates.
    ///
    /// Tickers with no observations are dropped. When a ticker reports the same date more than
    /// once the last observation wins.
    pub fn from_observations(series: BTreeMap<String, Vec<(NaiveDate, Option<f64>)>>) -> Self {
        let dates: Vec<NaiveDate> = series
            .values()
            .flatten()
            .map(|(date, _)| *date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let row_of: BTreeMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut tickers = Vec::new();
        let mut columns = Vec::new();
        for (ticker, observations) in series {
            if observations.is_empty() {
                continue;
            }
            let mut column = vec![None; dates.len()];
            for (date, price) in observations {
                column[row_of[&date]] = price;
            }
            tickers.push(ticker);
            columns.push(column);
        }

        Self {
            dates,
            tickers,
            columns,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn column(&self, idx: usize) -> &[Option<f64>] {
        &self.columns[idx]
    }

    pub fn column_for(&self, ticker: &str) -> Option<&[Option<f64>]> {
        let idx = self.tickers.iter().position(|t| t == ticker)?;
        Some(&self.columns[idx])
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// True when no ticker resolved or the range held no trading days.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.tickers.is_empty()
    }
}
