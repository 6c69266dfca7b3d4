use crate::domain::portfolio::PortfolioSpec;
use chrono::NaiveDate;

/// Cumulative return of one portfolio, one value per date of the shared index.
///
/// Values are fractions (0.21 == 21%). `NaN` marks dates where a held ticker had no usable
/// price and every date after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl ReturnSeries {
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Every portfolio's return series over a single date index.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    dates: Vec<NaiveDate>,
    series: Vec<ReturnSeries>,
}

impl ComparisonResult {
    pub fn new(dates: Vec<NaiveDate>, series: Vec<ReturnSeries>) -> anyhow::Result<Self> {
        for s in &series {
            anyhow::ensure!(
                s.values.len() == dates.len(),
                "series {} has {} values for {} dates",
                s.name,
                s.values.len(),
                dates.len()
            );
        }
        Ok(Self { dates, series })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn series(&self) -> &[ReturnSeries] {
        &self.series
    }

    pub fn get(&self, name: &str) -> Option<&ReturnSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// (date, cumulative return) pairs for one portfolio.
    pub fn points<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = (NaiveDate, f64)> + 'a> {
        let series = self.get(name)?;
        Some(self.dates.iter().copied().zip(series.values.iter().copied()))
    }
}

/// Outcome of one compare action: the parsed input alongside its result.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    pub spec: PortfolioSpec,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub result: ComparisonResult,
}
