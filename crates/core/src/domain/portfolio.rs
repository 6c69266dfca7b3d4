use std::collections::BTreeSet;

/// Ticker → weight allocation for one portfolio, in input order.
///
/// Weights are taken as written: they need not sum to one and may be zero or negative.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Portfolio {
    holdings: Vec<(String, f64)>,
}

impl Portfolio {
    pub fn new(holdings: Vec<(String, f64)>) -> Self {
        Self { holdings }
    }

    pub fn holdings(&self) -> &[(String, f64)] {
        &self.holdings
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.holdings.iter().map(|(ticker, _)| ticker.as_str())
    }

    /// Weight for `ticker`, zero when the portfolio does not hold it.
    pub fn weight(&self, ticker: &str) -> f64 {
        self.holdings
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }
}

/// Portfolio name → allocation, as entered by the user for one comparison run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioSpec {
    portfolios: Vec<(String, Portfolio)>,
}

impl PortfolioSpec {
    pub fn new(portfolios: Vec<(String, Portfolio)>) -> Self {
        Self { portfolios }
    }

    pub fn len(&self) -> usize {
        self.portfolios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.portfolios.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Portfolio> {
        self.portfolios
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Portfolio)> {
        self.portfolios.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Union of every ticker referenced by any portfolio.
    pub fn all_tickers(&self) -> BTreeSet<String> {
        self.portfolios
            .iter()
            .flat_map(|(_, p)| p.tickers())
            .map(str::to_string)
            .collect()
    }
}
