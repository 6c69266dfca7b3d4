use crate::parse::ParseError;

/// Why a comparison run produced no chart.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("Could not read the portfolios ({0})")]
    Parse(#[from] ParseError),

    #[error("Error fetching stock data: {0:#}")]
    Data(anyhow::Error),

    #[error("Error processing portfolios: {0:#}")]
    Computation(anyhow::Error),
}

impl CompareError {
    /// Short heading for the error dialog.
    pub fn title(&self) -> &'static str {
        match self {
            CompareError::Parse(_) => "Invalid portfolios",
            CompareError::Data(_) => "Market data unavailable",
            CompareError::Computation(_) => "Error",
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            CompareError::Parse(_) => "parse",
            CompareError::Data(_) => "fetch",
            CompareError::Computation(_) => "compute",
        }
    }
}
