pub mod literal;

use crate::domain::portfolio::{Portfolio, PortfolioSpec};
use literal::{Entry, Literal};
use std::collections::HashSet;

/// Portfolio text could not be read. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    fn at(pos: literal::Pos, message: impl Into<String>) -> Self {
        Self::new(pos.line, pos.column, message)
    }
}

/// Sample input shown in the form on startup.
pub const EXAMPLE_PORTFOLIOS: &str = "{\n    'Portfolio A': {'TSLA': 0.4, 'MSFT': 0.3, 'AMZN': 0.3},\n    'Portfolio B': {'GOOGL': 0.5, 'META': 0.5},\n}";

/// Parses `{'Name': {'TICKER': weight, ...}, ...}` into a [`PortfolioSpec`].
///
/// Only the shape is checked. Weights are not normalized and tickers are not looked up.
pub fn parse_portfolios(text: &str) -> Result<PortfolioSpec, ParseError> {
    let (root, root_pos) = literal::read(text)?;
    let entries = match root {
        Literal::Map(entries) => entries,
        other => {
            return Err(ParseError::at(
                root_pos,
                format!(
                    "expected a mapping of portfolio names to holdings, found {}",
                    other.kind()
                ),
            ))
        }
    };

    let mut seen = HashSet::new();
    let mut portfolios = Vec::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.key.clone()) {
            return Err(ParseError::at(
                entry.key_pos,
                format!("portfolio '{}' is defined more than once", entry.key),
            ));
        }
        let portfolio = holdings(&entry)?;
        portfolios.push((entry.key, portfolio));
    }

    Ok(PortfolioSpec::new(portfolios))
}

fn holdings(entry: &Entry) -> Result<Portfolio, ParseError> {
    let Literal::Map(items) = &entry.value else {
        return Err(ParseError::at(
            entry.value_pos,
            format!(
                "portfolio '{}' must map tickers to weights, found {}",
                entry.key,
                entry.value.kind()
            ),
        ));
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.key.as_str()) {
            return Err(ParseError::at(
                item.key_pos,
                format!(
                    "ticker '{}' appears more than once in portfolio '{}'",
                    item.key, entry.key
                ),
            ));
        }
        let Literal::Number(weight) = item.value else {
            return Err(ParseError::at(
                item.value_pos,
                format!(
                    "weight for '{}' in portfolio '{}' must be a number, found {}",
                    item.key,
                    entry.key,
                    item.value.kind()
                ),
            ));
        };
        out.push((item.key.clone(), weight));
    }

    Ok(Portfolio::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_example_input() {
        let spec = parse_portfolios(EXAMPLE_PORTFOLIOS).unwrap();
        assert_eq!(spec.len(), 2);
        let a = spec.get("Portfolio A").unwrap();
        assert_eq!(a.weight("TSLA"), 0.4);
        assert_eq!(a.weight("AMZN"), 0.3);
        let b = spec.get("Portfolio B").unwrap();
        assert_eq!(b.holdings().len(), 2);
        assert_eq!(b.weight("META"), 0.5);
    }

    #[test]
    fn accepts_double_quotes_and_unnormalized_weights() {
        let spec = parse_portfolios(r#"{"Hedge": {"SPY": 1.5, "QQQ": -0.5, "IWM": 0}}"#).unwrap();
        let hedge = spec.get("Hedge").unwrap();
        assert_eq!(hedge.weight("SPY"), 1.5);
        assert_eq!(hedge.weight("QQQ"), -0.5);
        assert_eq!(hedge.weight("IWM"), 0.0);
    }

    #[test]
    fn portfolio_count_is_order_insensitive() {
        let forward = parse_portfolios("{'A': {'X': 1}, 'B': {'Y': 1}, 'C': {}}").unwrap();
        let reverse = parse_portfolios("{'C': {}, 'B': {'Y': 1}, 'A': {'X': 1}}").unwrap();
        assert_eq!(forward.len(), 3);
        assert_eq!(reverse.len(), 3);
        let mut f: Vec<_> = forward.names().collect();
        let mut r: Vec<_> = reverse.names().collect();
        f.sort();
        r.sort();
        assert_eq!(f, r);
    }

    #[test]
    fn empty_mapping_is_valid() {
        assert!(parse_portfolios("{}").unwrap().is_empty());
    }

    #[test]
    fn rejects_wrong_shapes() {
        let err = parse_portfolios("{'A': 1.0}").unwrap_err();
        assert!(err.message.contains("must map tickers to weights"));

        let err = parse_portfolios("{'A': {'X': 'heavy'}}").unwrap_err();
        assert!(err.message.contains("must be a number"));
        assert_eq!((err.line, err.column), (1, 13));

        let err = parse_portfolios("0.5").unwrap_err();
        assert!(err.message.contains("expected a mapping"));
    }

    #[test]
    fn rejects_duplicates() {
        let err = parse_portfolios("{'A': {'X': 1}, 'A': {'Y': 1}}").unwrap_err();
        assert!(err.message.contains("more than once"));

        let err = parse_portfolios("{'A': {'X': 1, 'X': 2}}").unwrap_err();
        assert!(err.message.contains("ticker 'X'"));
    }

    #[test]
    fn malformed_input_never_yields_partial_result() {
        for text in [
            "{'A': {'X': 1.0}",
            "{'A': {'X': 1.0}}}",
            "{'A': {'X': exec('rm -rf /')}}",
            "{'A': {'X': 1.0} 'B': {}}",
            "",
            "   # only a comment",
        ] {
            assert!(parse_portfolios(text).is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn deeply_nested_input_is_rejected() {
        let err = parse_portfolios(&"{'a': ".repeat(200_000)).unwrap_err();
        assert!(err.message.contains("portfolio -> ticker -> weight"));
    }

    #[test]
    fn error_display_includes_position() {
        let err = parse_portfolios("{\n  'A': oops\n}").unwrap_err();
        assert!(err.to_string().starts_with("line 2, column 8:"));
    }
}
