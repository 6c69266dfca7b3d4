use crate::domain::comparison::{ComparisonResult, ComparisonRun, ReturnSeries};
use crate::domain::portfolio::PortfolioSpec;
use crate::error::CompareError;
use crate::ingest::MarketDataGateway;
use crate::parse::parse_portfolios;
use crate::returns::{cumulative_returns, weight_vector};
use chrono::NaiveDate;

/// Computes every portfolio's cumulative return from one batched price fetch.
///
/// The range order is not checked here; a range with no trading days comes back empty from
/// the gateway and is reported as a data failure.
pub async fn compare(
    gateway: &dyn MarketDataGateway,
    spec: &PortfolioSpec,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ComparisonResult, CompareError> {
    let tickers = spec.all_tickers();
    tracing::info!(
        provider = gateway.provider_name(),
        portfolios = spec.len(),
        tickers = tickers.len(),
        %start,
        %end,
        "fetching prices"
    );

    let table = gateway
        .fetch_adjusted_close(&tickers, start, end)
        .await
        .map_err(CompareError::Data)?;

    if table.is_empty() {
        return Err(CompareError::Data(anyhow::anyhow!(
            "no stock data returned for {} between {start} and {end}; check the ticker symbols and the date range",
            tickers.iter().cloned().collect::<Vec<_>>().join(", ")
        )));
    }

    let missing: Vec<&String> = tickers
        .iter()
        .filter(|t| table.column_for(t).is_none())
        .collect();
    if !missing.is_empty() {
        tracing::info!(?missing, "tickers without data count as zero weight");
    }

    let mut series = Vec::with_capacity(spec.len());
    for (name, portfolio) in spec.iter() {
        let weights = weight_vector(portfolio, &table);
        let values = cumulative_returns(&table, &weights)
            .map_err(|e| CompareError::Computation(e.context(format!("portfolio '{name}'"))))?;
        series.push(ReturnSeries {
            name: name.to_string(),
            values,
        });
    }

    ComparisonResult::new(table.dates().to_vec(), series).map_err(CompareError::Computation)
}

/// Parses the portfolio text and runs [`compare`] on it.
pub async fn run_comparison(
    gateway: &dyn MarketDataGateway,
    text: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ComparisonRun, CompareError> {
    let spec = parse_portfolios(text)?;
    let result = compare(gateway, &spec, start, end).await?;
    tracing::info!(
        portfolios = result.series().len(),
        dates = result.dates().len(),
        "comparison complete"
    );
    Ok(ComparisonRun {
        spec,
        start,
        end,
        result,
    })
}
