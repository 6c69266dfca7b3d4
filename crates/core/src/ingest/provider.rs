use crate::config::Settings;
use crate::domain::prices::PriceTable;
use crate::ingest::types::{ChartResponse, ChartResult};
use crate::time::session::{period_bounds, session_date};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{StatusCode, Url};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Source of daily adjusted-close prices.
///
/// Symbols the source does not know are left out of the table rather than reported.
#[async_trait::async_trait]
pub trait MarketDataGateway: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_adjusted_close(
        &self,
        tickers: &BTreeSet<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable>;
}

#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

enum SymbolFetch {
    Found(Vec<(NaiveDate, Option<f64>)>),
    NotFound(String),
}

/// The provider refused the request itself; asking again gives the same answer.
#[derive(Debug, thiserror::Error)]
#[error("market data HTTP {status} for {symbol}: {body}")]
struct RejectedRequest {
    status: StatusCode,
    symbol: String,
    body: String,
}

impl YahooChartProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retries: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            retries: retries.max(1),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .data_provider_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = Duration::from_secs(
            settings
                .data_provider_timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );
        let retries = settings.data_provider_retries.unwrap_or(DEFAULT_RETRIES);

        Self::new(base_url, timeout, retries)
    }

    fn url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid market data base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("market data base url cannot hold a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    async fn fetch_once(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<SymbolFetch> {
        let (period1, period2) = period_bounds(start, end);
        let url = self.url(symbol)?;
        let res = self
            .http
            .get(url)
            .headers(Self::headers())
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div|split".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;

        let parsed = serde_json::from_str::<ChartResponse>(&text);

        if status == StatusCode::NOT_FOUND {
            let detail = parsed
                .ok()
                .and_then(|p| p.chart.error)
                .and_then(|e| e.description)
                .unwrap_or_else(|| "symbol not found".to_string());
            return Ok(SymbolFetch::NotFound(detail));
        }
        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            return Err(RejectedRequest {
                status,
                symbol: symbol.to_string(),
                body: text,
            }
            .into());
        }
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status} for {symbol}: {text}");
        }

        let parsed = parsed.with_context(|| format!("unexpected chart response for {symbol}: {text}"))?;
        if let Some(err) = parsed.chart.error {
            if err.is_not_found() {
                return Ok(SymbolFetch::NotFound(err.description.unwrap_or(err.code)));
            }
            anyhow::bail!(
                "market data error for {symbol}: {} {}",
                err.code,
                err.description.unwrap_or_default()
            );
        }

        let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(SymbolFetch::NotFound("empty chart result".to_string()));
        };
        Ok(SymbolFetch::Found(adjusted_closes(&result, start, end)))
    }

    async fn fetch_symbol(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<SymbolFetch> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(symbol, start, end).await {
                Ok(fetched) => return Ok(fetched),
                Err(err) => {
                    if attempt >= self.retries || err.is::<RejectedRequest>() {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, symbol, error = %err, "market data fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl MarketDataGateway for YahooChartProvider {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_adjusted_close(
        &self,
        tickers: &BTreeSet<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable> {
        let mut series = BTreeMap::new();
        for symbol in tickers {
            match self.fetch_symbol(symbol, start, end).await? {
                SymbolFetch::Found(rows) => {
                    tracing::debug!(symbol = %symbol, rows = rows.len(), "fetched adjusted closes");
                    series.insert(symbol.clone(), rows);
                }
                SymbolFetch::NotFound(detail) => {
                    tracing::debug!(symbol = %symbol, %detail, "symbol not found; omitted");
                }
            }
        }

        Ok(PriceTable::from_observations(series))
    }
}

/// Adjusted closes keyed by session date, restricted to `[start, end]`.
fn adjusted_closes(result: &ChartResult, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, Option<f64>)> {
    let timestamps = result.timestamp.as_deref().unwrap_or_default();
    let closes = result
        .indicators
        .adjclose
        .as_ref()
        .and_then(|a| a.first())
        .map(|a| a.adjclose.as_slice())
        .unwrap_or_default();

    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let date = session_date(*ts, result.meta.gmtoffset)?;
            (start <= date && date <= end).then(|| (date, closes.get(i).copied().flatten()))
        })
        .collect()
}
