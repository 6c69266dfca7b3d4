use anyhow::Context;
use clap::Parser;
use folio_core::config::Settings;
use folio_core::ingest::{MarketDataGateway, YahooChartProvider};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod chart;
mod date_picker;
mod editor;
mod tui;
mod ui;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Compare cumulative returns of stock portfolios")]
struct Args {
    /// First date of the comparison (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    start_date: Option<String>,

    /// Last date of the comparison, inclusive (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end_date: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let settings = Settings::from_env()?;
    init_tracing(&settings)?;

    let today = folio_core::time::session::today_local();
    let start = folio_core::time::session::resolve_form_date(args.start_date.as_deref(), today)?;
    let end = folio_core::time::session::resolve_form_date(args.end_date.as_deref(), today)?;

    let gateway = YahooChartProvider::from_settings(&settings)?;
    tracing::info!(provider = gateway.provider_name(), %start, %end, "starting folio");

    let mut app = app::App::new(start, end, today, folio_core::parse::EXAMPLE_PORTFOLIOS);
    tui::install_panic_hook();
    tui::run_tui(&mut app, &gateway).await
}

// The terminal owns stdout/stderr while the UI runs, so logs only go to an opt-in file.
fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let Some(path) = settings.log_file.as_ref() else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
