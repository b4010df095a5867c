use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use layaway_core::listing::{self, ListingFilter};
use layaway_core::state::WidgetState;
use layaway_oracle::redstone::RedStoneOracle;
use layaway_oracle::widget::{ActiveWidget, PriceSeriesWidget};
use rust_decimal::Decimal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "layaway",
    about = "BTC Layaway dashboard: oracle price chart and sample listings"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// IANA time zone for chart labels (e.g. America/New_York)
    #[arg(long, default_value = "UTC", value_parser = parse_tz)]
    tz: Tz,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the 7-day BTC series once and write the chart
    Chart {
        /// Output SVG file
        #[arg(short, long, default_value = "btc-chart.svg")]
        out: PathBuf,
    },

    /// Keep the chart fresh, refetching every minute
    Watch {
        /// Output SVG file, rewritten on every update
        #[arg(short, long, default_value = "btc-chart.svg")]
        out: PathBuf,

        /// Stop after this many completed refreshes (runs until Ctrl-C if omitted)
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Show sample market listings
    Listings {
        /// Minimum strike price (USD)
        #[arg(long)]
        min_strike: Option<Decimal>,

        /// Maximum strike price (USD)
        #[arg(long)]
        max_strike: Option<Decimal>,

        /// Minimum deposit (USD)
        #[arg(long)]
        min_deposit: Option<Decimal>,

        /// Latest expiry (YYYY-MM-DD)
        #[arg(long)]
        max_expiry: Option<NaiveDate>,
    },

    /// Show the connected wallet's sample positions
    Positions,
}

fn parse_tz(s: &str) -> Result<Tz, String> {
    s.parse::<Tz>().map_err(|e| e.to_string())
}

fn new_widget(tz: Tz) -> PriceSeriesWidget {
    PriceSeriesWidget::new(Arc::new(RedStoneOracle::new()), tz)
}

/// Write the SVG for `state` to `out`, creating parent directories as needed.
fn write_view(out: &Path, state: &WidgetState, tz: Tz) -> Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, state.render_svg(tz))
        .with_context(|| format!("failed to write {}", out.display()))
}

async fn cmd_chart(out: &Path, tz: Tz) -> Result<()> {
    let widget = new_widget(tz);
    widget.refresh().await;

    let state = widget.state();
    write_view(out, &state, tz)?;
    println!("{}", state.headline());

    if let WidgetState::Error(message) = &state {
        anyhow::bail!("failed to load BTC price data: {message}");
    }
    info!("Wrote {}", out.display());
    Ok(())
}

async fn cmd_watch(out: &Path, ticks: Option<u64>, tz: Tz) -> Result<()> {
    let active = new_widget(tz).activate();
    run_watch(active, out, ticks, tz, &mut std::io::stdout()).await?;
    Ok(())
}

/// Mirror every state change of `active` into `out` and print its headline
/// to `log`. Returns the number of completed refreshes seen; transient
/// loading states are written but not counted toward `ticks`.
async fn run_watch<W: Write>(
    active: ActiveWidget,
    out: &Path,
    ticks: Option<u64>,
    tz: Tz,
    log: &mut W,
) -> Result<u64> {
    let mut rx = active.subscribe();

    write_view(out, &rx.borrow_and_update(), tz)?;
    info!("Watching BTC price, writing {}", out.display());

    let mut completed = 0u64;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    warn!("price widget stopped unexpectedly");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
        }

        let state = rx.borrow_and_update().clone();
        write_view(out, &state, tz)?;
        writeln!(log, "{}", state.headline()).context("failed to print headline")?;

        if state.is_loading() {
            continue;
        }
        completed += 1;
        if ticks.is_some_and(|limit| completed >= limit) {
            break;
        }
    }

    active.stop();
    Ok(completed)
}

fn cmd_listings(filter: &ListingFilter) {
    let listings = filter.apply(&listing::sample_listings());
    if listings.is_empty() {
        println!("No listings match the current filters.");
        return;
    }
    for l in &listings {
        println!("{l}");
    }
}

fn cmd_positions() {
    for position in &listing::sample_positions() {
        println!("{position}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    match &cli.command {
        Commands::Chart { out } => {
            cmd_chart(out, cli.tz).await?;
        }
        Commands::Watch { out, ticks } => {
            cmd_watch(out, *ticks, cli.tz).await?;
        }
        Commands::Listings {
            min_strike,
            max_strike,
            min_deposit,
            max_expiry,
        } => {
            cmd_listings(&ListingFilter {
                min_strike: *min_strike,
                max_strike: *max_strike,
                min_deposit: *min_deposit,
                max_expiry: *max_expiry,
            });
        }
        Commands::Positions => cmd_positions(),
    }

    Ok(())
}
