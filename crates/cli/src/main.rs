use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::{
    config::Settings,
    error::ScanError,
    lookup::ProductLookup,
    models::ProductDetails,
    station::ScanStation,
};
use tabled::{
    Table, Tabled,
    builder::Builder,
    settings::{Alignment, Color, Style, object::Rows},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

fn styled(mut table: Table) -> Table {
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Alignment::center());
    table.modify(Rows::first(), Color::FG_CYAN);
    table
}

fn print_table(rows: &[impl Tabled]) {
    if rows.is_empty() {
        println!("No entries");
    } else {
        println!("{}", styled(Table::new(rows)));
    }
}

fn print_product(details: &ProductDetails, all_fields: bool) {
    if !all_fields {
        print_table(std::slice::from_ref(details));
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, value) in details.fields() {
        builder.push_record([key, value]);
    }
    println!("{}", styled(builder.build()));
}

/// Look up product codes against the scan station service
#[derive(Debug, Parser)]
#[command(name = "Scan Cli")]
#[command(version = "0.1.0")]
#[command(about = "Resolve scanned QR codes to product details", long_about = None)]
struct Cli {
    /// Settings file, defaults to ./scan-station.toml when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the configured lookup service
    #[arg(long, global = true)]
    base_url: Option<Url>,
    /// Show every attribute the service returns
    #[arg(short, long, global = true)]
    all_fields: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up a single code
    Lookup { code: String },
    /// Read scans from stdin, one code per line
    Scan,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = args.base_url {
        settings.base_url = url;
    }
    let all_fields = args.all_fields || settings.show_all_fields;

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let network = settings
        .network_client()
        .context("failed to build lookup client")?;
    let mut station = ScanStation::new(settings.on_transport_failure);
    debug!(base_url = %network.base_url(), "lookup client ready");

    match args.command {
        Commands::Lookup { code } => {
            let found =
                lookup_once(&mut station, &network, code, all_fields, &mut io::stderr()).await?;
            if !found {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Scan => {
            eprintln!("Scan QR codes, one per line (Ctrl-D to finish)");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                match station.scan(&network, &line).await {
                    Ok(Some(details)) => print_product(&details, all_fields),
                    Ok(None) => {}
                    Err(e) => report(&mut station, &e, &mut io::stderr())?,
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Manual submit of a single code. Failures are written to `err_out` once.
async fn lookup_once<L>(
    station: &mut ScanStation,
    lookup: &L,
    code: String,
    all_fields: bool,
    err_out: &mut impl Write,
) -> io::Result<bool>
where
    L: ProductLookup + ?Sized,
{
    station.on_input_changed(code);
    match station.manual_submit(lookup).await {
        Ok(details) => {
            print_product(&details, all_fields);
            Ok(true)
        }
        Err(e) => {
            report(station, &e, err_out)?;
            Ok(false)
        }
    }
}

/// Shows what the form would: the blocking notice first, then the inline error.
fn report(station: &mut ScanStation, err: &ScanError, out: &mut impl Write) -> io::Result<()> {
    debug!(error = %err, "submission ended without a product");
    if let Some(notice) = station.notice() {
        writeln!(out, "{notice}")?;
        station.acknowledge_notice();
    }
    if let Some(message) = station.error() {
        writeln!(out, "{message}")?;
    }
    Ok(())
}
