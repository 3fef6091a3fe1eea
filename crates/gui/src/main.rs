use anyhow::{Context, Result};
use std::{io, path::PathBuf, sync::Arc};
use tracing::info;

use app::App;
use clap::Parser;
use common::config::Settings;
use iced::Theme;
use tracing_subscriber::EnvFilter;
use url::Url;

mod app;
mod scanner;

const DARK_THEME: Theme = Theme::TokyoNight;
const LIGHT_THEME: Theme = Theme::Light;

#[derive(Parser, Debug)]
#[command(
    version,
    name = "Scan Station",
    about = "Scan or type a product QR code and show what the lookup service knows about it."
)]
struct Args {
    #[arg(long, short)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<Url>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = args.base_url {
        settings.base_url = url;
    }

    tracing_subscriber::fmt()
        .with_writer(io::stdout)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let network = Arc::new(
        settings
            .network_client()
            .context("failed to build lookup client")?,
    );
    info!(base_url = %settings.base_url, "starting scan station");

    iced::application(
        move || (App::new(&settings, network.clone()), iced::Task::none()),
        App::update,
        App::view,
    )
    .antialiasing(true)
    .window_size((560.0, 720.0))
    .theme(theme)
    .title("Scan QR Codes")
    .run()?;

    Ok(())
}

pub fn theme(app: &App) -> Theme {
    match app.dark_mode {
        true => DARK_THEME,
        false => LIGHT_THEME,
    }
}
