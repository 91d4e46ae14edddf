//! prism-folio-gui entry point
//!
//! Desktop window rendering the portfolio page with the custom cursor.

use std::process::ExitCode;

use anyhow::{Context, Result};
use iced::Size;
use tracing::info;

use prism_folio::config::Config;
use prism_folio::geometry::Viewport;
use prism_folio::gui::app::{Boot, PortfolioApp};
use prism_folio::page::PageLayout;
use prism_folio::theme::{self, EnvAppearance, ThemeStore};
use prism_folio::utils::format_user_error;

fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("prism_folio=info,warn"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let boot = match prepare() {
        Ok(boot) => boot,
        Err(e) => {
            eprintln!("{}", format_user_error(&e));
            return ExitCode::FAILURE;
        }
    };
    let window = boot.page.viewport();

    // Run the application with window configuration
    let result = iced::application(move || boot.app(), PortfolioApp::update, PortfolioApp::view)
        .title(PortfolioApp::title)
        .theme(PortfolioApp::theme)
        .window_size(Size::new(window.width, window.height))
        .centered()
        .antialiasing(true)
        .subscription(PortfolioApp::subscription)
        .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format_user_error(&anyhow::Error::new(e).context("Window failed")));
            ExitCode::FAILURE
        }
    }
}

fn prepare() -> Result<Boot> {
    let config = match std::env::var_os("PRISM_FOLIO_CONFIG") {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(path)?,
            None => Config::default_config(),
        },
    };

    let portfolio = config.portfolio()?;
    let page = PageLayout::build(&portfolio, Viewport::default(), 0.0).context("Failed to lay out page")?;
    let store = theme::init(ThemeStore::new(config.preference_store()?, Box::new(EnvAppearance)));
    info!("prism-folio-gui v{}", env!("CARGO_PKG_VERSION"));

    Ok(Boot {
        config,
        portfolio,
        page,
        theme: store,
    })
}
