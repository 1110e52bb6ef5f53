use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tokio::runtime::Runtime;

use crate::catalog::{Catalog, aggregate::StepStatus, files::is_stale};
use crate::config;
use crate::domain::{artist::color_hex, period::FilterPeriod};
use crate::http::server::HttpServer;
use crate::settings::{Settings, SettingsPatch, SettingsStore, Theme};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "trackly")]
#[command(version = "0.1")]
#[command(about = "Tracked artists and their new releases")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Year the release file probing is centered on, defaults to the current year
    #[arg(long)]
    pub current_year: Option<i32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the years that have release files
    Years,
    /// List tracked artists, or show one artist's releases
    Artists {
        /// Exact artist name
        #[arg(short, long)]
        name: Option<String>,
        /// "all" or a year
        #[arg(short, long, default_value = "all")]
        year: FilterPeriod,
    },
    /// List releases of all artists, newest first
    Releases {
        /// "all" or a year
        #[arg(short, long, default_value = "all")]
        year: FilterPeriod,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Show startup marker, roster freshness and load problems
    Status,
    /// Show or change UI settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Run http server exposing the catalog
    Serve,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the stored settings
    Show,
    /// Set the theme, or toggle it when no value is given
    Theme { value: Option<Theme> },
    /// Set how many artists are shown per grid row
    ItemsPerRow {
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Restore the default settings
    Reset,
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::Config::load(&cli.config.to_string_lossy())?;
    let settings = SettingsStore::new(&cfg.settings.dir);
    let catalog = Catalog::from_config(&cfg).context("Failed to set up data source")?;
    let runtime = Arc::new(Runtime::new().context("Failed to start async runtime")?);
    let year = cli.current_year.unwrap_or_else(|| Local::now().year());

    match &cli.command {
        Commands::Years => {
            let years = runtime.block_on(catalog.discover_years(year));
            if years.is_empty() {
                println!("No release files found around {year}");
            }
            for year in years {
                println!("{year}");
            }
        }

        Commands::Artists { name, year: period } => {
            let mut state = AppState::new(settings.load());
            state.replace(runtime.block_on(catalog.load(year)));

            match name {
                Some(name) => {
                    let artist = state
                        .artist(name)
                        .with_context(|| format!("Artist \"{name}\" is not in the roster"))?;

                    println!("{} ({})", artist.name, artist.color_hex());
                    println!("  cover: {}", artist.cover_or_fallback());
                    println!("  backdrop: {}", artist.backdrop_or(&cfg.images.fallback_backdrop));
                    let years: Vec<String> =
                        artist.release_years().iter().map(|y| y.to_string()).collect();
                    println!("  years: {}", years.join(", "));
                    println!("  releases ({period}):");

                    let releases = artist.releases_in(*period);
                    if releases.is_empty() {
                        match period {
                            FilterPeriod::All => println!("    No releases found"),
                            FilterPeriod::Year(y) => println!("    No releases found for {y}"),
                        }
                    }
                    for release in releases {
                        println!("    {}  {}", release.formatted_date(), release.title);
                    }
                }
                None => {
                    let artists = state.artists_sorted();
                    println!(
                        "{} artist(s), {} per row",
                        artists.len(),
                        state.settings.grid_columns()
                    );
                    for artist in artists {
                        let shown = artist.releases_in(*period).len();
                        println!("  {} {} - {} release(s)", artist.color_hex(), artist.name, shown);
                    }
                }
            }
        }

        Commands::Releases {
            year: period,
            offset,
            limit,
        } => {
            let mut state = AppState::new(settings.load());
            state.replace(runtime.block_on(catalog.load(year)));

            let page = state.page(*period, *offset, *limit);
            if page.releases.is_empty() {
                println!("No releases found ({period})");
            }
            for release in &page.releases {
                let color = state
                    .color_of(&release.artist)
                    .map(color_hex)
                    .unwrap_or_default();
                println!(
                    "{}  {} {} - {}",
                    release.formatted_date(),
                    color,
                    release.artist,
                    release.title
                );
            }
            if page.has_more {
                println!(
                    "More releases available, use --offset {}",
                    offset + page.releases.len()
                );
            }
        }

        Commands::Status => {
            let startup = runtime.block_on(catalog.load_startup());
            let aggregation = runtime.block_on(catalog.load(year));

            println!(
                "Initial startup complete: {}",
                startup.initial_startup_complete
            );
            match &aggregation.roster_updated {
                Some(updated) => println!(
                    "Roster updated {updated}{}",
                    if is_stale(Some(updated.as_str()), Local::now().naive_local()) {
                        " (stale)"
                    } else {
                        ""
                    }
                ),
                None => println!("Roster update time unknown"),
            }
            println!(
                "{} artist(s), release files for {} year(s)",
                aggregation.artists.len(),
                aggregation.years.len()
            );

            let report = &aggregation.report;
            if report.is_degraded() {
                println!("Some data could not be loaded:");
            }
            print_step("roster", &report.roster);
            for (year, status) in &report.years {
                print_step(&year.to_string(), status);
            }
            if report.skipped_releases > 0 {
                println!(
                    "  {} release(s) skipped for unreadable dates",
                    report.skipped_releases
                );
            }
        }

        Commands::Serve => {
            println!("Starting HTTP server...");

            let server = HttpServer::new(
                catalog,
                settings,
                Arc::clone(&runtime),
                cfg.http.clone(),
                cfg.images.fallback_backdrop.clone(),
                cli.current_year,
            );
            server
                .reload()
                .map_err(|e| anyhow::anyhow!("Initial load failed: {e}"))?;

            println!(
                "HTTP server running at http://{}:{}",
                server.config.bind_addr, server.config.port
            );
            server.run();
        }

        Commands::Settings { action } => run_settings(&settings, action)?,
    }

    Ok(())
}

fn print_step(label: &str, status: &StepStatus) {
    match status {
        StepStatus::Loaded => println!("  [OK]       {label}"),
        StepStatus::Missing => println!("  [MISSING]  {label}"),
        StepStatus::Failed(reason) => println!("  [FAILED]   {label}: {reason}"),
    }
}

fn run_settings(store: &SettingsStore, action: &SettingsAction) -> anyhow::Result<()> {
    let settings = match action {
        SettingsAction::Show => store.load(),
        SettingsAction::Theme { value } => {
            let theme = value.unwrap_or_else(|| store.load().theme.toggled());
            store.update(&SettingsPatch {
                theme: Some(theme),
                items_per_row: None,
            })?
        }
        SettingsAction::ItemsPerRow { value } => store.update(&SettingsPatch {
            theme: None,
            items_per_row: Some(*value),
        })?,
        SettingsAction::Reset => {
            let defaults = Settings::default();
            store.save(&defaults)?;
            defaults
        }
    };

    println!("theme: {}", settings.theme);
    println!(
        "items per row: {} (grid shows {})",
        settings.items_per_row,
        settings.grid_columns()
    );
    println!("stored in {}", store.path().to_string_lossy());
    Ok(())
}
