//! ac-alert: watch an aircraft.json feed and alert when a target aircraft appears.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::{Cell, Table};
use tracing::error;
use tracing_subscriber::EnvFilter;

use acalert_core::config::{self, Config};
use acalert_core::matcher::{find_match, Alert};
use acalert_core::snapshot::{AircraftRecord, AircraftSnapshot};
use acalert_core::types::{AlertError, Result};

use fetch::{DataSource, Fetcher, SnapshotSource};
use notify::NotifierSet;
use poll::Watcher;

mod fetch;
mod notify;
mod poll;

#[cfg(test)]
mod test_support;

#[derive(Parser)]
#[command(name = "ac-alert", version, about = "Aircraft watch and alerting")]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the data source forever and alert on the target aircraft
    Watch(SettingsArgs),

    /// Fetch once, print the aircraft list and whether the target is in it
    Check {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Print the matched record (or null) as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Send a synthetic alert through every enabled channel
    TestAlert(SettingsArgs),

    /// Write a default config file
    Init {
        /// Config file path (default: ~/.ac-alert/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Config file location plus command-line overrides.
#[derive(Args, Clone, Debug, Default)]
struct SettingsArgs {
    /// Config file path (default: ~/.ac-alert/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// aircraft.json path or http(s) URL
    #[arg(long)]
    source: Option<String>,

    /// Target transponder hex (replaces the configured target)
    #[arg(long)]
    hex: Option<String>,

    /// Target callsign (replaces the configured target)
    #[arg(long)]
    flight: Option<String>,

    /// Seconds between polls
    #[arg(long)]
    interval: Option<u64>,

    /// SMTP password
    #[arg(long, env = "AC_ALERT_SMTP_PASSWORD", hide_env_values = true)]
    smtp_password: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "AC_ALERT_TELEGRAM_TOKEN", hide_env_values = true)]
    telegram_token: Option<String>,
}

impl SettingsArgs {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::config_file)
    }

    /// Load the config file, apply overrides, and validate.
    fn load(&self) -> Result<Config> {
        let mut config = config::load_config(&self.config_path())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.source.location = source.clone();
        }
        if self.hex.is_some() || self.flight.is_some() {
            config.target.hex = self.hex.clone();
            config.target.flight = self.flight.clone();
        }
        if let Some(interval) = self.interval {
            config.source.interval_secs = interval;
        }
        if let Some(password) = &self.smtp_password {
            config.email.password = Some(password.clone());
        }
        if let Some(token) = &self.telegram_token {
            config.telegram.bot_token = Some(token.clone());
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Watch(settings) => cmd_watch(&settings, cli.verbose).await,
        Commands::Check { settings, json } => cmd_check(&settings, json, cli.verbose).await,
        Commands::TestAlert(settings) => cmd_test_alert(&settings, cli.verbose).await,
        Commands::Init { config, force } => cmd_init(config, force),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Set up the tracing subscriber. `console.output = false` silences everything.
fn init_logging(config: &Config, verbose: bool) {
    let filter = if !config.console.output {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if verbose {
                EnvFilter::new("ac_alert=debug,warn")
            } else {
                EnvFilter::new("ac_alert=info,warn")
            }
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn cmd_watch(settings: &SettingsArgs, verbose: bool) -> Result<ExitCode> {
    let config = settings.load()?;
    init_logging(&config, verbose);

    let watcher = Watcher::new(
        Fetcher::new(DataSource::parse(&config.source.location)),
        config.alert_target()?,
        NotifierSet::from_config(&config),
        config.interval(),
    );
    watcher.run().await;

    Ok(ExitCode::SUCCESS)
}

async fn cmd_check(settings: &SettingsArgs, json: bool, verbose: bool) -> Result<ExitCode> {
    let config = settings.load()?;
    init_logging(&config, verbose);

    let target = config.alert_target()?;
    let fetcher = Fetcher::new(DataSource::parse(&config.source.location));

    let snapshot = match fetcher.fetch().await {
        Ok(s) => s,
        Err(e) => {
            error!(source = %fetcher.describe(), "{e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    let hit = find_match(&snapshot, &target);

    if json {
        let text = serde_json::to_string_pretty(&hit)
            .map_err(|e| AlertError::Config(e.to_string()))?;
        println!("{text}");
        return Ok(ExitCode::SUCCESS);
    }

    print_snapshot(&snapshot, hit);
    println!();
    match hit {
        Some(ac) => println!(
            "Target {} FOUND: hex {} flight {}",
            target.label(),
            ac.hex.trim(),
            ac.flight.trim()
        ),
        None => println!("Target {} not seen", target.label()),
    }

    Ok(ExitCode::SUCCESS)
}

async fn cmd_test_alert(settings: &SettingsArgs, verbose: bool) -> Result<ExitCode> {
    let config = settings.load()?;
    init_logging(&config, verbose);

    let target = config.alert_target()?;
    let notifiers = NotifierSet::from_config(&config);
    if notifiers.is_empty() {
        eprintln!("No alert channels enabled.");
        return Ok(ExitCode::FAILURE);
    }

    let record = AircraftRecord::new(
        target.hex().unwrap_or_default(),
        target.flight().unwrap_or_default(),
    );
    let report = notifiers.dispatch(&Alert::new(&target, &record)).await;

    println!(
        "Test alert: {} sent, {} skipped, {} failed ({})",
        report.sent,
        report.skipped,
        report.failed,
        notifiers.names().join(", ")
    );

    Ok(if report.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_init(path: Option<PathBuf>, force: bool) -> Result<ExitCode> {
    let path = path.unwrap_or_else(config::config_file);
    if path.exists() && !force {
        return Err(AlertError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    config::save_config(&Config::default(), &path)?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn print_snapshot(snapshot: &AircraftSnapshot, hit: Option<&AircraftRecord>) {
    println!();
    match snapshot.now {
        Some(now) => println!("Aircraft: {} (feed time {now:.1})", snapshot.len()),
        None => println!("Aircraft: {}", snapshot.len()),
    }
    if snapshot.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "", "Hex", "Flight", "Squawk", "Alt (ft)", "Lat", "Lon",
    ]);

    for ac in &snapshot.aircraft {
        let marker = if hit.is_some_and(|h| std::ptr::eq(h, ac)) {
            "*"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(ac.hex.trim()),
            Cell::new(non_empty(ac.flight.trim())),
            Cell::new(ac.squawk.as_deref().unwrap_or("-")),
            Cell::new(
                ac.alt_baro
                    .map(|a| a.to_string())
                    .unwrap_or("-".into()),
            ),
            Cell::new(ac.lat.map(|l| format!("{l:.4}")).unwrap_or("-".into())),
            Cell::new(ac.lon.map(|l| format!("{l:.4}")).unwrap_or("-".into())),
        ]);
    }

    println!("{table}");
}

fn non_empty(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}
