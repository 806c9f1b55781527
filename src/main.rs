use anyhow::{bail, Result};
use chrono::{FixedOffset, Local, NaiveDate, Offset, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::str::FromStr;

use neatrs::config::AppConfig;
use neatrs::day_window::{DayBoundaryTracker, FileWindowStore};
use neatrs::engine::EnergyBalanceEngine;
use neatrs::logging::{init_logging, LogLevel};
use neatrs::models::{BiologicalSex, UserProfile};
use neatrs::outcome::EnergyBalanceOutcome;
use neatrs::port::JsonFileDataPort;
use neatrs::telemetry::TracingTelemetryReporter;

/// NeatRS - Daily Energy Balance CLI
///
/// Derives today's passive energy expenditure (NEAT) from a total-energy
/// aggregate, explicit exercise sessions, and the user's basal metabolic
/// rate.
#[derive(Parser)]
#[command(name = "neatrs")]
#[command(author = "NeatRS Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Daily Energy Balance CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate today's energy balance from an energy snapshot file
    Balance {
        /// JSON energy snapshot with total_kcal and sessions
        #[arg(short, long)]
        snapshot: PathBuf,
    },

    /// Show the currently pinned day window
    Window,

    /// Show or set the stored user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Show or initialize application configuration
    Config {
        /// Write a default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Display the stored profile
    Show,

    /// Store a profile
    Set {
        /// Biological sex (male or female)
        #[arg(long)]
        sex: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: String,

        /// Weight in kilograms
        #[arg(long)]
        weight_kg: f64,

        /// Height in centimeters
        #[arg(long)]
        height_cm: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    // Verbosity flag overrides the configured level
    let mut log_config = config.logging.clone();
    log_config.level = match cli.verbose {
        0 => log_config.level,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    init_logging(&log_config)?;

    match cli.command {
        Commands::Balance { snapshot } => {
            let profile = match &config.profile {
                Some(profile) => profile.clone(),
                None => bail!("No user profile stored. Run `neatrs profile set` first."),
            };

            let tracker = DayBoundaryTracker::new(FileWindowStore::new(config.window_store_path()));
            let port = JsonFileDataPort::new(&snapshot);
            let mut engine = EnergyBalanceEngine::new(tracker, port, TracingTelemetryReporter);

            let now = Utc::now();
            let tz_offset = current_device_offset();
            let outcome = engine.calculate(&profile, now, tz_offset).await;

            print_outcome(&outcome);
        }

        Commands::Window => {
            let store_path = config.window_store_path();
            let store = FileWindowStore::new(&store_path);
            let mut tracker = DayBoundaryTracker::new(store);

            match tracker.pinned() {
                Some(window) => {
                    println!("{}", "Pinned day window".bold());
                    println!("  Calendar date: {}", window.calendar_date);
                    println!("  Start instant: {}", window.start_instant);
                    println!(
                        "  Zone offset:   {} seconds",
                        window.zone_offset_at_start.local_minus_utc()
                    );
                    println!("  Store:         {}", store_path.display());
                }
                None => println!("No day window pinned yet."),
            }
        }

        Commands::Profile { command } => match command {
            ProfileCommands::Show => match &config.profile {
                Some(profile) => {
                    println!("{}", "Stored profile".bold());
                    println!("  Sex:        {:?}", profile.sex);
                    println!("  Birth date: {}", profile.birth_date);
                    println!("  Weight:     {} kg", profile.weight_kg);
                    println!("  Height:     {} cm", profile.height_cm);
                }
                None => println!("No profile stored."),
            },
            ProfileCommands::Set {
                sex,
                birth_date,
                weight_kg,
                height_cm,
            } => {
                let sex = match sex.to_lowercase().as_str() {
                    "male" | "m" => BiologicalSex::Male,
                    "female" | "f" => BiologicalSex::Female,
                    other => bail!("Unknown sex {other:?}; expected male or female"),
                };
                let birth_date = NaiveDate::from_str(&birth_date)?;

                if weight_kg <= 0.0 || height_cm <= 0.0 {
                    bail!("Weight and height must be positive");
                }

                config.profile = Some(UserProfile {
                    sex,
                    birth_date,
                    weight_kg,
                    height_cm,
                });
                config.save_default()?;
                println!("{}", "✓ Profile saved".green());
            }
        },

        Commands::Config { init } => {
            if init {
                config.save_default()?;
                println!(
                    "{} {}",
                    "✓ Configuration written to".green(),
                    AppConfig::default_config_path().display()
                );
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// The device's current UTC offset, resolved once at the CLI boundary
fn current_device_offset() -> FixedOffset {
    Local::now().offset().fix()
}

fn print_outcome(outcome: &EnergyBalanceOutcome) {
    match outcome {
        EnergyBalanceOutcome::Success(result) => {
            println!("{}", "Today's energy balance".bold());
            println!("  Passive (NEAT): {:.0} kcal", result.passive_kcal);
            println!("  Active:         {:.0} kcal", result.active_kcal);
            println!("  BMR elapsed:    {:.0} kcal", result.bmr_elapsed_kcal);
            if result.is_high_passive_anomaly {
                println!(
                    "  {}",
                    format!(
                        "Warning: passive energy {:.0} kcal exceeds the plausible ceiling of {:.0} kcal",
                        result.raw_passive_kcal, result.plausible_max_kcal
                    )
                    .yellow()
                );
            }
        }
        other => {
            if let Some(message) = other.user_message() {
                println!("{}", message.red());
            }
        }
    }
}
