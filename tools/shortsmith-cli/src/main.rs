//! Shortsmith CLI: turn gameplay recordings into vertical Shorts.
//!
//! Usage:
//!   shortsmith render [INPUT TITLE BROADCASTER GAME]   Assemble and render a Short
//!   shortsmith plan <INPUT>                            Print the composition plan
//!   shortsmith check                                   Check external tools and assets
//!   shortsmith config                                  Show the effective configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "shortsmith",
    about = "Vertical Shorts from gameplay + webcam recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Pipeline config JSON (resolution, webcam zone, encoder, ...)
    #[arg(long, global = true)]
    pipeline: Option<PathBuf>,

    /// Application config JSON (defaults to $XDG_CONFIG_HOME/shortsmith/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding background, outro and font assets
    #[arg(long, global = true)]
    assets_dir: Option<PathBuf>,

    /// Path to haarcascade_frontalface_default.xml
    #[arg(long, global = true)]
    cascade: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a Short and render it
    Render {
        /// Source recording (all four positionals, or none for the built-in test values)
        input: Option<PathBuf>,

        /// Title shown at the top
        title: Option<String>,

        /// Broadcaster name shown as @handle at the bottom
        broadcaster: Option<String>,

        /// Game name (passed through)
        game: Option<String>,

        /// Output file path
        #[arg(short, long, default_value = "output.mp4")]
        output: PathBuf,

        /// Requested maximum duration in seconds (the configured cap wins)
        #[arg(long, default_value = "180")]
        max_duration: f64,

        /// Write <output>.plan.json next to the rendered file
        #[arg(long)]
        plan_report: bool,
    },

    /// Classify a recording and print its composition plan without rendering
    Plan {
        /// Source recording
        input: PathBuf,

        /// Title shown at the top
        #[arg(long)]
        title: Option<String>,

        /// Broadcaster name
        #[arg(long)]
        broadcaster: Option<String>,
    },

    /// Check external tools, the face detector and assets
    Check,

    /// Show the effective configuration
    Config {
        /// Save the application config to its standard location
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = commands::Settings::load(&cli.settings)?;

    let mut logging = settings.app.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    shortsmith_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Render {
            input,
            title,
            broadcaster,
            game,
            output,
            max_duration,
            plan_report,
        } => {
            let request = commands::render::RenderRequest::from_positionals(
                input,
                title,
                broadcaster,
                game,
            );
            commands::render::run(settings, request, output, max_duration, plan_report).await
        }
        Commands::Plan {
            input,
            title,
            broadcaster,
        } => commands::plan::run(settings, input, title, broadcaster),
        Commands::Check => commands::check::run(&settings),
        Commands::Config { save } => commands::config::run(&settings, save),
    }
}
