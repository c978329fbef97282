//! casewriter CLI: the main entry point.
//!
//! Commands:
//! - `onboard`     Create the config directory, config.toml and a secrets template
//! - `instructor`  Save or show the instructor setup
//! - `run`         Generate a case study for one company and job title
//! - `doctor`      Check configuration, setup and credentials

use std::path::PathBuf;

use casewriter_config::PipelineVariant;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "casewriter",
    about = "casewriter: personalized business-school case studies",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Manage the instructor setup
    Instructor {
        #[command(subcommand)]
        action: InstructorAction,
    },

    /// Generate a full case study
    Run {
        /// Company the case is written about
        #[arg(long)]
        company: String,

        /// Job title the case is focused on
        #[arg(long)]
        job_title: String,

        /// Where to write the markdown document
        #[arg(short, long, default_value = "case_study.md")]
        output: PathBuf,

        /// Print every intermediate step after the run
        #[arg(long)]
        show_steps: bool,

        /// Override the configured chain (basic, researched, agentic)
        #[arg(long)]
        variant: Option<PipelineVariant>,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },

    /// Diagnose configuration and credentials
    Doctor,
}

#[derive(Subcommand)]
enum InstructorAction {
    /// Save the setup; refuses to replace an existing one without --force
    Save {
        #[command(flatten)]
        fields: commands::instructor::InstructorFields,

        /// Replace an existing setup
        #[arg(long)]
        force: bool,
    },

    /// Print the saved setup
    Show,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Instructor { action } => match action {
            InstructorAction::Save { fields, force } => {
                commands::instructor::save(fields, force).await?
            }
            InstructorAction::Show => commands::instructor::show().await?,
        },
        Commands::Run {
            company,
            job_title,
            output,
            show_steps,
            variant,
            model,
        } => {
            commands::run::run(commands::run::RunArgs {
                company,
                job_title,
                output,
                show_steps,
                variant,
                model,
            })
            .await?
        }
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
