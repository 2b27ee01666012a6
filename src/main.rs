//! Davai - project documentation generator
//!
//! Turns a project idea and a short clarifying Q&A into a set of project
//! documents (context, architecture, tech stack, tasks, rules, CLAUDE.md, README).

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use davai_core::{load_config, load_from_file, DavaiConfig, ExecutionMode};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Generate project documentation from an idea
#[derive(Parser)]
#[command(name = "davai")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to .davai.toml, then the user config)
    #[arg(short, long, global = true, env = "DAVAI_CONFIG")]
    config: Option<PathBuf>,

    /// Project directory used for config lookup and relative output paths
    #[arg(short, long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate clarifying questions for an idea
    Questions {
        /// Project idea
        idea: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Generate questions and suggested answers for an idea
    Suggest {
        /// Project idea
        idea: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the complete documentation workflow
    Run {
        /// Project idea
        idea: String,

        /// Answer to a clarifying question (repeat, in question order)
        #[arg(short, long = "answer")]
        answers: Vec<String>,

        /// File with answers: a JSON array of strings or one answer per line
        #[arg(long)]
        answers_file: Option<PathBuf>,

        /// Execution mode (chained, parallel)
        #[arg(short, long)]
        mode: Option<ExecutionMode>,

        /// Generate suggested answers (used when no answers are given)
        #[arg(long)]
        suggest: bool,

        /// Do not persist the generated documents
        #[arg(long)]
        no_save: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List saved documentation sets, newest first
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show a saved documentation set
    Show {
        /// Folder name as printed by `list`
        folder: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write a sample .davai.toml into the project directory
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Commands::InitConfig { force } = cli.command {
        return commands::init_config(&cli.dir, force);
    }

    let config = resolve_config(cli.config.as_deref(), &cli.dir)?;

    match cli.command {
        Commands::Questions { idea, json } => commands::questions(&config, &idea, json),
        Commands::Suggest { idea, json } => commands::suggest(&config, &idea, json),
        Commands::Run {
            idea,
            answers,
            answers_file,
            mode,
            suggest,
            no_save,
            json,
        } => {
            let mut answers = answers;
            if let Some(path) = answers_file {
                answers.extend(commands::read_answers_file(&path)?);
            }
            let success = commands::run(
                &config,
                &idea,
                answers,
                commands::RunArgs {
                    mode,
                    suggest,
                    no_save,
                    json,
                },
            )?;
            if !success {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::List { json } => commands::list(&config, json),
        Commands::Show { folder, json } => commands::show(&config, &folder, json),
        Commands::InitConfig { .. } => Ok(()),
    }
}

/// Install the tracing subscriber; logs go to stderr so stdout stays machine-readable
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("davai=debug,davai_core=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("davai=info,davai_core=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn resolve_config(explicit: Option<&Path>, dir: &Path) -> Result<DavaiConfig> {
    let mut config = match explicit {
        Some(path) => load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => load_config(dir).context("Failed to load configuration")?,
    };

    if config.storage.output_dir.is_relative() {
        config.storage.output_dir = dir.join(&config.storage.output_dir);
    }
    if let Some(prompts) = config.workflow.prompts_dir.take() {
        config.workflow.prompts_dir = Some(if prompts.is_relative() {
            dir.join(prompts)
        } else {
            prompts
        });
    }

    Ok(config)
}
