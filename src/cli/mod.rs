//! CLI routing and command dispatch.

use crate::core::context::AppContext;
use crate::core::paths::AppPaths;
use crate::core::vault;
use crate::models::settings::Settings;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod analyze;
pub mod doctor;
pub mod history;
pub mod init;
pub mod key;
pub mod sales;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub app: AppContext,
    pub non_interactive: bool,
    pub settings_load_warning: Option<String>,
}

impl CliContext {
    /// Fail fast when a prompt would be needed but prompting is disabled.
    pub fn require_interactive(&self, what: &str) -> Result<()> {
        if self.non_interactive {
            bail!("--non-interactive: {} cannot prompt", what);
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(name = "phishguard", version, about = "Phishing and fraud checks backed by a hosted language model")]
pub struct Cli {
    /// Data directory (default: $PHISHGUARD_HOME, then the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "PHISHGUARD_NON_INTERACTIVE")]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let paths = AppPaths::resolve(self.root)?;

        // `doctor` must still run when settings.toml is broken, so it can report it.
        let mut settings_load_warning = None;
        let app = match AppContext::init(paths.clone()) {
            Ok(app) => app,
            Err(e) if matches!(self.command, Commands::Doctor(_)) => {
                settings_load_warning = Some(format!("{:#}", e));
                let credential = vault::load_secret_state(&paths);
                AppContext::with_parts(paths, Settings::default(), credential)
            }
            Err(e) => return Err(e),
        };

        let mut ctx = CliContext {
            app,
            non_interactive: self.non_interactive,
            settings_load_warning,
        };

        match self.command {
            Commands::Init(args) => init::run(&ctx, args),
            Commands::Key { command } => key::run(&mut ctx, command),
            Commands::Analyze { command } => analyze::run(&ctx, command),
            Commands::History { command } => history::run(&ctx, command),
            Commands::Sales(args) => sales::run(&ctx, args),
            Commands::Doctor(args) => doctor::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory, the encryption key, and a default settings file
    Init(init::InitArgs),
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        command: key::KeyCommand,
    },
    /// Check text, an image, or a PDF for phishing and fraud
    Analyze {
        #[command(subcommand)]
        command: analyze::AnalyzeCommand,
    },
    /// View or clear the analysis history
    History {
        #[command(subcommand)]
        command: history::HistoryCommand,
    },
    /// Explore a sales CSV by product and month
    Sales(sales::SalesArgs),
    /// Diagnose the data directory and tooling (safe, read-only)
    Doctor(doctor::DoctorArgs),
}
