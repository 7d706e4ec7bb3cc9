use crate::cli::CliContext;
use crate::constants;
use crate::core::vault::SecretState;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use dialoguer::{Confirm, Password};
use std::io::Read;
use zeroize::Zeroizing;

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Store a new API key (encrypted at rest)
    Set(KeySetArgs),
    /// Show whether a usable API key is stored
    Status,
    /// Remove the stored API key
    Clear(KeyClearArgs),
}

#[derive(Args, Debug)]
pub struct KeySetArgs {
    /// Read the key from stdin instead of an interactive prompt
    #[arg(long)]
    pub from_stdin: bool,
}

#[derive(Args, Debug)]
pub struct KeyClearArgs {
    /// Do not ask for confirmation
    #[arg(long)]
    pub yes: bool,
}

pub fn run(ctx: &mut CliContext, cmd: KeyCommand) -> Result<()> {
    match cmd {
        KeyCommand::Set(args) => run_set(ctx, args),
        KeyCommand::Status => run_status(ctx),
        KeyCommand::Clear(args) => run_clear(ctx, args),
    }
}

fn run_set(ctx: &mut CliContext, args: KeySetArgs) -> Result<()> {
    if !args.from_stdin {
        ctx.require_interactive("key set without --from-stdin")?;
    }
    let secret = read_secret(args.from_stdin)?;
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        bail!("API key must not be empty");
    }

    ctx.app.set_credential(trimmed)?;
    println!(
        "API key saved to {} (encrypted)",
        ctx.app.paths.credential_file.display()
    );
    Ok(())
}

fn run_status(ctx: &CliContext) -> Result<()> {
    match ctx.app.credential_state() {
        SecretState::Loaded(secret) => println!("API key: configured ({})", mask(secret)),
        SecretState::Empty => println!("API key: not configured (run: phishguard key set)"),
        SecretState::CorruptedStore(reason) => {
            println!("API key: stored key is unreadable ({})", reason);
            println!("         enter it again with: phishguard key set");
        }
    }
    Ok(())
}

fn run_clear(ctx: &mut CliContext, args: KeyClearArgs) -> Result<()> {
    if !args.yes {
        ctx.require_interactive("key clear without --yes")?;
        let confirmed = Confirm::new()
            .with_prompt("Remove the stored API key?")
            .default(false)
            .interact()
            .context("read confirmation")?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    if ctx.app.clear_credential()? {
        println!("API key removed");
    } else {
        println!("No API key stored");
    }
    Ok(())
}

fn read_secret(from_stdin: bool) -> Result<Zeroizing<String>> {
    let secret = if from_stdin {
        let mut buf = Zeroizing::new(String::new());
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read API key from stdin")?;
        Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string())
    } else {
        Zeroizing::new(
            Password::new()
                .with_prompt("API key")
                .allow_empty_password(false)
                .interact()
                .context("read API key from prompt")?,
        )
    };
    if secret.len() > constants::MAX_SECRET_SIZE {
        bail!(
            "API key exceeds maximum size ({} bytes, max {} bytes)",
            secret.len(),
            constants::MAX_SECRET_SIZE
        );
    }
    Ok(secret)
}

/// Enough of the key to tell two keys apart, never enough to use it.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
