use crate::cli::CliContext;
use crate::constants;
use crate::core::{settings, vault};
use crate::util::fs as app_fs;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite settings.toml with the current (or default) values
    #[arg(long)]
    pub write_settings: bool,
}

pub fn run(ctx: &CliContext, args: InitArgs) -> Result<()> {
    let paths = &ctx.app.paths;
    app_fs::ensure_dir(&paths.root, constants::ROOT_DIR_MODE)
        .with_context(|| format!("create data directory {}", paths.root.display()))?;

    let existed = vault::key_exists(paths);
    vault::get_or_create_key(paths)?;
    if existed {
        println!("encryption key: {} (existing)", paths.key_file.display());
    } else {
        println!("encryption key: {} (created)", paths.key_file.display());
    }

    if args.write_settings || !paths.settings_file.exists() {
        settings::save(&paths.settings_file, &ctx.app.settings)?;
        println!("settings: {} (written)", paths.settings_file.display());
    } else {
        println!("settings: {} (kept)", paths.settings_file.display());
    }

    println!("initialized at {}", paths.root.display());
    if ctx.app.credential().is_none() {
        println!("next: phishguard key set");
    }
    Ok(())
}
