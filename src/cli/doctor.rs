//! Read-only diagnostics for the data directory and external tooling.

use crate::cli::CliContext;
use crate::constants;
use crate::core::extract::PdfToText;
use crate::core::history;
use crate::core::vault::{self, SecretState};
use crate::util::fs as app_fs;
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// PDF extraction program to probe
    #[arg(long, default_value = "pdftotext")]
    pub extractor: String,
}

#[derive(Default)]
struct Tally {
    ok: u32,
    warn: u32,
    fail: u32,
}

impl Tally {
    fn pass(&mut self, msg: impl AsRef<str>) {
        println!("  [PASS] {}", msg.as_ref());
        self.ok += 1;
    }

    fn warn(&mut self, msg: impl AsRef<str>) {
        println!("  [WARN] {}", msg.as_ref());
        self.warn += 1;
    }

    fn fail(&mut self, msg: impl AsRef<str>) {
        println!("  [FAIL] {}", msg.as_ref());
        self.fail += 1;
    }
}

pub fn run(ctx: &CliContext, args: DoctorArgs) -> Result<()> {
    let paths = &ctx.app.paths;
    let mut tally = Tally::default();

    println!("Doctor: {}", paths);

    if paths.root.is_dir() {
        tally.pass(format!("data directory exists: {}", paths.root.display()));
    } else {
        tally.fail(format!(
            "data directory missing: {} (run: phishguard init)",
            paths.root.display()
        ));
    }

    if vault::key_exists(paths) {
        match app_fs::mode_of(&paths.key_file) {
            Some(mode) if mode == constants::SECRET_FILE_MODE => {
                tally.pass(format!("encryption key present, mode {:04o}", mode))
            }
            Some(mode) => tally.warn(format!(
                "encryption key mode {:04o} (expected {:04o})",
                mode,
                constants::SECRET_FILE_MODE
            )),
            None => tally.pass("encryption key present"),
        }
    } else {
        tally.warn(format!(
            "encryption key missing: {} (created on first use)",
            paths.key_file.display()
        ));
    }

    match ctx.app.credential_state() {
        SecretState::Loaded(_) => tally.pass("API key stored and decryptable"),
        SecretState::Empty => tally.warn("no API key stored (run: phishguard key set)"),
        SecretState::CorruptedStore(reason) => {
            tally.fail(format!("stored API key unreadable: {}", reason))
        }
    }

    match history::load_history(paths) {
        Ok(entries) => tally.pass(format!("history readable: {} entries", entries.len())),
        Err(e) => tally.fail(format!("history unreadable: {:#}", e)),
    }

    match &ctx.settings_load_warning {
        Some(w) => tally.warn(format!("settings ignored, using defaults: {}", w)),
        None if paths.settings_file.exists() => tally.pass(format!(
            "settings loaded: {}",
            paths.settings_file.display()
        )),
        None => tally.pass("settings: defaults (no settings.toml)"),
    }

    let extractor = PdfToText::with_program(args.extractor.as_str());
    if extractor.available() {
        tally.pass(format!("{} available", args.extractor));
    } else {
        tally.warn(format!(
            "{} not found on PATH (PDF analysis unavailable)",
            args.extractor
        ));
    }

    println!();
    println!(
        "Doctor summary: {} pass, {} warn, {} fail",
        tally.ok, tally.warn, tally.fail
    );
    if tally.fail > 0 {
        bail!("doctor found {} failing check(s)", tally.fail);
    }
    Ok(())
}
