use crate::cli::CliContext;
use crate::core::history;
use crate::models::history::{AnalysisKind, HistoryEntry};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Args, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use dialoguer::Confirm;

/// Longest input/output excerpt shown in the table.
const EXCERPT_CHARS: usize = 80;

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// Show past analyses, newest first
    Show(HistoryShowArgs),
    /// Delete the whole history
    Clear(HistoryClearArgs),
}

#[derive(Args, Debug)]
pub struct HistoryShowArgs {
    /// Maximum number of entries to display
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = HistoryFormat::Table)]
    pub format: HistoryFormat,

    /// Print complete inputs and outputs instead of excerpts
    #[arg(long)]
    pub full: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct HistoryClearArgs {
    /// Do not ask for confirmation
    #[arg(long)]
    pub yes: bool,
}

pub fn run(ctx: &CliContext, cmd: HistoryCommand) -> Result<()> {
    match cmd {
        HistoryCommand::Show(args) => run_show(ctx, args),
        HistoryCommand::Clear(args) => run_clear(ctx, args),
    }
}

fn run_show(ctx: &CliContext, args: HistoryShowArgs) -> Result<()> {
    let entries = history::load_history(&ctx.app.paths)?;
    let total = entries.len();
    let entries = history::newest_first(entries, Some(args.limit));

    if args.format == HistoryFormat::Json {
        let json = serde_json::to_string_pretty(&entries).context("serialize history")?;
        println!("{}", json);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No analyses recorded yet.");
        return Ok(());
    }

    if args.full {
        for entry in &entries {
            print_full(entry);
        }
        println!("{} of {} entries shown.", entries.len(), total);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Timestamp").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
        Cell::new("File").add_attribute(Attribute::Bold),
        Cell::new("Input").add_attribute(Attribute::Bold),
        Cell::new("Result").add_attribute(Attribute::Bold),
    ]);

    for entry in &entries {
        table.add_row(vec![
            local_time(entry),
            entry.kind.to_string(),
            entry.filename.clone().unwrap_or_else(|| "-".to_string()),
            input_summary(entry),
            excerpt(&entry.output, EXCERPT_CHARS),
        ]);
    }

    println!("{}", table);
    println!("\n{} of {} entries shown.", entries.len(), total);
    Ok(())
}

fn run_clear(ctx: &CliContext, args: HistoryClearArgs) -> Result<()> {
    if !args.yes {
        ctx.require_interactive("history clear without --yes")?;
        let confirmed = Confirm::new()
            .with_prompt("Delete the entire analysis history?")
            .default(false)
            .interact()
            .context("read confirmation")?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    if history::clear_history(&ctx.app.paths)? {
        println!("History cleared");
    } else {
        println!("No history to clear");
    }
    Ok(())
}

fn print_full(entry: &HistoryEntry) {
    println!("== {} [{}]", local_time(entry), entry.kind);
    if let Some(name) = &entry.filename {
        println!("file: {}", name);
    }
    match entry.kind {
        AnalysisKind::Image => println!("input: {}", input_summary(entry)),
        AnalysisKind::Text | AnalysisKind::Pdf => println!("input:\n{}", entry.input),
    }
    println!("result:\n{}\n", entry.output);
}

fn local_time(entry: &HistoryEntry) -> String {
    let local: DateTime<Local> = entry.timestamp.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Images are stored as base64; show their size rather than the payload.
fn input_summary(entry: &HistoryEntry) -> String {
    match entry.kind {
        AnalysisKind::Image => format!("[image, {} bytes base64]", entry.input.len()),
        AnalysisKind::Text | AnalysisKind::Pdf => excerpt(&entry.input, EXCERPT_CHARS),
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
}
