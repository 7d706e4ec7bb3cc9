use crate::cli::CliContext;
use crate::core::detector::{Analysis, Detector};
use crate::core::extract::PdfToText;
use crate::core::inference::OpenAiClient;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use dialoguer::Input;
use std::io::Read;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum AnalyzeCommand {
    /// Check a message or email body
    Text(TextArgs),
    /// Check a screenshot (png, jpg, jpeg)
    Image(ImageArgs),
    /// Extract the text of a PDF and check it
    Pdf(PdfArgs),
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Text to analyze (prompted for when omitted)
    pub text: Option<String>,

    /// Read the text from stdin
    #[arg(long, conflicts_with = "text")]
    pub from_stdin: bool,
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Image file
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct PdfArgs {
    /// PDF file
    pub path: PathBuf,

    /// Print the extracted text before the verdict
    #[arg(long)]
    pub show_text: bool,

    /// Extraction program with a pdftotext-compatible interface
    #[arg(long, default_value = "pdftotext")]
    pub extractor: String,
}

pub fn run(ctx: &CliContext, cmd: AnalyzeCommand) -> Result<()> {
    let app = &ctx.app;
    // An empty key is fine here: the detector refuses to call out without one.
    let client = OpenAiClient::new(&app.settings.inference, app.credential().unwrap_or_default())?;

    let analysis = match cmd {
        AnalyzeCommand::Text(args) => {
            let text = read_text(ctx, args)?;
            let extractor = PdfToText::default();
            Detector::new(app, &client, &extractor).analyze_text(&text)?
        }
        AnalyzeCommand::Image(args) => {
            let extractor = PdfToText::default();
            Detector::new(app, &client, &extractor).analyze_image(&args.path)?
        }
        AnalyzeCommand::Pdf(args) => {
            let extractor = PdfToText::with_program(args.extractor);
            let detector = Detector::new(app, &client, &extractor);
            let text = detector.extract_pdf(&args.path)?;
            if args.show_text {
                println!("Extracted text");
                println!("--------------");
                println!("{}", text);
                println!();
            }
            let filename = args.path.file_name().and_then(|n| n.to_str());
            detector.analyze_extracted(&text, filename)?
        }
    };

    finish(&analysis)
}

/// Print the verdict; a failed model call becomes the command's error.
fn finish(analysis: &Analysis) -> Result<()> {
    print_analysis(analysis);
    if !analysis.succeeded {
        bail!("{} analysis did not complete", analysis.kind);
    }
    Ok(())
}

fn read_text(ctx: &CliContext, args: TextArgs) -> Result<String> {
    if let Some(text) = args.text {
        return Ok(text);
    }
    if args.from_stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read text from stdin")?;
        return Ok(buf);
    }
    if ctx.non_interactive {
        bail!("--non-interactive requires the text argument or --from-stdin");
    }
    Input::<String>::new()
        .with_prompt("Text to analyze")
        .allow_empty(true)
        .interact_text()
        .context("read text from prompt")
}

fn print_analysis(analysis: &Analysis) {
    println!("Result ({})", analysis.kind);
    println!("------");
    println!("{}", analysis.output);
    if !analysis.recorded {
        println!();
        println!("(not saved to history)");
    }
}
