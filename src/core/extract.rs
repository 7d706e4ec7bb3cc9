//! Plain-text extraction from uploaded documents.
//!
//! Parsing is delegated to poppler's `pdftotext`; this module only runs it and
//! normalizes the result.

use crate::constants;
use crate::error::{ExtractError, ExtractResult};
use std::io;
use std::path::Path;
use std::process::Command;

pub trait TextExtractor {
    /// Text of every page, or [`constants::NO_TEXT_FOUND`] when there is none.
    fn extract_text(&self, document: &Path) -> ExtractResult<String>;
}

/// Runs `pdftotext` (or another binary with the same interface).
#[derive(Debug, Clone)]
pub struct PdfToText {
    program: String,
}

impl Default for PdfToText {
    fn default() -> Self {
        Self {
            program: "pdftotext".to_string(),
        }
    }
}

impl PdfToText {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn available(&self) -> bool {
        Command::new(&self.program)
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl TextExtractor for PdfToText {
    fn extract_text(&self, document: &Path) -> ExtractResult<String> {
        if !document.is_file() {
            return Err(ExtractError::NotFound(document.to_path_buf()));
        }

        let output = Command::new(&self.program)
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(document)
            .arg("-")
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ExtractError::ToolUnavailable(format!(
                    "{} not found on PATH (install poppler-utils)",
                    self.program
                )),
                _ => ExtractError::Failed(format!("run {}: {}", self.program, e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = normalize_pages(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(document = %document.display(), chars = text.len(), "extracted document text");
        Ok(text)
    }
}

/// Join non-blank pages (form-feed separated) with newlines; sentinel when nothing remains.
pub fn normalize_pages(raw: &str) -> String {
    let pages: Vec<&str> = raw
        .split('\u{c}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect();
    if pages.is_empty() {
        constants::NO_TEXT_FOUND.to_string()
    } else {
        pages.join("\n")
    }
}

/// Whether extracted text is something worth sending to the model.
pub fn is_analyzable(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed != constants::NO_TEXT_FOUND
}
