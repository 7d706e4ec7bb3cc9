//! Analysis flows for text, screenshots, and PDF documents.
//!
//! Input problems and a missing API key are rejected before the model is
//! called. Once the call is made its failure is not an error: it comes back as
//! a displayable message in [`Analysis::output`].

use crate::constants;
use crate::core::context::AppContext;
use crate::core::extract::{self, TextExtractor};
use crate::core::history;
use crate::core::inference::{CompletionClient, CompletionRequest, UserContent};
use crate::error::DetectError;
use crate::models::history::AnalysisKind;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::Path;

const TEXT_SYSTEM_PROMPT: &str = "You are an expert in detecting phishing and fraud in text.";

const IMAGE_SYSTEM_PROMPT: &str = "You are an expert in detecting phishing and fraud in images.";

const ANSWER_FORMAT: &str = "Answer format:\nProbability: X%\nExplanation: [your explanation here]";

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub kind: AnalysisKind,
    /// Model verdict, or an error message when the call failed.
    pub output: String,
    pub succeeded: bool,
    pub recorded: bool,
}

pub struct Detector<'a> {
    ctx: &'a AppContext,
    client: &'a dyn CompletionClient,
    extractor: &'a dyn TextExtractor,
}

impl<'a> Detector<'a> {
    pub fn new(
        ctx: &'a AppContext,
        client: &'a dyn CompletionClient,
        extractor: &'a dyn TextExtractor,
    ) -> Self {
        Self {
            ctx,
            client,
            extractor,
        }
    }

    pub fn analyze_text(&self, text: &str) -> Result<Analysis, DetectError> {
        if text.trim().is_empty() {
            return Err(DetectError::EmptyInput);
        }
        self.require_credential()?;
        let request = self.text_request(text);
        self.run(AnalysisKind::Text, &request, text, None)
    }

    pub fn analyze_image(&self, path: &Path) -> Result<Analysis, DetectError> {
        let mime = image_mime(path)?;
        let size = fs::metadata(path)
            .map_err(|source| DetectError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if size > constants::MAX_IMAGE_SIZE {
            return Err(DetectError::ImageTooLarge {
                size,
                max: constants::MAX_IMAGE_SIZE,
            });
        }
        let bytes = fs::read(path).map_err(|source| DetectError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(DetectError::EmptyInput);
        }
        self.require_credential()?;

        let encoded = STANDARD.encode(&bytes);
        let inference = &self.ctx.settings.inference;
        let request = CompletionRequest {
            model: inference.vision_model.clone(),
            system_prompt: IMAGE_SYSTEM_PROMPT.to_string(),
            content: UserContent::TextWithImage {
                text: image_prompt(),
                image_data_url: format!("data:{};base64,{}", mime, encoded),
            },
            max_tokens: inference.max_tokens,
            temperature: inference.temperature,
        };
        self.run(AnalysisKind::Image, &request, &encoded, file_name(path).as_deref())
    }

    /// Extracted text, or a rejection when the document has none.
    pub fn extract_pdf(&self, path: &Path) -> Result<String, DetectError> {
        let text = self.extractor.extract_text(path)?;
        if !extract::is_analyzable(&text) {
            return Err(DetectError::NoAnalyzableText);
        }
        Ok(text)
    }

    pub fn analyze_pdf(&self, path: &Path) -> Result<Analysis, DetectError> {
        let text = self.extract_pdf(path)?;
        self.analyze_extracted(&text, file_name(path).as_deref())
    }

    /// Run the text prompt over already-extracted document text.
    pub fn analyze_extracted(
        &self,
        text: &str,
        filename: Option<&str>,
    ) -> Result<Analysis, DetectError> {
        if !extract::is_analyzable(text) {
            return Err(DetectError::NoAnalyzableText);
        }
        self.require_credential()?;
        let request = self.text_request(text);
        self.run(AnalysisKind::Pdf, &request, text, filename)
    }

    fn require_credential(&self) -> Result<(), DetectError> {
        match self.ctx.credential() {
            Some(_) => Ok(()),
            None => Err(DetectError::MissingCredential),
        }
    }

    fn text_request(&self, text: &str) -> CompletionRequest {
        let inference = &self.ctx.settings.inference;
        CompletionRequest {
            model: inference.text_model.clone(),
            system_prompt: TEXT_SYSTEM_PROMPT.to_string(),
            content: UserContent::Text(text_prompt(text)),
            max_tokens: inference.max_tokens,
            temperature: inference.temperature,
        }
    }

    fn run(
        &self,
        kind: AnalysisKind,
        request: &CompletionRequest,
        input: &str,
        filename: Option<&str>,
    ) -> Result<Analysis, DetectError> {
        let (output, succeeded) = match self.client.complete(request) {
            Ok(verdict) => (verdict, true),
            Err(err) => {
                tracing::warn!(kind = %kind, error = %err, "model call failed");
                (format!("Error during {} analysis: {}", kind, err), false)
            }
        };

        let record = succeeded || self.ctx.settings.history.record_failures;
        if record {
            history::append_entry(&self.ctx.paths, kind, input, &output, filename)
                .map_err(DetectError::History)?;
        }
        tracing::info!(kind = %kind, succeeded, recorded = record, "analysis finished");

        Ok(Analysis {
            kind,
            output,
            succeeded,
            recorded: record,
        })
    }
}

fn text_prompt(text: &str) -> String {
    format!(
        "Analyze the following text for signs of phishing or fraud. Provide:\n\
         1. A probability (0-100%) that it is fraudulent.\n\
         2. A short explanation of the findings.\n\
         Look for typical phishing traits such as urgent language, suspicious links, \
         requests for personal data, or impersonation of trusted sources.\n\n\
         Text: \"{}\"\n\n{}",
        text, ANSWER_FORMAT
    )
}

fn image_prompt() -> String {
    format!(
        "Analyze the following image for signs of phishing or fraud (for example suspicious \
         emails, fake websites, or fraudulent messages). Provide:\n\
         1. A probability (0-100%) that it is fraudulent.\n\
         2. A short explanation of the findings.\n\
         Look for visual cues such as forged logos, spelling mistakes, suspicious links, \
         or requests for personal data.\n\n{}",
        ANSWER_FORMAT
    )
}

fn image_mime(path: &Path) -> Result<&'static str, DetectError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !constants::IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(DetectError::UnsupportedImage(ext));
    }
    Ok(if ext == "png" { "image/png" } else { "image/jpeg" })
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}
