//! Typed errors for the vault, inference, extraction, and detection layers.
//!
//! CLI handlers wrap these in `anyhow` with context; library callers can
//! match on them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("key file {path} holds {found} bytes, expected {expected}")]
    InvalidKey {
        path: PathBuf,
        found: usize,
        expected: usize,
    },

    #[error("key file missing: {0}")]
    KeyMissing(PathBuf),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: wrong key or corrupted data")]
    Decryption,

    #[error("credential record is malformed: {0}")]
    MalformedRecord(String),

    #[error("secret exceeds maximum size ({size} bytes, max {max} bytes)")]
    SecretTooLarge { size: usize, max: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VaultError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures of the outbound completion call.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("endpoint returned no content")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("document not found: {0}")]
    NotFound(PathBuf),

    #[error("text extraction tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("text extraction failed: {0}")]
    Failed(String),
}

/// Rejections that happen before any external call is made.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("no input given: enter some text to analyze")]
    EmptyInput,

    #[error("no API key configured: run `phishguard key set` first")]
    MissingCredential,

    #[error("unsupported image type '{0}' (use png, jpg or jpeg)")]
    UnsupportedImage(String),

    #[error("image is too large ({size} bytes, max {max} bytes)")]
    ImageTooLarge { size: u64, max: u64 },

    #[error("no analyzable text found in the PDF")]
    NoAnalyzableText,

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history update failed: {0:#}")]
    History(anyhow::Error),
}

pub type VaultResult<T> = Result<T, VaultError>;
pub type InferenceResult<T> = Result<T, InferenceError>;
pub type ExtractResult<T> = Result<T, ExtractError>;
