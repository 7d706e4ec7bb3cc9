//! Phishing and fraud checks backed by a hosted language model.
//!
//! Collects text, screenshots, or PDF text from the user, asks a
//! chat-completions endpoint for a verdict, and keeps two things on disk:
//! the API key, encrypted with a locally generated AES-256-GCM key, and a
//! JSON history of every analysis.
//!
//! ## Modules
//! - `cli`: Command-line handlers
//! - `core`: Business logic (vault, history, detector, inference, extraction, sales)
//! - `models`: Data structures
//! - `util`: Filesystem helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod util;
