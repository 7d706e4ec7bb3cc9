//! Serializable data structures persisted on disk.

pub mod credential;
pub mod history;
pub mod settings;
