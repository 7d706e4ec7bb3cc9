//! Core business logic modules.

pub mod context;
pub mod crypto;
pub mod detector;
pub mod extract;
pub mod file_lock;
pub mod history;
pub mod inference;
pub mod paths;
pub mod sales;
pub mod settings;
pub mod vault;
