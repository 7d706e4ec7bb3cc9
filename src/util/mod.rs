//! Filesystem helpers shared by the vault, history, and settings stores.

pub mod fs;
