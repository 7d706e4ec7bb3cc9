//! Centralized constants for file names, permissions, and limits.

/// Environment variable that overrides the data directory.
pub const ROOT_ENV: &str = "PHISHGUARD_HOME";

/// Environment variable for the tracing filter.
pub const LOG_ENV: &str = "PHISHGUARD_LOG";

/// Raw symmetric key bytes.
pub const KEY_FILE: &str = "secret.key";

/// Encrypted API credential record.
pub const CREDENTIAL_FILE: &str = "api_key.json";

/// Analysis history document.
pub const HISTORY_FILE: &str = "history.json";

/// Lock guarding history read-modify-write cycles.
pub const HISTORY_LOCK: &str = "history.lock";

/// Optional settings file.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Permission mode for the data directory when we create it.
pub const ROOT_DIR_MODE: u32 = 0o700;

/// Permission mode for the key file and the credential record.
pub const SECRET_FILE_MODE: u32 = 0o600;

/// Permission mode for the history document.
pub const HISTORY_FILE_MODE: u32 = 0o600;

/// Permission mode for settings.toml.
pub const SETTINGS_FILE_MODE: u32 = 0o640;

/// Maximum API key size in bytes (64 KiB).
pub const MAX_SECRET_SIZE: usize = 65_536;

/// Maximum image upload size in bytes (20 MiB).
pub const MAX_IMAGE_SIZE: u64 = 20 * 1_048_576;

/// Image extensions accepted for analysis.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Returned by text extraction when a document holds no text.
pub const NO_TEXT_FOUND: &str = "No text found in PDF.";

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model for text and PDF analysis.
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";

/// Default model for image analysis.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";

pub const DEFAULT_MAX_TOKENS: u32 = 200;

pub const DEFAULT_TEMPERATURE: f32 = 0.5;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
