//! Encrypted at-rest storage for the single API credential.
//!
//! The key file holds raw AES-256 key bytes and is created on first use. The
//! credential record is JSON `{"encrypted_key": "<base64>"}`. Anything that
//! stops the record from opening (missing key, wrong key, tampering, junk
//! JSON) degrades to "no credential" instead of failing the caller.

use crate::constants;
use crate::core::crypto::{VaultKey, KEY_SIZE};
use crate::core::paths::AppPaths;
use crate::error::{VaultError, VaultResult};
use crate::models::credential::StoredCredential;
use crate::util::fs as app_fs;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use zeroize::Zeroizing;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Outcome of reading the credential record.
pub enum SecretState {
    Loaded(Zeroizing<String>),
    /// No record on disk, or the record holds an empty secret.
    Empty,
    /// A record exists but could not be opened.
    CorruptedStore(String),
}

impl SecretState {
    /// The plaintext, or an empty string for both non-loaded states.
    pub fn into_secret(self) -> Zeroizing<String> {
        match self {
            SecretState::Loaded(secret) => secret,
            SecretState::Empty | SecretState::CorruptedStore(_) => Zeroizing::new(String::new()),
        }
    }
}

impl fmt::Debug for SecretState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretState::Loaded(_) => f.write_str("Loaded(<redacted>)"),
            SecretState::Empty => f.write_str("Empty"),
            SecretState::CorruptedStore(reason) => {
                f.debug_tuple("CorruptedStore").field(reason).finish()
            }
        }
    }
}

/// Load the key file, or generate and persist a new key if there is none.
///
/// Concurrent first calls agree on one key: the file is published with a
/// no-clobber rename and the loser reads the winner's key.
pub fn get_or_create_key(paths: &AppPaths) -> VaultResult<VaultKey> {
    match read_key(paths) {
        Ok(key) => return Ok(key),
        Err(VaultError::Io { ref source, .. }) if source.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    app_fs::ensure_dir(&paths.root, constants::ROOT_DIR_MODE)
        .map_err(|e| VaultError::io(&paths.root, e))?;
    let key = VaultKey::generate();
    match publish_key(paths, &key) {
        Ok(()) => {
            tracing::info!(path = %paths.key_file.display(), "generated new vault key");
            Ok(key)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => read_key(paths),
        Err(e) => Err(VaultError::io(&paths.key_file, e)),
    }
}

fn read_key(paths: &AppPaths) -> VaultResult<VaultKey> {
    let bytes = Zeroizing::new(
        fs::read(&paths.key_file).map_err(|e| VaultError::io(&paths.key_file, e))?,
    );
    VaultKey::from_slice(&bytes).ok_or_else(|| VaultError::InvalidKey {
        path: paths.key_file.clone(),
        found: bytes.len(),
        expected: KEY_SIZE,
    })
}

fn publish_key(paths: &AppPaths, key: &VaultKey) -> io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".key-")
        .tempfile_in(&paths.root)?;
    tmp.write_all(key.as_bytes())?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(constants::SECRET_FILE_MODE))?;

    tmp.persist_noclobber(&paths.key_file)
        .map_err(|err| err.error)?;
    Ok(())
}

/// Encrypt `plaintext` and replace the credential record.
pub fn save_secret(paths: &AppPaths, plaintext: &str) -> VaultResult<()> {
    if plaintext.len() > constants::MAX_SECRET_SIZE {
        return Err(VaultError::SecretTooLarge {
            size: plaintext.len(),
            max: constants::MAX_SECRET_SIZE,
        });
    }

    let key = get_or_create_key(paths)?;
    let sealed = key.seal(plaintext.as_bytes())?;
    let record = StoredCredential {
        encrypted_key: STANDARD.encode(sealed),
    };
    let data = serde_json::to_vec(&record)?;

    app_fs::write_atomic(&paths.credential_file, &data, constants::SECRET_FILE_MODE)
        .map_err(|e| VaultError::io(&paths.credential_file, e))?;
    tracing::info!(path = %paths.credential_file.display(), "credential saved");
    Ok(())
}

/// Read and decrypt the credential record, classifying every failure.
pub fn load_secret_state(paths: &AppPaths) -> SecretState {
    let data = match fs::read(&paths.credential_file) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return SecretState::Empty,
        Err(e) => return corrupted(VaultError::io(&paths.credential_file, e)),
    };

    match open_record(paths, &data) {
        Ok(secret) if secret.is_empty() => SecretState::Empty,
        Ok(secret) => SecretState::Loaded(secret),
        Err(e) => corrupted(e),
    }
}

fn open_record(paths: &AppPaths, data: &[u8]) -> VaultResult<Zeroizing<String>> {
    let record: StoredCredential = serde_json::from_slice(data)
        .map_err(|e| VaultError::MalformedRecord(e.to_string()))?;
    let sealed = STANDARD
        .decode(record.encrypted_key.trim())
        .map_err(|e| VaultError::MalformedRecord(format!("invalid base64: {}", e)))?;

    // Reading never mints a key; a record without one is unreadable.
    let key = read_key(paths).map_err(|e| match e {
        VaultError::Io { path, source } if source.kind() == io::ErrorKind::NotFound => {
            VaultError::KeyMissing(path)
        }
        other => other,
    })?;
    let plaintext = key.open(&sealed)?;
    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| VaultError::MalformedRecord("plaintext is not UTF-8".to_string()))?;
    Ok(Zeroizing::new(text.to_string()))
}

fn corrupted(err: VaultError) -> SecretState {
    tracing::warn!(error = %err, "stored credential unusable, treating as unset");
    SecretState::CorruptedStore(err.to_string())
}

/// Plaintext credential, or an empty string when none is usable.
pub fn load_secret(paths: &AppPaths) -> Zeroizing<String> {
    load_secret_state(paths).into_secret()
}

pub fn key_exists(paths: &AppPaths) -> bool {
    paths.key_file.is_file()
}

/// Remove the credential record. The key file stays.
pub fn clear_secret(paths: &AppPaths) -> VaultResult<bool> {
    match fs::remove_file(&paths.credential_file) {
        Ok(()) => {
            tracing::info!(path = %paths.credential_file.display(), "credential removed");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(VaultError::io(&paths.credential_file, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_paths() -> (TempDir, AppPaths) {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::from_root(dir.path().to_path_buf());
        (dir, paths)
    }

    #[test]
    fn test_key_created_once_and_reused() {
        let (_dir, paths) = test_paths();
        assert!(!paths.key_file.exists());
        let first = get_or_create_key(&paths).unwrap();
        assert!(paths.key_file.exists());
        let second = get_or_create_key(&paths).unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&paths.key_file).unwrap().len(), KEY_SIZE);
    }

    #[cfg(unix)]
    #[test]
    fn test_key_and_record_are_owner_only() {
        let (_dir, paths) = test_paths();
        save_secret(&paths, "sk-test-123").unwrap();
        assert_eq!(app_fs::mode_of(&paths.key_file), Some(0o600));
        assert_eq!(app_fs::mode_of(&paths.credential_file), Some(0o600));
    }

    #[test]
    fn test_invalid_key_length_is_an_error() {
        let (_dir, paths) = test_paths();
        fs::write(&paths.key_file, b"too-short").unwrap();
        let err = get_or_create_key(&paths).unwrap_err();
        assert!(matches!(err, VaultError::InvalidKey { found: 9, .. }));
    }

    #[test]
    fn test_fresh_store_loads_empty() {
        let (_dir, paths) = test_paths();
        assert!(load_secret(&paths).is_empty());
        assert!(matches!(load_secret_state(&paths), SecretState::Empty));
        // loading without a record does not mint a key
        assert!(!paths.key_file.exists());
    }

    #[test]
    fn test_save_then_reload_from_disk() {
        let (dir, paths) = test_paths();
        save_secret(&paths, "sk-test-123").unwrap();

        // fresh paths value, as after a process restart
        let reopened = AppPaths::from_root(dir.path().to_path_buf());
        assert_eq!(load_secret(&reopened).as_str(), "sk-test-123");
    }

    #[test]
    fn test_record_format() {
        let (_dir, paths) = test_paths();
        save_secret(&paths, "sk-test-123").unwrap();
        let raw = fs::read_to_string(&paths.credential_file).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let encoded = value["encrypted_key"].as_str().unwrap();
        assert!(STANDARD.decode(encoded).is_ok());
        assert!(!raw.contains("sk-test-123"));
    }

    #[test]
    fn test_save_overwrites_previous_secret() {
        let (_dir, paths) = test_paths();
        save_secret(&paths, "sk-old").unwrap();
        save_secret(&paths, "sk-new").unwrap();
        assert_eq!(load_secret(&paths).as_str(), "sk-new");
    }

    #[test]
    fn test_corrupted_ciphertext_loads_empty() {
        let (_dir, paths) = test_paths();
        save_secret(&paths, "sk-test-123").unwrap();

        let raw = fs::read_to_string(&paths.credential_file).unwrap();
        let mut record: StoredCredential = serde_json::from_str(&raw).unwrap();
        let mut sealed = STANDARD.decode(&record.encrypted_key).unwrap();
        sealed[20] ^= 0xff;
        record.encrypted_key = STANDARD.encode(sealed);
        fs::write(&paths.credential_file, serde_json::to_vec(&record).unwrap()).unwrap();

        assert!(load_secret(&paths).is_empty());
        assert!(matches!(
            load_secret_state(&paths),
            SecretState::CorruptedStore(_)
        ));
    }

    #[test]
    fn test_garbage_record_loads_empty() {
        let (_dir, paths) = test_paths();
        fs::write(&paths.credential_file, b"{not json").unwrap();
        assert!(load_secret(&paths).is_empty());

        fs::write(&paths.credential_file, br#"{"encrypted_key":"%%%"}"#).unwrap();
        assert!(matches!(
            load_secret_state(&paths),
            SecretState::CorruptedStore(_)
        ));
    }

    #[test]
    fn test_replaced_key_loads_empty() {
        let (_dir, paths) = test_paths();
        save_secret(&paths, "sk-test-123").unwrap();
        fs::write(&paths.key_file, VaultKey::generate().as_bytes()).unwrap();
        assert!(load_secret(&paths).is_empty());
    }

    #[test]
    fn test_deleted_key_loads_empty() {
        let (_dir, paths) = test_paths();
        save_secret(&paths, "sk-test-123").unwrap();
        fs::remove_file(&paths.key_file).unwrap();
        match load_secret_state(&paths) {
            SecretState::CorruptedStore(reason) => assert!(reason.contains("key file missing")),
            other => panic!("unexpected state {:?}", other),
        }
        assert!(!paths.key_file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_creates_private_root() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::from_root(dir.path().join("fresh"));
        save_secret(&paths, "sk-test-123").unwrap();
        assert_eq!(app_fs::mode_of(&paths.root), Some(constants::ROOT_DIR_MODE));
        assert_eq!(load_secret(&paths).as_str(), "sk-test-123");
    }

    #[test]
    fn test_concurrent_first_key_creation_agrees() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::from_root(dir.path().join("fresh"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let paths = paths.clone();
                std::thread::spawn(move || get_or_create_key(&paths).unwrap())
            })
            .collect();
        let keys: Vec<VaultKey> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let on_disk = get_or_create_key(&paths).unwrap();
        assert!(keys.iter().all(|k| *k == on_disk));
    }

    #[test]
    fn test_existing_key_is_not_replaced_on_publish() {
        let (_dir, paths) = test_paths();
        let winner = VaultKey::generate();
        publish_key(&paths, &winner).unwrap();

        let loser = VaultKey::generate();
        let err = publish_key(&paths, &loser).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(get_or_create_key(&paths).unwrap(), winner);
    }

    #[test]
    fn test_clear_secret() {
        let (_dir, paths) = test_paths();
        assert!(!clear_secret(&paths).unwrap());
        save_secret(&paths, "sk-test-123").unwrap();
        assert!(clear_secret(&paths).unwrap());
        assert!(load_secret(&paths).is_empty());
        assert!(paths.key_file.exists());
    }

    #[test]
    fn test_oversized_secret_rejected() {
        let (_dir, paths) = test_paths();
        let huge = "k".repeat(constants::MAX_SECRET_SIZE + 1);
        assert!(matches!(
            save_secret(&paths, &huge),
            Err(VaultError::SecretTooLarge { .. })
        ));
        assert!(!paths.credential_file.exists());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let state = SecretState::Loaded(Zeroizing::new("sk-test-123".to_string()));
        assert!(!format!("{:?}", state).contains("sk-test"));
    }
}
