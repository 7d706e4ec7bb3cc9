use serde::{Deserialize, Serialize};

/// On-disk record wrapping the encrypted API key.
///
/// `encrypted_key` is standard base64 of `nonce || ciphertext || tag`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCredential {
    pub encrypted_key: String,
}
