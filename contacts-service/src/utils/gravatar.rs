//! Gravatar URL derivation for default avatars.

use sha2::{Digest, Sha256};

/// Build the Gravatar URL for an email address. The address is trimmed
/// and lowercased before hashing, as Gravatar expects; `d=mm` falls back
/// to the "mystery man" image for unknown addresses.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!(
        "https://gravatar.com/avatar/{}?s=200&r=pg&d=mm",
        hex::encode(digest)
    )
}
