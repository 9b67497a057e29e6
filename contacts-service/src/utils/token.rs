//! Random verification tokens.

use rand::distributions::Alphanumeric;
use rand::Rng;

pub const VERIFICATION_TOKEN_LEN: usize = 24;

/// URL-safe alphanumeric token used in verification links.
pub fn generate_verification_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}
