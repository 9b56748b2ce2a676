use base64::{Engine as _, engine::general_purpose};
use rand::prelude::RngExt;
use rand::rng;

/// Generates an opaque API token with 256 bits of entropy.
///
/// The token is 32 random bytes encoded as base64url without padding (43 characters), which
/// is safe to place in an `Authorization` header without escaping.
pub fn generate_token() -> String {
    let mut key_bytes = [0u8; 32];
    rng().fill(&mut key_bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(key_bytes)
}
