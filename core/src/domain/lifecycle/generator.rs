//! Secret generation from the operating system CSPRNG

use rand::{rngs::OsRng, Rng, RngCore};

use super::hashing::hash_secret;

/// Random bytes behind email and invitation tokens
const TOKEN_BYTES: usize = 32;

/// A freshly generated secret and its digest
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedSecret {
    pub plaintext: String,
    pub hash: String,
}

impl GeneratedSecret {
    fn from_plaintext(plaintext: String) -> Self {
        let hash = hash_secret(&plaintext);
        Self { plaintext, hash }
    }
}

impl std::fmt::Debug for GeneratedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedSecret")
            .field("plaintext", &"<redacted>")
            .field("hash", &self.hash)
            .finish()
    }
}

fn random_hex_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// 64 hex characters, sent as a link
pub fn generate_email_token() -> GeneratedSecret {
    GeneratedSecret::from_plaintext(random_hex_token())
}

/// 64 hex characters, embedded in the registration link
pub fn generate_invitation_token() -> GeneratedSecret {
    GeneratedSecret::from_plaintext(random_hex_token())
}

/// Six decimal digits without a leading zero
pub fn generate_phone_code() -> GeneratedSecret {
    let code: u32 = OsRng.gen_range(100_000..=999_999);
    GeneratedSecret::from_plaintext(code.to_string())
}
