use std::ops::RangeInclusive;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString},
    Argon2,
};
use rand_core::OsRng;
use tracing::warn;

/// Hash families accepted for stored credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Argon2,
    /// Legacy `$2a$` / `$2b$` / `$2y$` hashes from earlier seed data.
    Bcrypt,
    Unsupported,
}

impl HashScheme {
    /// Configuration names: `argon2` (or `argon2id`) and `bcrypt`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Some(HashScheme::Argon2),
            "bcrypt" => Some(HashScheme::Bcrypt),
            _ => None,
        }
    }

    pub fn detect(stored_hash: &str) -> Self {
        if stored_hash.starts_with("$argon2") {
            HashScheme::Argon2
        } else if ["$2a$", "$2b$", "$2x$", "$2y$"]
            .iter()
            .any(|prefix| stored_hash.starts_with(prefix))
        {
            HashScheme::Bcrypt
        } else {
            HashScheme::Unsupported
        }
    }
}

/// Cost the legacy seed tooling used for bcrypt credentials.
pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

const DUMMY_PLAINTEXT: &str = "timing-equaliser";

/// One-way comparison of submitted plaintext against a stored hash.
///
/// Never errors and never logs the inputs: an unparseable hash simply does not match.
#[derive(Clone)]
pub struct PasswordVerifier {
    dummy_hash: String,
}

impl PasswordVerifier {
    /// Lookup misses burn a bcrypt comparison at [`DEFAULT_BCRYPT_COST`].
    pub fn new() -> Self {
        Self::with_dummy(HashScheme::Bcrypt, DEFAULT_BCRYPT_COST)
    }

    /// `scheme` and `bcrypt_cost` should match the bulk of the stored credentials so a
    /// lookup miss costs the same as a mismatch. `bcrypt_cost` is ignored for argon2.
    pub fn with_dummy(scheme: HashScheme, bcrypt_cost: u32) -> Self {
        let prepared = match scheme {
            HashScheme::Bcrypt => {
                bcrypt::hash(DUMMY_PLAINTEXT, bcrypt_cost).map_err(|err| err.to_string())
            }
            HashScheme::Argon2 | HashScheme::Unsupported => {
                hash_password(DUMMY_PLAINTEXT).map_err(|err| err.to_string())
            }
        };
        let dummy_hash = prepared.unwrap_or_else(|err| {
            warn!(error = %err, ?scheme, "failed to prepare dummy password hash");
            String::new()
        });
        Self { dummy_hash }
    }

    /// Scheme burned by [`PasswordVerifier::verify_dummy`].
    pub fn dummy_scheme(&self) -> HashScheme {
        HashScheme::detect(&self.dummy_hash)
    }

    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        match HashScheme::detect(stored_hash) {
            HashScheme::Argon2 => match PasswordHash::new(stored_hash) {
                Ok(parsed) => Argon2::default()
                    .verify_password(plaintext.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => false,
            },
            HashScheme::Bcrypt => bcrypt::verify(plaintext, stored_hash).unwrap_or(false),
            HashScheme::Unsupported => false,
        }
    }

    /// Burns one comparison so an unknown account costs about as much as a wrong password.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy_hash);
    }
}

impl Default for PasswordVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Argon2id PHC string for seeding and tests; operators provision hashes out of band.
pub fn hash_password(plaintext: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}
