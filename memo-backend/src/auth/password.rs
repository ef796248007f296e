//! PBKDF2-HMAC-SHA256 password hashes.
//!
//! Hashes are stored as `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`,
//! the layout werkzeug uses, so the iteration count travels with each hash and
//! can be raised later without invalidating existing accounts. The salt string's
//! UTF-8 bytes are the PBKDF2 salt.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

const METHOD_PREFIX: &str = "pbkdf2:sha256:";
/// Random bytes per salt; hex encoding doubles this to the salt string length.
const SALT_BYTES: usize = 16;
const DIGEST_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let mut salt_bytes = [0u8; SALT_BYTES];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = hex::encode(salt_bytes);
        let digest = derive(password, &salt, self.iterations);
        format!("{}{}${}${}", METHOD_PREFIX, self.iterations, salt, hex::encode(digest))
    }

    /// Spend the same work as a real check, for lookups that found no user.
    pub fn burn(&self, password: &str) {
        let _ = derive(password, &"0".repeat(SALT_BYTES * 2), self.iterations);
    }
}

/// Check `candidate` against a stored hash. Malformed hashes never match.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let Some(parsed) = ParsedHash::parse(stored) else {
        log::warn!("Stored password hash has an unrecognised format");
        return false;
    };
    let Ok(expected) = hex::decode(parsed.digest_hex) else {
        return false;
    };
    if expected.len() != DIGEST_LEN {
        return false;
    }
    let actual = derive(candidate, parsed.salt, parsed.iterations);
    constant_time_eq(&actual, &expected)
}

struct ParsedHash<'a> {
    iterations: u32,
    salt: &'a str,
    digest_hex: &'a str,
}

impl<'a> ParsedHash<'a> {
    fn parse(stored: &'a str) -> Option<Self> {
        let mut parts = stored.splitn(3, '$');
        let method = parts.next()?;
        let salt = parts.next()?;
        let digest_hex = parts.next()?;
        let iterations = method.strip_prefix(METHOD_PREFIX)?.parse().ok()?;
        if iterations == 0 || salt.is_empty() {
            return None;
        }
        Some(Self {
            iterations,
            salt,
            digest_hex,
        })
    }
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut digest);
    digest
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
