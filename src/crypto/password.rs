//! Salted password hashing with PBKDF2-HMAC-SHA256.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt_b64>$<hash_b64>`.
//! Verification is constant-time over the derived hash.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 32;

const SCHEME: &str = "pbkdf2-sha256";

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = generate_salt();
    let hash = derive(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "{SCHEME}${PBKDF2_ITERATIONS}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash),
    )
}

/// Verify a password against a stored hash string.
///
/// Malformed stored strings verify `false` rather than erroring; a
/// credential row that cannot be parsed must never authenticate anyone.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((iterations, salt, expected)) = parse_stored(stored) else {
        return false;
    };
    let actual = derive(password, &salt, iterations);
    actual.ct_eq(&expected).into()
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    hash
}

fn parse_stored(stored: &str) -> Option<(u32, Vec<u8>, [u8; HASH_LENGTH])> {
    let mut parts = stored.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let iterations: u32 = parts.next()?.parse().ok()?;
    let salt = STANDARD_NO_PAD.decode(parts.next()?).ok()?;
    let hash = STANDARD_NO_PAD.decode(parts.next()?).ok()?;
    if parts.next().is_some() {
        return None;
    }
    let hash: [u8; HASH_LENGTH] = hash.try_into().ok()?;
    Some((iterations, salt, hash))
}

/// Generate a cryptographically random salt.
fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
