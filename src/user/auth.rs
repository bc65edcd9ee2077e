use anyhow::{anyhow, Result};
use rand::Rng;
use rand_distr::Alphanumeric;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of freshly generated application-password secrets.
const SECRET_LENGTH: usize = 24;

pub type TokenDigest = [u8; 32];

/// Sha256 digest of a presented credential, used for the opaque-token
/// lookup path.
pub fn token_digest(raw: &str) -> TokenDigest {
    Sha256::digest(raw.as_bytes()).into()
}

/// Generate a new application-password secret.
pub fn generate_secret() -> String {
    let rng = rand::rng();
    rng.sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}

mod gateway_argon2 {
    use super::*;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
    use argon2::Argon2;

    pub fn hash(secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| anyhow!("failed to hash secret: {}", e))?;
        Ok(hash.to_string())
    }

    pub fn verify(secret: &str, phc: &str) -> bool {
        match PasswordHash::new(phc) {
            Ok(parsed) => Argon2::default()
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// A named application password. The secret itself is never stored; we keep
/// an argon2 hash for login/password validation and a sha256 digest for the
/// opaque-token path.
#[derive(Debug, Clone)]
pub struct ApplicationPassword {
    pub name: String,
    hash: String,
    digest: TokenDigest,
}

impl ApplicationPassword {
    pub fn new(name: impl Into<String>, secret: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            hash: gateway_argon2::hash(secret)?,
            digest: token_digest(secret),
        })
    }

    pub fn verify(&self, secret: &str) -> bool {
        gateway_argon2::verify(secret, &self.hash)
    }

    /// Constant-time digest comparison for opaque-token candidates.
    pub fn matches_digest(&self, candidate: &TokenDigest) -> bool {
        bool::from(self.digest.ct_eq(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_the_original_secret_only() {
        let password = ApplicationPassword::new("cli", "s3cret-value").unwrap();
        assert!(password.verify("s3cret-value"));
        assert!(!password.verify("s3cret-valuE"));
        assert!(!password.verify(""));
    }

    #[test]
    fn digest_matches_the_same_secret() {
        let password = ApplicationPassword::new("cli", "token-abc").unwrap();
        assert!(password.matches_digest(&token_digest("token-abc")));
        assert!(!password.matches_digest(&token_digest("token-abd")));
    }

    #[test]
    fn generated_secrets_are_alphanumeric_and_distinct() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), SECRET_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_phc_string_never_verifies() {
        assert!(!gateway_argon2::verify("anything", "not-a-phc-string"));
    }
}
