use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hex-encoded random salt for a new account.
pub fn generate_salt() -> Box<str> {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes).into_boxed_str()
}

/// Hex digest of `salt || password`.
pub fn hash_password(password: &str, salt: &str) -> Box<str> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize()).into_boxed_str()
}

/// Compare a candidate password against a stored digest in constant time.
#[must_use]
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let candidate = hash_password(password, salt);
    candidate.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::{generate_salt, hash_password, verify_password};

    #[test]
    fn hashing_is_deterministic_per_salt() {
        let salt = generate_salt();
        assert_eq!(hash_password("hunter2", &salt), hash_password("hunter2", &salt));

        let other_salt = generate_salt();
        assert_ne!(salt, other_salt);
        assert_ne!(hash_password("hunter2", &salt), hash_password("hunter2", &other_salt));
    }

    #[test]
    fn verify_accepts_only_the_right_password() {
        let salt = generate_salt();
        let stored = hash_password("hunter2", &salt);

        assert!(verify_password("hunter2", &salt, &stored));
        assert!(!verify_password("hunter3", &salt, &stored));
        assert!(!verify_password("", &salt, &stored));
    }

    #[test]
    fn salts_are_hex_encoded_16_bytes() {
        let salt = generate_salt();
        assert_eq!(salt.len(), 32);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
