//! Argon2id password hashing.
//!
//! Both operations are CPU bound and run on the blocking pool.

use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use tokio::task;

use crate::config::SecurityConfig;

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| anyhow::anyhow!("Failed to encode salt: {e}"))?;

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Checks `password` against a PHC string. The parameters embedded in the
/// hash are used, so hashes made under older settings keep verifying.
pub fn verify_password_blocking(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password_blocking(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    task::spawn_blocking(move || verify_password_blocking(&password, &password_hash))
        .await
        .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password_blocking("hunter22", &cheap()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password_blocking("hunter22", &hash).unwrap());
        assert!(!verify_password_blocking("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_each_hash_gets_a_fresh_salt() {
        let first = hash_password_blocking("hunter22", &cheap()).unwrap();
        let second = hash_password_blocking("hunter22", &cheap()).unwrap();
        assert_ne!(first, second);
        assert!(verify_password_blocking("hunter22", &second).unwrap());
    }

    #[test]
    fn test_rejects_malformed_hash() {
        assert!(verify_password_blocking("x", "not-a-hash").is_err());
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let hash = hash_password("secret1", &cheap()).await.unwrap();
        assert!(verify_password("secret1", &hash).await.unwrap());
    }
}
