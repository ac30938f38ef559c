use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::config::JwtConfig;
use crate::models::Principal;
use service_core::error::AppError;

/// Verifies platform-issued bearer tokens.
///
/// Token issuance stays with the identity platform; this service only holds
/// the realm public key and validates RS256 signatures.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
}

/// Claims this service reads from an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Username as presented by the platform
    #[serde(default)]
    pub preferred_username: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl AccessClaims {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub.clone(),
            username: self
                .preferred_username
                .clone()
                .unwrap_or_else(|| self.sub.clone()),
        }
    }
}

impl JwtVerifier {
    /// Create a verifier by loading the platform public key from a file.
    pub fn new(config: &JwtConfig) -> Result<Self, AppError> {
        let public_key_pem = fs::read_to_string(&config.public_key_path).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read public key from {}: {}",
                config.public_key_path,
                e
            ))
        })?;

        let verifier = Self::from_pem(public_key_pem.as_bytes())?;
        tracing::info!("JWT verifier initialized with RS256 public key");
        Ok(verifier)
    }

    pub fn from_pem(public_key_pem: &[u8]) -> Result<Self, AppError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to parse public key: {}", e)))?;

        Ok(Self { decoding_key })
    }

    /// Validate a bearer token and return its claims.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, AppError> {
        let validation = Validation::new(Algorithm::RS256);
        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
