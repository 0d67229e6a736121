//! Bearer-token issuing and verification.
//!
//! Tokens are HS256 JWTs carrying the admin ID. The secret comes from
//! configuration and the lifetime defaults to 7 days.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use ambre_core::AdminId;

/// Claims carried by an admin bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin account ID.
    pub sub: i32,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Issues and verifies admin bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret and lifetime in days.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_days: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation: Validation::new(Algorithm::HS256),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Issue a signed token for an admin.
    ///
    /// # Errors
    ///
    /// Returns the underlying `jsonwebtoken` error if encoding fails.
    pub fn issue(&self, admin_id: AdminId) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin_id.as_i32(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify signature and expiry, resolving the admin ID.
    ///
    /// # Errors
    ///
    /// Returns the underlying `jsonwebtoken` error for a missing, malformed,
    /// tampered, or expired token.
    pub fn verify(&self, token: &str) -> Result<AdminId, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(AdminId::new(data.claims.sub))
    }
}
