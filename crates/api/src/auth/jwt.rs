//! HS256 access tokens and opaque refresh tokens.
//!
//! Refresh tokens are random UUID strings handed to the client once. The
//! database only ever sees their SHA-256 hex digest.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use storefront_core::types::DbId;
use uuid::Uuid;

/// Payload of an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: DbId,
    /// Role at issue time. Admin checks re-read the role from the database.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    fn issue(user_id: DbId, role: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: role.to_owned(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (default 15)
    /// and `JWT_REFRESH_EXPIRY_DAYS` (default 30).
    ///
    /// # Panics
    ///
    /// Panics if the secret is missing or empty, or a lifetime is not a number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            access_token_expiry_mins: lifetime_from_env("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: lifetime_from_env("JWT_REFRESH_EXPIRY_DAYS", 30),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_expiry_mins)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_expiry_days)
    }

    fn validation() -> Validation {
        Validation::new(Algorithm::HS256)
    }
}

fn lifetime_from_env(var: &str, default: i64) -> i64 {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{var} must be a whole number, got '{raw}'")),
        Err(_) => default,
    }
}

/// Everything a successful sign-in hands out.
#[derive(Debug)]
pub struct IssuedTokens {
    pub access_token: String,
    /// Access token lifetime in seconds, as reported to the client.
    pub expires_in: i64,
    pub refresh_token: String,
    pub refresh_token_hash: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Sign an access token and mint a fresh refresh token for `user_id`.
pub fn issue_tokens(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<IssuedTokens, jsonwebtoken::errors::Error> {
    let access_token = generate_access_token(user_id, role, config)?;
    let (refresh_token, refresh_token_hash) = generate_refresh_token();

    Ok(IssuedTokens {
        access_token,
        expires_in: config.access_ttl().num_seconds(),
        refresh_token,
        refresh_token_hash,
        refresh_expires_at: Utc::now() + config.refresh_ttl(),
    })
}

pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::issue(user_id, role, config.access_ttl());
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry and return the [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}

/// Returns `(plaintext, sha256_hex)`.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "storefront-test-secret-with-enough-bytes".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        }
    }

    #[test]
    fn access_token_round_trip() {
        let config = config();
        let token = generate_access_token(7, "customer", &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "customer");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = config();
        // Well past the default 60s leeway.
        let claims = Claims::issue(1, "customer", Duration::minutes(-5));
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_access_token(1, "admin", &config()).unwrap();
        let other = JwtConfig {
            secret: "a-completely-different-secret".to_string(),
            ..config()
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn issued_pair_matches_configured_lifetimes() {
        let before = Utc::now();
        let issued = issue_tokens(3, "customer", &config()).unwrap();

        assert_eq!(issued.expires_in, 900);
        assert_eq!(hash_refresh_token(&issued.refresh_token), issued.refresh_token_hash);
        assert!(issued.refresh_expires_at >= before + Duration::days(30));
        assert_eq!(validate_token(&issued.access_token, &config()).unwrap().sub, 3);
    }

    #[test]
    fn refresh_tokens_hash_stably_and_differ() {
        let (a, hash_a) = generate_refresh_token();
        let (b, hash_b) = generate_refresh_token();

        assert_eq!(hash_refresh_token(&a), hash_a);
        assert_eq!(hash_a.len(), 64);
        assert_ne!(a, b);
        assert_ne!(hash_a, hash_b);
    }
}
