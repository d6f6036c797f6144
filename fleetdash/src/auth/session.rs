//! Access token verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use std::time::Duration;

use crate::{config::Config, errors::Error, types::UserId};

/// Token type accepted for API calls
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Claims carried by an access token
#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Record store id of the user; issuers encode it as a number or a numeric string
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub user_id: UserId,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl AccessClaims {
    pub fn new(user_id: UserId, ttl: Duration) -> Self {
        let now = Utc::now();
        let exp = now + ttl;
        Self {
            user_id,
            exp: exp.timestamp(),
            iat: Some(now.timestamp()),
            token_type: Some(ACCESS_TOKEN_TYPE.to_string()),
        }
    }
}

fn secret_key(config: &Config) -> Result<&str, Error> {
    config.secret_key.as_deref().ok_or_else(|| Error::Internal {
        operation: "verify bearer token: secret_key is required".to_string(),
    })
}

/// Sign an access token for a user
pub fn create_access_token(user_id: UserId, ttl: Duration, config: &Config) -> Result<String, Error> {
    let key = EncodingKey::from_secret(secret_key(config)?.as_bytes());
    encode(&Header::default(), &AccessClaims::new(user_id, ttl), &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify an access token and return the user id it was issued for
pub fn verify_access_token(token: &str, config: &Config) -> Result<UserId, Error> {
    let key = DecodingKey::from_secret(secret_key(config)?.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = config.auth.jwt.leeway.as_secs();

    let token_data = decode::<AccessClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::Json(_)
        | jsonwebtoken::errors::ErrorKind::Utf8(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        // Server errors (500) - key issues, internal failures
        jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_)
        | jsonwebtoken::errors::ErrorKind::RsaFailedSigning
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName
        | jsonwebtoken::errors::ErrorKind::InvalidKeyFormat
        | jsonwebtoken::errors::ErrorKind::MissingAlgorithm
        | jsonwebtoken::errors::ErrorKind::Crypto(_) => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },

        _ => Error::Unauthenticated { message: None },
    })?;

    match token_data.claims.token_type.as_deref() {
        None | Some(ACCESS_TOKEN_TYPE) => Ok(token_data.claims.user_id),
        Some(_) => Err(Error::Unauthenticated {
            message: Some("Token is not an access token".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            secret_key: Some("test-secret-key-for-jwt".to_string()),
            ..Default::default()
        }
    }

    fn sign(claims: &serde_json::Value, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_create_and_verify_access_token() {
        let config = create_test_config();
        let token = create_access_token(42, Duration::from_secs(300), &config).unwrap();
        assert_eq!(verify_access_token(&token, &config).unwrap(), 42);
    }

    #[test]
    fn test_verify_invalid_token() {
        let config = create_test_config();
        let result = verify_access_token("invalid.token.here", &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let mut config = create_test_config();
        let token = create_access_token(42, Duration::from_secs(300), &config).unwrap();

        config.secret_key = Some("different-secret".to_string());
        let result = verify_access_token(&token, &config);
        // Should be Unauthenticated (InvalidSignature), not Internal error
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_verify_expired_token() {
        let config = create_test_config();
        let exp = (Utc::now() - chrono::Duration::hours(1)).timestamp();
        let token = sign(&serde_json::json!({"user_id": 42, "exp": exp}), "test-secret-key-for-jwt");

        let result = verify_access_token(&token, &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_expiry_within_leeway_is_accepted() {
        let config = create_test_config();
        let exp = (Utc::now() - chrono::Duration::seconds(10)).timestamp();
        let token = sign(&serde_json::json!({"user_id": 42, "exp": exp}), "test-secret-key-for-jwt");

        assert_eq!(verify_access_token(&token, &config).unwrap(), 42);
    }

    #[test]
    fn test_refresh_token_is_rejected() {
        let config = create_test_config();
        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        let token = sign(
            &serde_json::json!({"user_id": 42, "exp": exp, "token_type": "refresh"}),
            "test-secret-key-for-jwt",
        );

        let err = verify_access_token(&token, &config).unwrap_err();
        assert_eq!(err.user_message(), "Token is not an access token");
    }

    #[test]
    fn test_string_user_id_is_accepted() {
        let config = create_test_config();
        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        let token = sign(&serde_json::json!({"user_id": "17", "exp": exp}), "test-secret-key-for-jwt");

        assert_eq!(verify_access_token(&token, &config).unwrap(), 17);
    }

    #[test]
    fn test_missing_secret_is_internal_error() {
        let config = Config::default();
        let result = verify_access_token("a.b.c", &config);
        assert!(matches!(result.unwrap_err(), Error::Internal { .. }));
    }
}
