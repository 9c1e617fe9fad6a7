//! HS256 bearer tokens.
//!
//! Tokens are compact JWS strings: `base64url(header).base64url(claims).base64url(mac)`
//! with an HMAC-SHA256 over the first two segments. The signing secret is loaded
//! once at startup and shared read-only by every request.
//!
//! [`TokenCodec::validate`] reports why a token was rejected through
//! [`TokenError`] for logging, but every variant converts into the same
//! `401 invalid token` at the wire.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::SystemTime;
use thiserror::Error;

use crate::api::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HS256";
pub const TOKEN_TYPE: &str = "JWT";
/// Default token lifetime: one day.
pub const DEFAULT_TTL_SECONDS: i64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}

/// Signed claims. Every field is required and strictly typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub email: String,
}

impl From<&Claims> for Subject {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format")]
    Format,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid signing key")]
    Key,
}

impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        Self::unauthenticated("invalid token")
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Issues and validates tokens with the process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: SecretString,
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: SecretString, ttl_seconds: i64) -> Self {
        Self {
            secret,
            ttl_seconds,
        }
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::Key)
    }

    /// Issue a token for `subject`, valid from now for the configured TTL.
    ///
    /// # Errors
    /// Returns an error if the header or claims cannot be encoded.
    pub fn issue(&self, subject: &Subject) -> Result<String, TokenError> {
        self.issue_at(subject, now_unix_seconds())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns an error if the header or claims cannot be encoded.
    pub fn issue_at(&self, subject: &Subject, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            id: subject.id,
            email: subject.email.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };
        let header_b64 = b64e_json(&TokenHeader::hs256())?;
        let claims_b64 = b64e_json(&claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_b64 = Base64UrlUnpadded::encode_string(&signature);

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify signature and claims, returning the decoded claims.
    ///
    /// # Errors
    /// Returns an error if the token is malformed, not HS256, forged, has
    /// missing or mistyped claims, or is expired.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, now_unix_seconds())
    }

    /// Validate as if the current time were `now`.
    ///
    /// # Errors
    /// See [`TokenCodec::validate`].
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(TokenError::Format)?;
        let claims_b64 = parts.next().ok_or(TokenError::Format)?;
        let sig_b64 = parts.next().ok_or(TokenError::Format)?;
        if parts.next().is_some() {
            return Err(TokenError::Format);
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlg(header.alg));
        }

        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| TokenError::Base64)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        // Constant-time comparison.
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: Claims = b64d_json(claims_b64)?;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Extract the token from an `Authorization` header value.
///
/// Only the exact shape `Bearer <token>` is accepted: one space, two parts, the
/// literal `Bearer` scheme and a non-empty token.
///
/// # Errors
/// Returns `TokenError::Format` for anything else.
pub fn bearer_token(header: &str) -> Result<&str, TokenError> {
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        _ => Err(TokenError::Format),
    }
}
