use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Represents the claims encoded within a token: exactly who and until when.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Identifier of the authenticated user.
    pub sub: i32,
    /// Expiration instant (seconds since epoch). The token is rejected at or after it.
    pub exp: i64,
}

/// Why a token could not be issued or verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signing failed while issuing.
    Signing(String),
    /// Bad signature or malformed claim set.
    Invalid(String),
    /// The expiration instant has been reached.
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Signing(msg) => write!(f, "Failed to sign token: {}", msg),
            TokenError::Invalid(msg) => write!(f, "Invalid token: {}", msg),
            TokenError::Expired => write!(f, "Invalid token: expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issues and verifies signed, expiring HS256 identity tokens.
///
/// Verification is a pure computation over the token and a clock reading; it
/// never touches storage and does not check that the user still exists.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issues a token for `user_id` expiring one TTL from now.
    pub fn issue(&self, user_id: i32) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues a token as if the current instant were `now`.
    pub fn issue_at(&self, user_id: i32, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies `token` against the current time and returns the embedded user id.
    pub fn verify(&self, token: &str) -> Result<i32, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` as if the current instant were `now`.
    ///
    /// The expiration check is done here rather than by `jsonwebtoken` so it
    /// has no leeway: a token is dead at its `exp` second.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<i32, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims.sub)
    }
}
