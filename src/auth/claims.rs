use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::AccessToken;

/// Claims carried by an access token. Only read for local bookkeeping
/// (cookie lifetime, logging); validity is decided by the auth API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// Read the payload without verifying the signature
    pub fn peek(token: &AccessToken) -> Option<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(token.as_str(), &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .ok()
    }

    /// Seconds until expiry, if the token has an expiry still in the future
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.exp
            .map(|exp| exp - now.timestamp())
            .filter(|remaining| *remaining > 0)
    }
}
