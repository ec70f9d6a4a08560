//! Federated identity: verification of Google-issued ID tokens.
//!
//! The production verifier fetches Google's current JWK set, picks the key
//! named by the token's `kid`, and checks signature, audience, issuer and
//! expiry with `jsonwebtoken`.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

use super::errors::AuthError;

pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Identity asserted by a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    /// Any failure (bad signature, wrong audience, expired, unreachable key
    /// endpoint) is a [`AuthError::TokenError`].
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    name: Option<String>,
}

pub struct GoogleIdTokenVerifier {
    client_id: String,
    certs_url: String,
    http: reqwest::Client,
}

impl GoogleIdTokenVerifier {
    pub fn new(client_id: impl Into<String>, certs_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self { client_id: client_id.into(), certs_url: certs_url.into(), http }
    }

    async fn fetch_keys(&self) -> Result<JwkSet, AuthError> {
        self.http
            .get(&self.certs_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::TokenError(format!("fetch signing keys: {e}")))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::TokenError(format!("parse signing keys: {e}")))
    }
}

#[async_trait]
impl IdTokenVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError> {
        if self.client_id.is_empty() {
            return Err(AuthError::TokenError("google client id not configured".into()));
        }
        let header = decode_header(id_token).map_err(|e| AuthError::TokenError(e.to_string()))?;
        let kid = header.kid.ok_or_else(|| AuthError::TokenError("token header has no kid".into()))?;

        let keys = self.fetch_keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| AuthError::TokenError(format!("unknown signing key {kid}")))?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| AuthError::TokenError(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.validate_exp = true;

        let data = decode::<GoogleClaims>(id_token, &key, &validation)
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        let email = data
            .claims
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| AuthError::TokenError("token carries no email".into()))?;
        // accounts are linked by email, so an unverified address is not an identity
        if data.claims.email_verified == Some(false) {
            return Err(AuthError::TokenError("token email is not verified".into()));
        }
        debug!(%kid, "google id token verified");
        Ok(VerifiedIdentity { email, name: data.claims.name })
    }
}

/// Fixed token table for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default, Clone)]
    pub struct StaticIdTokenVerifier {
        tokens: HashMap<String, VerifiedIdentity>,
    }

    impl StaticIdTokenVerifier {
        pub fn with_token(mut self, token: &str, email: &str, name: Option<&str>) -> Self {
            self.tokens.insert(
                token.to_string(),
                VerifiedIdentity { email: email.to_string(), name: name.map(str::to_string) },
            );
            self
        }
    }

    #[async_trait]
    impl IdTokenVerifier for StaticIdTokenVerifier {
        async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError> {
            self.tokens
                .get(id_token)
                .cloned()
                .ok_or_else(|| AuthError::TokenError("invalid token".into()))
        }
    }
}
