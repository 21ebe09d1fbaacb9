//! Identity token handling
//!
//! The game server authenticates the socket with an OIDC id token passed as a
//! query parameter. The token's `preferred_username` claim doubles as the
//! display name the server uses to identify the local player.

use crate::error::ClientError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use serde::Deserialize;

/// Supplies the identity of the local player.
pub trait TokenProvider {
    fn identity_token(&self) -> Option<String>;
    fn display_name(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    pub preferred_username: Option<String>,
}

/// Token provider backed by a raw JWT handed to the client at startup.
#[derive(Debug, Clone)]
pub struct JwtTokenProvider {
    token: String,
    claims: Claims,
}

impl JwtTokenProvider {
    pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        Ok(Self { token, claims })
    }
}

impl TokenProvider for JwtTokenProvider {
    fn identity_token(&self) -> Option<String> {
        Some(self.token.clone())
    }

    fn display_name(&self) -> Option<String> {
        self.claims.preferred_username.clone()
    }
}

/// Decodes the payload segment of a JWT without verifying its signature.
/// Verification is the server's job; the client only reads its own name.
pub fn decode_claims(token: &str) -> Result<Claims, ClientError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ClientError::Token("missing payload segment".to_string()))?;

    // Some issuers pad their segments even though JWT forbids it
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::Token(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ClientError::Token(e.to_string()))
}

/// Resolved token and display name for one game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub token: String,
    pub player_name: String,
}

impl Identity {
    /// An explicit name wins over the token's claim; with neither the player
    /// gets a random guest name.
    pub fn resolve(provider: Option<&dyn TokenProvider>, name_override: Option<String>) -> Self {
        let token = provider
            .and_then(|p| p.identity_token())
            .unwrap_or_default();
        let player_name = name_override
            .or_else(|| provider.and_then(|p| p.display_name()))
            .unwrap_or_else(random_player_name);

        Self { token, player_name }
    }
}

pub fn random_player_name() -> String {
    format!("player{}", rand::thread_rng().gen_range(0..1000))
}
