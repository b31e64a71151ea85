//! Bearer token authentication for the OutageMap API
//!
//! Tokens are issued by an external identity provider that shares the JWT
//! secret. A request without a token is anonymous; a request with an
//! invalid token is rejected.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use outagemap::models::Identity;
use serde::{Deserialize, Serialize};

use crate::{error::ServerError, state::AppState};

/// Header carrying an anonymous client's stable device id
pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at timestamp
    pub iat: usize,
    /// Expiration timestamp
    pub exp: usize,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            id: claims.sub,
            display_name: claims.name,
            email: claims.email,
        }
    }
}

/// Authenticated caller, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
}

/// Authentication middleware. Attaches an [`AuthContext`] when a valid
/// bearer token is present.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if let Some(bearer) = headers.typed_get::<Authorization<Bearer>>() {
        let identity = validate_jwt_token(bearer.token(), &state.config.jwt_secret)?;
        tracing::debug!(user = %identity.id, "Authenticated request");
        request.extensions_mut().insert(AuthContext { identity });
    }

    Ok(next.run(request).await)
}

/// Validate a JWT token and return the caller's identity
pub fn validate_jwt_token(token: &str, secret: &str) -> Result<Identity, ServerError> {
    let decoding_key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| ServerError::Auth(format!("Invalid token: {}", e)))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(ServerError::Auth("Token has no subject".to_string()));
    }

    Ok(token_data.claims.into())
}

/// Generate a JWT token for an identity
pub fn generate_jwt_token(
    identity: &Identity,
    secret: &str,
    expiration_hours: u64,
) -> Result<(String, i64), ServerError> {
    let now = chrono::Utc::now().timestamp() as usize;
    let exp = now + (expiration_hours * 3600) as usize;

    let claims = Claims {
        sub: identity.id.clone(),
        name: identity.display_name.clone(),
        email: identity.email.clone(),
        iat: now,
        exp,
    };

    let encoding_key = EncodingKey::from_secret(secret.as_ref());
    let token = encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| ServerError::Auth(format!("Failed to generate token: {}", e)))?;

    Ok((token, exp as i64))
}

/// The caller's identity, if signed in
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeIdentity {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(
            parts
                .extensions
                .get::<AuthContext>()
                .map(|ctx| ctx.identity.clone()),
        ))
    }
}

/// A signed-in caller; anonymous requests are rejected with 401
#[derive(Debug, Clone)]
pub struct SignedIn(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for SignedIn {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .map(|ctx| SignedIn(ctx.identity.clone()))
            .ok_or_else(|| ServerError::Auth("Sign in to create reports".to_string()))
    }
}

/// The anonymous device id header, if sent
#[derive(Debug, Clone)]
pub struct DeviceId(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for DeviceId {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let device_id = parts
            .headers
            .get(DEVICE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(DeviceId(device_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let identity = Identity::new("user-1")
            .with_display_name("Ana")
            .with_email("ana@example.com");
        let (token, expires_at) = generate_jwt_token(&identity, "secret", 1).unwrap();
        assert!(expires_at > chrono::Utc::now().timestamp());

        let decoded = validate_jwt_token(&token, "secret").unwrap();
        assert_eq!(decoded, identity);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let (token, _) = generate_jwt_token(&Identity::new("user-1"), "secret", 1).unwrap();
        let err = validate_jwt_token(&token, "other").unwrap_err();
        assert!(matches!(err, ServerError::Auth(_)));
    }
}
