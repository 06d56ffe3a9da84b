//! Middleware for authentication and other cross-cutting concerns

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::GatewayError;
use crate::state::GatewayState;

/// Name of the cookie the SPA authenticates with
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authentication middleware that validates the request's JWT.
///
/// The token is taken from the `Authorization: Bearer` header, the
/// `access_token` cookie, or a `token` query parameter (WebSocket
/// handshakes), in that order. The decoded identity is attached to the
/// request extensions for the handlers' `Extension` extractor.
pub async fn auth_middleware(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let token = bearer_token(request.headers())
        .or_else(|| cookie_token(request.headers()))
        .or_else(|| query_token(request.uri().query().unwrap_or("")));

    let token = token.ok_or_else(|| {
        GatewayError::AuthenticationFailed("Missing authentication token".to_string())
    })?;

    let user = state
        .authenticator
        .verify_token(&token)
        .map_err(|e| GatewayError::AuthenticationFailed(format!("Invalid token: {}", e)))?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extract a bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let mut parts = header.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("Bearer") => {
                    Some(token.to_string())
                }
                _ => None,
            }
        })
        .filter(|token| !token.is_empty())
}

/// Extract the access token from the Cookie header
pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|header| header.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                if name == ACCESS_TOKEN_COOKIE && !value.is_empty() {
                    Some(value.to_string())
                } else {
                    None
                }
            })
        })
}

/// Extract a token from a query string (used by WebSocket handshakes)
pub fn query_token(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name == "token" && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Logging middleware for request/response logging
pub async fn logging_middleware(
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "request completed"
    );

    Ok(response)
}
