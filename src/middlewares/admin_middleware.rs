use std::sync::Arc;

use axum::{body::Body, extract::State, http::{header, Request}, middleware::Next, response::Response};
use tracing::warn;

use crate::config::AdminAuthConfig;
use crate::util::error::{HandlerError, HandlerErrorKind};

pub struct AdminAuthState {
    pub token: String,
}

impl AdminAuthState {
    pub fn new(config: &AdminAuthConfig) -> Self {
        AdminAuthState { token: config.api_token.clone() }
    }
}

/// Byte comparison that does not stop at the first mismatch.
fn token_matches(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

pub async fn admin_auth(
    State(state): State<Arc<AdminAuthState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        return Err(HandlerError::new(
            HandlerErrorKind::Unauthorized,
            "Missing or malformed Authorization header",
        ));
    };

    if !token_matches(token, &state.token) {
        warn!(path = %req.uri().path(), "Rejected admin request with wrong token");
        return Err(HandlerError::new(HandlerErrorKind::Forbidden, "Invalid admin token"));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_comparison() {
        assert!(token_matches("abc", "abc"));
        assert!(!token_matches("abd", "abc"));
        assert!(!token_matches("ab", "abc"));
    }
}
