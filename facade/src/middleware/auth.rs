use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Check an `Authorization` header value against the shared dashboard token.
///
/// An empty token admits nobody. Otherwise the header must be exactly
/// `Bearer <token>`; both sides are reduced to HMAC tags keyed by the token
/// and compared in constant time.
pub fn verify_bearer(token: &str, header: Option<&str>) -> bool {
    if token.is_empty() {
        return false;
    }
    let Some(header) = header else {
        return false;
    };

    let expected = format!("Bearer {token}");
    let Ok(mut mac) = HmacSha256::new_from_slice(token.as_bytes()) else {
        return false;
    };
    mac.update(expected.as_bytes());
    let expected_tag = mac.finalize().into_bytes();

    let Ok(mut mac) = HmacSha256::new_from_slice(token.as_bytes()) else {
        return false;
    };
    mac.update(header.as_bytes());
    mac.verify_slice(&expected_tag).is_ok()
}

/// Middleware for every gated route: rejects with 401 before the handler runs.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if !verify_bearer(&state.auth_token, header) {
        warn!(
            "Rejected unauthorized {} {}",
            request.method(),
            request.uri().path()
        );
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}
