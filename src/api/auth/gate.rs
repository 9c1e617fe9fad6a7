//! Authentication gate.

use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use super::{resolver, token};
use crate::api::{error::ApiError, AppState};

/// Require `Authorization: Bearer <token>` and bind the resolved [`super::Principal`].
///
/// Every codec failure is `401 invalid token`; a token whose user no longer
/// resolves is `401 invalid user`. The inner service is not called on rejection.
///
/// # Errors
/// Returns the rejection as an [`ApiError`] response.
pub async fn authenticate(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        debug!("missing or non-ascii authorization header");
        return Err(ApiError::unauthenticated("invalid token"));
    };

    let claims = token::bearer_token(header)
        .and_then(|raw| state.tokens.validate(raw))
        .map_err(|err| {
            debug!(reason = %err, "rejected bearer token");
            ApiError::from(err)
        })?;

    let principal = resolver::resolve(state.users.as_ref(), &claims).await?;
    debug!(user_id = principal.id, "authenticated");

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
