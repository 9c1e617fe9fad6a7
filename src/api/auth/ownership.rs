//! Ownership gate for `/todos/{todo_id}`.

use axum::{
    extract::{Extension, Path, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::principal::{OwnedTodo, Principal};
use crate::api::{error::ApiError, AppState};

/// Load the addressed todo and require the caller to own it.
///
/// Runs after [`super::authenticate`]. A non-numeric id is `400`, a missing todo
/// `404`, somebody else's todo `403`. On success the loaded todo is bound as
/// [`OwnedTodo`].
///
/// # Errors
/// Returns the rejection as an [`ApiError`] response.
pub async fn require_owner(
    Extension(state): Extension<Arc<AppState>>,
    principal: Principal,
    Path(todo_id): Path<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let todo_id: i64 = todo_id.parse().map_err(|_| {
        debug!(todo_id = %todo_id, "non-numeric todo id");
        ApiError::bad_request("invalid todo id")
    })?;

    let todo = state
        .todos
        .fetch_by_id(todo_id)
        .await?
        .ok_or_else(|| ApiError::not_found("todo not found"))?;

    if todo.user_id != principal.id {
        warn!(
            todo_id,
            owner_id = todo.user_id,
            user_id = principal.id,
            "todo access denied"
        );
        return Err(ApiError::forbidden(
            "you're not authorized to access this todo",
        ));
    }

    request.extensions_mut().insert(OwnedTodo(todo));

    Ok(next.run(request).await)
}
