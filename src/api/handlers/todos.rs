use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::{json_body, required};
use crate::api::{
    auth::{OwnedTodo, Principal},
    error::{respond, ApiError},
    store::{Todo, TodoChanges},
    AppState,
};

#[derive(ToSchema, Deserialize)]
pub struct AddTodoRequest {
    /// Todo text.
    #[serde(default)]
    todos: String,
}

#[derive(ToSchema, Deserialize)]
pub struct ModifyTodoRequest {
    #[serde(default)]
    todos: String,
    /// Completion flag, `false` when omitted.
    #[serde(default)]
    status: bool,
}

#[utoipa::path(
    post,
    path= "/todos",
    request_body = AddTodoRequest,
    responses (
        (status = 201, description = "todo successfully added", body = Todo),
        (status = 400, description = "Todos can't be empty"),
        (status = 401, description = "invalid token"),
        (status = 422, description = "invalid JSON body request"),
    ),
    security(("bearer_auth" = [])),
    tag= "todos"
)]
#[instrument(skip_all, fields(user_id = principal.id))]
pub async fn add(
    Extension(state): Extension<Arc<AppState>>,
    principal: Principal,
    payload: Result<Json<AddTodoRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = json_body(payload)?;
    required(&payload.todos, "Todos")?;

    let todo = state.todos.create(principal.id, payload.todos).await?;
    debug!(todo_id = todo.id, "todo added");

    Ok(respond(StatusCode::CREATED, "todo successfully added", todo))
}

#[utoipa::path(
    get,
    path= "/todos",
    responses (
        (status = 200, description = "todos successfully fetched", body = [Todo]),
        (status = 401, description = "invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag= "todos"
)]
#[instrument(skip_all, fields(user_id = principal.id))]
pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    principal: Principal,
) -> Result<Response, ApiError> {
    let todos = state.todos.list_by_owner(principal.id).await?;
    Ok(respond(StatusCode::OK, "todos successfully fetched", todos))
}

#[utoipa::path(
    get,
    path= "/todos/{todo_id}",
    params(("todo_id" = i64, Path, description = "Todo id")),
    responses (
        (status = 200, description = "todo successfully fetched", body = Todo),
        (status = 400, description = "invalid todo id"),
        (status = 401, description = "invalid token"),
        (status = 403, description = "you're not authorized to access this todo"),
        (status = 404, description = "todo not found"),
    ),
    security(("bearer_auth" = [])),
    tag= "todos"
)]
pub async fn detail(OwnedTodo(todo): OwnedTodo) -> Response {
    respond(StatusCode::OK, "todo successfully fetched", todo)
}

#[utoipa::path(
    patch,
    path= "/todos/{todo_id}",
    params(("todo_id" = i64, Path, description = "Todo id")),
    request_body = ModifyTodoRequest,
    responses (
        (status = 200, description = "todo successfully modified"),
        (status = 400, description = "Todos can't be empty or invalid todo id"),
        (status = 401, description = "invalid token"),
        (status = 403, description = "you're not authorized to access this todo"),
        (status = 404, description = "todo not found"),
        (status = 422, description = "invalid JSON body request"),
    ),
    security(("bearer_auth" = [])),
    tag= "todos"
)]
#[instrument(skip_all)]
pub async fn modify(
    Extension(state): Extension<Arc<AppState>>,
    OwnedTodo(todo): OwnedTodo,
    payload: Result<Json<ModifyTodoRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = json_body(payload)?;
    required(&payload.todos, "Todos")?;

    state
        .todos
        .update(
            todo.id,
            TodoChanges {
                todos: payload.todos,
                status: payload.status,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("todo not found"))?;

    Ok(respond(StatusCode::OK, "todo successfully modified", ()))
}

#[utoipa::path(
    delete,
    path= "/todos/{todo_id}",
    params(("todo_id" = i64, Path, description = "Todo id")),
    responses (
        (status = 200, description = "todo successfully deleted"),
        (status = 400, description = "invalid todo id"),
        (status = 401, description = "invalid token"),
        (status = 403, description = "you're not authorized to access this todo"),
        (status = 404, description = "todo not found"),
    ),
    security(("bearer_auth" = [])),
    tag= "todos"
)]
#[instrument(skip_all)]
pub async fn delete(
    Extension(state): Extension<Arc<AppState>>,
    OwnedTodo(todo): OwnedTodo,
) -> Result<Response, ApiError> {
    if !state.todos.delete(todo.id).await? {
        // Removed between the ownership check and now.
        return Err(ApiError::not_found("todo not found"));
    }

    Ok(respond(StatusCode::OK, "todo successfully deleted", ()))
}
