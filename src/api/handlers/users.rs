use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::{json_body, required, required_email};
use crate::api::{
    auth::{token::Subject, Principal},
    error::{respond, ApiError},
    store::{NewUser, UserChanges},
    AppState,
};

#[derive(ToSchema, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(ToSchema, Deserialize)]
pub struct ModifyUserRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct TokenResponse {
    token: String,
}

#[utoipa::path(
    post,
    path= "/users/register",
    request_body = RegisterRequest,
    responses (
        (status = 201, description = "user successfully created"),
        (status = 400, description = "Missing field or invalid email"),
        (status = 409, description = "email has been used"),
        (status = 422, description = "invalid JSON body request"),
    ),
    tag= "users"
)]
#[instrument(skip_all)]
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = json_body(payload)?;
    required(&payload.name, "Name")?;
    required_email(&payload.email)?;
    required(&payload.password, "Password")?;

    let password_hash = state.credentials.hash(&payload.password)?;
    let user = state
        .users
        .create(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
        })
        .await?;

    debug!(user_id = user.id, "user registered");

    Ok(respond(StatusCode::CREATED, "user successfully created", ()))
}

#[utoipa::path(
    post,
    path= "/users/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "user successfully logged in", body = TokenResponse),
        (status = 400, description = "Missing field or invalid email"),
        (status = 401, description = "invalid user email or password"),
        (status = 422, description = "invalid JSON body request"),
    ),
    tag= "users"
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = json_body(payload)?;
    required_email(&payload.email)?;
    required(&payload.password, "Password")?;

    let user = state.users.fetch_by_email(&payload.email).await?;
    let verified = state.credentials.verify_account(
        &payload.password,
        user.as_ref().map(|user| user.password_hash.as_str()),
    );
    let Some(user) = user.filter(|_| verified) else {
        debug!("login rejected");
        return Err(ApiError::unauthenticated("invalid user email or password"));
    };

    let token = state
        .tokens
        .issue(&Subject {
            id: user.id,
            email: user.email,
        })
        .map_err(ApiError::internal)?;

    Ok(respond(
        StatusCode::OK,
        "user successfully logged in",
        TokenResponse { token },
    ))
}

#[utoipa::path(
    get,
    path= "/users/profile",
    responses (
        (status = 200, description = "user successfully fetched", body = Principal),
        (status = 401, description = "invalid token"),
        (status = 404, description = "user not found"),
    ),
    security(("bearer_auth" = [])),
    tag= "users"
)]
#[instrument(skip_all, fields(user_id = principal.id))]
pub async fn profile(
    Extension(state): Extension<Arc<AppState>>,
    principal: Principal,
) -> Result<Response, ApiError> {
    let user = state
        .users
        .fetch_by_id(principal.id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(respond(
        StatusCode::OK,
        "user successfully fetched",
        Principal::from(user),
    ))
}

#[utoipa::path(
    patch,
    path= "/users/modify",
    request_body = ModifyUserRequest,
    responses (
        (status = 200, description = "user successfully modified"),
        (status = 400, description = "Missing field or invalid email"),
        (status = 401, description = "invalid token"),
        (status = 409, description = "email has been used"),
        (status = 422, description = "invalid JSON body request"),
    ),
    security(("bearer_auth" = [])),
    tag= "users"
)]
#[instrument(skip_all, fields(user_id = principal.id))]
pub async fn modify(
    Extension(state): Extension<Arc<AppState>>,
    principal: Principal,
    payload: Result<Json<ModifyUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = json_body(payload)?;
    required(&payload.name, "Name")?;
    required_email(&payload.email)?;

    state
        .users
        .update(
            principal.id,
            UserChanges {
                name: payload.name,
                email: payload.email,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(respond(StatusCode::OK, "user successfully modified", ()))
}
