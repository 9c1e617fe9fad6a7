//! Typed request extensions bound by the gates.
//!
//! Handlers take [`Principal`] or [`OwnedTodo`] as extractors. If the matching gate
//! did not run for a route the extractor fails with an error response instead of
//! panicking.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::{
    error::ApiError,
    store::{Todo, User},
};

/// The caller, as re-resolved from storage for this request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Principal {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthenticated("invalid token"))
    }
}

/// A todo the ownership gate loaded and matched against the [`Principal`].
#[derive(Clone, Debug)]
pub struct OwnedTodo(pub Todo);

#[async_trait]
impl<S> FromRequestParts<S> for OwnedTodo
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::internal("ownership gate did not run for this route"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorKind;
    use axum::http::Request;

    fn parts() -> Parts {
        let (parts, ()) = Request::builder()
            .uri("/users/profile")
            .body(())
            .unwrap_or_default()
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn principal_missing_is_unauthenticated() {
        let mut parts = parts();
        let result = Principal::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(e) if e.kind() == ErrorKind::Unauthenticated));
    }

    #[tokio::test]
    async fn principal_is_read_from_extensions() {
        let mut parts = parts();
        let principal = Principal {
            id: 3,
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        };
        parts.extensions.insert(principal.clone());
        let result = Principal::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Ok(p) if p == principal));
    }

    #[tokio::test]
    async fn owned_todo_missing_is_internal() {
        let mut parts = parts();
        let result = OwnedTodo::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(e) if e.kind() == ErrorKind::InternalServerError));
    }

    #[test]
    fn principal_drops_password_hash() -> anyhow::Result<()> {
        let principal = Principal::from(User {
            id: 1,
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        });
        let value = serde_json::to_value(&principal)?;
        assert_eq!(value, serde_json::json!({"id": 1, "name": "Alice", "email": "a@x.com"}));
        Ok(())
    }
}
