#![allow(clippy::needless_for_each)]

use super::{
    auth::Principal,
    handlers::{health, todos, users},
    store::Todo,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::register,
        users::login,
        users::profile,
        users::modify,
        todos::add,
        todos::list,
        todos::detail,
        todos::modify,
        todos::delete,
    ),
    components(
        schemas(
            health::Health,
            users::RegisterRequest,
            users::LoginRequest,
            users::ModifyUserRequest,
            users::TokenResponse,
            todos::AddTodoRequest,
            todos::ModifyTodoRequest,
            Principal,
            Todo,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "users", description = "Registration, login and profile"),
        (name = "todos", description = "Todo items owned by the caller"),
        (name = "health", description = "Service health"),
    )
)]
pub(crate) struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn openapi_documents_every_route() {
        let spec = openapi();
        for path in [
            "/health",
            "/users/register",
            "/users/login",
            "/users/profile",
            "/users/modify",
            "/todos",
            "/todos/{todo_id}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn openapi_declares_bearer_scheme() {
        let spec = openapi();
        let schemes = spec.components.map(|c| c.security_schemes).unwrap_or_default();
        assert!(schemes.contains_key("bearer_auth"));
    }
}
