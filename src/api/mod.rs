use crate::api::{
    auth::{CredentialCodec, TokenCodec},
    handlers::{health, todos, users},
    store::{PgStore, TodoStore, UserStore},
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware,
    routing::{get, patch, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error;
pub(crate) mod handlers;
mod openapi;
pub mod store;

pub use openapi::openapi;

/// Shared, read-only state handed to every gate and handler.
pub struct AppState {
    pub tokens: TokenCodec,
    pub credentials: CredentialCodec,
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
}

impl AppState {
    /// Build state backed by a single store implementing both capabilities.
    #[must_use]
    pub fn with_store<S>(store: Arc<S>, tokens: TokenCodec, credentials: CredentialCodec) -> Self
    where
        S: UserStore + TodoStore + 'static,
    {
        Self {
            tokens,
            credentials,
            users: store.clone(),
            todos: store,
        }
    }
}

/// Build the full router: public routes, routes behind the authentication gate,
/// and `/todos/{todo_id}` behind both gates.
pub fn app(state: Arc<AppState>) -> Router {
    let owned = Router::new()
        .route(
            "/todos/:todo_id",
            get(todos::detail).patch(todos::modify).delete(todos::delete),
        )
        .route_layer(middleware::from_fn(auth::require_owner));

    let protected = Router::new()
        .route("/users/profile", get(users::profile))
        .route("/users/modify", patch(users::modify))
        .route("/todos", post(todos::add).get(todos::list))
        .merge(owned)
        .route_layer(middleware::from_fn(auth::authenticate));

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if the database is unreachable, the schema cannot be applied or
/// the listener fails
pub async fn new(
    port: u16,
    dsn: String,
    tokens: TokenCodec,
    credentials: CredentialCodec,
) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgStore::new(pool));
    store
        .apply_schema()
        .await
        .context("Failed to apply database schema")?;

    let state = Arc::new(AppState::with_store(store, tokens, credentials));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", err);
                std::future::pending::<()>().await;
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
