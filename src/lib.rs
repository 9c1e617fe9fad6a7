//! # todo-app
//!
//! A small multi-tenant todo list service. Users register, log in with an
//! email/password pair and receive a signed bearer token, then manage their own
//! todo items.
//!
//! ## Request pipeline
//!
//! Every protected route runs the same chain, in this order:
//!
//! 1. **Authentication gate**: unwraps `Authorization: Bearer <token>`, checks the
//!    HS256 signature and claims, then re-resolves the user from storage by the
//!    claimed email. Codec failures are `401 invalid token`; a token whose user
//!    no longer resolves is `401 invalid user`.
//! 2. **Ownership gate** (only `/todos/{todo_id}`): loads the todo and compares its
//!    owner with the authenticated user. Missing todos are `404`, foreign ones `403`.
//! 3. The handler.
//!
//! Every response, success or failure, uses the `{status, message, data}` envelope.
//!
//! ## Storage
//!
//! Handlers only talk to the [`api::store::UserStore`] and [`api::store::TodoStore`]
//! traits. `PostgreSQL` (via `sqlx`) backs the server; an in-memory store backs the
//! tests.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
