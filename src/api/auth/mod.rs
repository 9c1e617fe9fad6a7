//! Authentication and authorization.
//!
//! - [`credential`]: Argon2id password hashing.
//! - [`token`]: HS256 bearer tokens.
//! - [`authenticate`]: gate that turns a bearer token into a [`Principal`].
//! - [`require_owner`]: gate that turns `/todos/{todo_id}` into an [`OwnedTodo`].

pub mod credential;
mod gate;
mod ownership;
mod principal;
pub mod resolver;
pub mod token;

pub use credential::CredentialCodec;
pub use gate::authenticate;
pub use ownership::require_owner;
pub use principal::{OwnedTodo, Principal};
pub use token::TokenCodec;
