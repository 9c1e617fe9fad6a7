//! Maps validated claims to a live user record.

use tracing::debug;

use super::{principal::Principal, token::Claims};
use crate::api::{error::ApiError, store::UserStore};

/// Look the claimed identity up by email and return the fresh record.
///
/// A missing user, or a user whose id differs from the claim (the email now
/// belongs to another account), is `401 invalid user`. Backend failures are
/// `500`.
///
/// # Errors
/// See above.
pub async fn resolve(users: &dyn UserStore, claims: &Claims) -> Result<Principal, ApiError> {
    let Some(user) = users.fetch_by_email(&claims.email).await? else {
        debug!(claim_id = claims.id, "no user for token email");
        return Err(ApiError::unauthenticated("invalid user"));
    };

    if user.id != claims.id {
        debug!(claim_id = claims.id, user_id = user.id, "stale token identity");
        return Err(ApiError::unauthenticated("invalid user"));
    }

    Ok(Principal::from(user))
}
