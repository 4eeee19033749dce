use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Actor identity extracted from the `X-User-Id` / `X-User-Role`
/// headers injected by the fronting auth layer. Authentication itself
/// happens upstream; the engine only needs to know who is acting.
///
/// Add this as a handler parameter to require an identified actor.
pub struct ActorUser {
    pub user_id: i32,
    pub role: String,
}

impl ActorUser {
    /// Returns `Ok(())` if the actor carries the given role,
    /// `Err(PermissionDenied)` otherwise.
    pub fn require_role(&self, role: &str) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl<S> FromRequestParts<S> for ActorUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_header = parts
            .headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::IdentityMissing)?;

        let user_id: i32 = user_header
            .trim()
            .parse()
            .map_err(|_| AppError::IdentityInvalid)?;

        let role = parts
            .headers
            .get("X-User-Role")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("player")
            .trim()
            .to_string();

        Ok(ActorUser { user_id, role })
    }
}
