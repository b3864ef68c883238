use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::models::auth::AuthenticatedUser;

/// Extractor for admin-only handlers: authenticates, then requires the admin role.
pub struct AdminUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
