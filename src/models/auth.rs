use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRole;

/// Identity carried inside the token, `{"user": {"id", "role"}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: Uuid,
    pub role: UserRole,
}

/// Claims embedded in the JWT access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub exp: usize,
    pub iat: usize,
}

/// Extracted from the validated JWT: available via Axum extractors
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
