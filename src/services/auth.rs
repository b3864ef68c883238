use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::{Claims, TokenUser},
        user::{AuthResponse, LoginRequest, RegisterRequest, UserProfile, UserRole},
    },
    services::users::UserService,
};

pub struct AuthService;

impl AuthService {
    /// Self-service sign-up. Always creates a `user`-role account.
    pub async fn register(
        pool: &PgPool,
        req: &RegisterRequest,
        jwt_secret: &str,
        ttl_seconds: u64,
    ) -> Result<AuthResponse, AppError> {
        let user =
            UserService::create(pool, &req.name, &req.email, &req.password, UserRole::User).await?;
        let profile = UserProfile::from(user);
        let token = Self::generate_access_token(profile.id, profile.role, jwt_secret, ttl_seconds)?;
        Ok(AuthResponse { token, user: profile })
    }

    pub async fn login(
        pool: &PgPool,
        req: &LoginRequest,
        jwt_secret: &str,
        ttl_seconds: u64,
    ) -> Result<AuthResponse, AppError> {
        let user = UserService::find_by_email(pool, &req.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = bcrypt::verify(&req.password, &user.password_hash)
            .map_err(|_| AppError::InvalidCredentials)?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let profile = UserProfile::from(user);
        let token = Self::generate_access_token(profile.id, profile.role, jwt_secret, ttl_seconds)?;
        tracing::info!("User {} logged in", profile.id);
        Ok(AuthResponse { token, user: profile })
    }

    pub async fn me(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, AppError> {
        UserService::find_by_id(pool, user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AppError::NotFound("User"))
    }

    pub fn generate_access_token(
        user_id: Uuid,
        role: UserRole,
        secret: &str,
        ttl_seconds: u64,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            user: TokenUser { id: user_id, role },
            iat: now,
            exp: now + ttl_seconds as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_access_token;

    #[test]
    fn test_generated_token_is_accepted_by_auth_gate() {
        let id = Uuid::new_v4();
        let token = AuthService::generate_access_token(id, UserRole::User, "s3cret", 60).unwrap();
        let user = decode_access_token(&token, "s3cret").unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.role, UserRole::User);
    }
}
