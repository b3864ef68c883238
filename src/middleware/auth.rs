use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use crate::error::{AppError, AuthError};
use crate::models::auth::{AuthenticatedUser, Claims};

/// Header carrying the access token on HTTP requests.
pub const TOKEN_HEADER: &str = "x-auth-token";

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Missing)?;

        let secret = parts
            .extensions
            .get::<JwtSecret>()
            .ok_or(AppError::ServerMisconfigured)?;

        let user = decode_access_token(token, &secret.0).map_err(|e| {
            tracing::debug!("token rejected: {e}");
            e
        })?;

        Ok(user)
    }
}

/// Extension type to carry the JWT secret through request extensions.
#[derive(Clone)]
pub struct JwtSecret(pub String);

/// Verify signature and expiry, then check the `{user: {id, role}}` identity shape.
pub fn decode_access_token(token: &str, secret: &str) -> Result<AuthenticatedUser, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => AuthError::Malformed,
        _ => AuthError::Invalid,
    })?;
    let claims = data.claims;

    Ok(AuthenticatedUser {
        user_id: claims.user.id,
        role: claims.user.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::TokenUser;
    use crate::models::user::UserRole;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    fn now() -> usize {
        chrono::Utc::now().timestamp() as usize
    }

    fn sign<T: serde::Serialize>(claims: &T, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let id = Uuid::new_v4();
        let claims = Claims {
            user: TokenUser { id, role: UserRole::Admin },
            iat: now(),
            exp: now() + 600,
        };
        let user = decode_access_token(&sign(&claims, SECRET), SECRET).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn test_expired_token_is_distinguished() {
        let claims = Claims {
            user: TokenUser { id: Uuid::new_v4(), role: UserRole::User },
            iat: now() - 7200,
            exp: now() - 3600,
        };
        let err = decode_access_token(&sign(&claims, SECRET), SECRET).unwrap_err();
        assert_eq!(err, AuthError::Expired);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let claims = Claims {
            user: TokenUser { id: Uuid::new_v4(), role: UserRole::User },
            iat: now(),
            exp: now() + 600,
        };
        let err = decode_access_token(&sign(&claims, "other-secret"), SECRET).unwrap_err();
        assert_eq!(err, AuthError::Invalid);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let err = decode_access_token("not-a-jwt", SECRET).unwrap_err();
        assert_eq!(err, AuthError::Invalid);
    }

    #[test]
    fn test_payload_without_identity_is_malformed() {
        let claims = json!({ "sub": "someone", "iat": now(), "exp": now() + 600 });
        let err = decode_access_token(&sign(&claims, SECRET), SECRET).unwrap_err();
        assert_eq!(err, AuthError::Malformed);
    }

    #[test]
    fn test_non_uuid_identity_is_malformed() {
        let claims = json!({
            "user": { "id": "42", "role": "user" },
            "iat": now(),
            "exp": now() + 600
        });
        let err = decode_access_token(&sign(&claims, SECRET), SECRET).unwrap_err();
        assert_eq!(err, AuthError::Malformed);
    }
}
