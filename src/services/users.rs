use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db,
    error::AppError,
    models::user::{User, UserProfile, UserRole},
};

const BCRYPT_COST: u32 = 12;
const MIN_PASSWORD_LEN: usize = 6;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

pub struct UserService;

impl UserService {
    pub async fn list(pool: &PgPool) -> Result<Vec<UserProfile>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(pool)
        .await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    /// Validate input, hash the password and insert. Duplicate email → 409.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        validate_account(name, email, password)?;

        let password_hash = bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

        let res = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name.trim())
        .bind(normalize_email(email))
        .bind(&password_hash)
        .bind(role.as_str())
        .fetch_one(pool)
        .await;

        match res {
            Ok(user) => {
                tracing::info!("Created {} account {}", role, user.id);
                Ok(user)
            }
            Err(e) if db::is_unique_violation(&e) => {
                Err(AppError::Conflict("User already exists".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a non-admin user; their selections and feedback cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        let user = Self::find_by_id(pool, id)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        if user.role == UserRole::Admin.as_str() {
            return Err(AppError::validation("Cannot delete admin users"));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        tracing::info!("Deleted user {id}");
        Ok(())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_account(name: &str, email: &str, password: &str) -> Result<(), AppError> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(AppError::validation("Please enter all fields"));
    }
    let email = email.trim();
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid_email {
        return Err(AppError::validation("Please include a valid email"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_account_requires_all_fields() {
        assert!(validate_account("", "a@b.io", "secret1").is_err());
        assert!(validate_account("Ann", "", "secret1").is_err());
        assert!(validate_account("Ann", "a@b.io", "").is_err());
        assert!(validate_account("Ann", "a@b.io", "secret1").is_ok());
    }

    #[test]
    fn test_validate_account_rejects_bad_email_and_short_password() {
        assert!(validate_account("Ann", "not-an-email", "secret1").is_err());
        assert!(validate_account("Ann", "ann@localhost", "secret1").is_err());
        assert!(validate_account("Ann", "ann@example.com", "12345").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
    }
}
