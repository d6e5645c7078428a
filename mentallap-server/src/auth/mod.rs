//! Accounts and cookie sessions
//!
//! - sign-up: validate, hash with argon2id, insert (duplicate email is a conflict)
//! - sign-in: one error for unknown email and wrong password
//! - sessions: random token in the cookie, SHA-256 of it in the database

pub mod password;
pub mod token;

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::db::{DbError, NewUser, SessionRepo, User, UserRepo};
use crate::models::{Email, Password, PersonName, Role, ValidationError};

pub use password::{hash_password, verify_password};
pub use token::{SessionToken, SESSION_COOKIE};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Authentication error type
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Admin accounts are created from the CLI only
    #[error("role '{0}' cannot be chosen at sign-up")]
    RoleNotAllowed(Role),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Raw sign-up fields
#[derive(Debug, Clone, Default)]
pub struct SignUp<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub role: Option<&'a str>,
    pub sport: Option<&'a str>,
}

/// Roles a visitor may pick for themselves.
pub fn self_assignable(role: Role) -> bool {
    matches!(role, Role::Athlete | Role::Coach)
}

/// Validate and create an account.
pub async fn sign_up(pool: &PgPool, form: SignUp<'_>) -> Result<User, AuthError> {
    let email = Email::new(form.email)?;
    let password = Password::new(form.password)?;
    let name = PersonName::new(form.name)?;
    let role = match form.role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => Role::parse(raw)?,
        None => Role::default(),
    };
    if !self_assignable(role) {
        return Err(AuthError::RoleNotAllowed(role));
    }
    let sport = form.sport.map(str::trim).filter(|s| !s.is_empty());

    let password_hash = hash_password(&password)?;
    let user = UserRepo::new(pool)
        .create(NewUser {
            email: &email,
            password_hash: &password_hash,
            name: name.as_str(),
            role,
            sport,
            bio: None,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %role, "account created");
    Ok(user)
}

/// Check credentials. Every failure is `InvalidCredentials`.
pub async fn sign_in(pool: &PgPool, email: &str, password: &str) -> Result<User, AuthError> {
    let Ok(email) = Email::new(email) else {
        return Err(AuthError::InvalidCredentials);
    };

    let users = UserRepo::new(pool);
    let Some(credentials) = users.credentials(&email).await? else {
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_password(password, &credentials.password_hash) {
        tracing::debug!(user_id = %credentials.id, "password mismatch");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(users.get(credentials.id).await?)
}

/// Open a session for a user. Expired sessions are purged on the way.
pub async fn start_session(
    pool: &PgPool,
    user_id: uuid::Uuid,
    ttl: Duration,
) -> Result<SessionToken, DbError> {
    let sessions = SessionRepo::new(pool);
    match sessions.purge_expired().await {
        Ok(0) => {}
        Ok(purged) => tracing::debug!(purged, "expired sessions removed"),
        Err(e) => tracing::warn!(error = %e, "failed to purge expired sessions"),
    }

    let token = SessionToken::generate();
    sessions
        .create(user_id, &token.hash(), Utc::now() + ttl)
        .await?;
    Ok(token)
}

/// The live session's user, if any.
pub async fn resolve_session(pool: &PgPool, token: &SessionToken) -> Result<Option<User>, DbError> {
    SessionRepo::new(pool).find_user(&token.hash()).await
}

pub async fn end_session(pool: &PgPool, token: &SessionToken) -> Result<(), DbError> {
    SessionRepo::new(pool).delete(&token.hash()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_athlete_and_coach_are_self_assignable() {
        assert!(self_assignable(Role::Athlete));
        assert!(self_assignable(Role::Coach));
        assert!(!self_assignable(Role::Admin));
    }

    #[test]
    fn invalid_credentials_message() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}
