//! User repository
//!
//! - create: INSERT ... ON CONFLICT (email) DO NOTHING, conflict reported as DbError::Conflict
//! - lookup by email returns the password hash for sign-in only

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::{Email, Role};

/// User record (never carries the password hash)
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub sport: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Parsed role; unknown stored values fall back to the least privileged role.
    pub fn role(&self) -> Role {
        Role::parse(&self.role).unwrap_or_else(|_| {
            tracing::warn!(user_id = %self.id, role = %self.role, "unknown stored role");
            Role::Athlete
        })
    }
}

/// Credentials row used by sign-in
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub password_hash: String,
}

/// Fields for a new account
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: Role,
    pub sport: Option<&'a str>,
    pub bio: Option<&'a str>,
}

const USER_COLUMNS: &str = "id, email, name, role, sport, bio, created_at";

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user; an existing email yields `DbError::Conflict`.
    pub async fn create(&self, user: NewUser<'_>) -> Result<User, DbError> {
        let created: Option<User> = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role, sport, bio)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email.as_str())
        .bind(user.password_hash)
        .bind(user.name)
        .bind(user.role.as_str())
        .bind(user.sport)
        .bind(user.bio)
        .fetch_optional(self.pool)
        .await?;

        created.ok_or_else(|| DbError::conflict("user", "User already exists"))
    }

    /// Insert the user if the email is free, otherwise return the existing row.
    pub async fn ensure(&self, user: NewUser<'_>) -> Result<(User, bool), DbError> {
        match self.create(user.clone()).await {
            Ok(created) => Ok((created, true)),
            Err(DbError::Conflict { .. }) => Ok((self.get_by_email(user.email).await?, false)),
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<User, DbError> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    pub async fn get_by_email(&self, email: &Email) -> Result<User, DbError> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", email))
    }

    /// Credentials for sign-in; `None` when the email is unknown.
    pub async fn credentials(&self, email: &Email) -> Result<Option<UserCredentials>, DbError> {
        let row = sqlx::query_as("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// All users with the given role, oldest first.
    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at ASC"
        ))
        .bind(role.as_str())
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }

    pub async fn set_role(&self, email: &Email, role: Role) -> Result<User, DbError> {
        sqlx::query_as(&format!(
            r#"
            UPDATE users SET role = $2, updated_at = NOW()
            WHERE email = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email.as_str())
        .bind(role.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("user", email))
    }

    /// Replace one user's password hash.
    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "alex.runner@example.com".into(),
            name: "Alex Runner".into(),
            role: role.into(),
            sport: Some("Track & Field".into()),
            bio: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn parses_stored_role() {
        assert_eq!(user("coach").role(), Role::Coach);
        assert_eq!(user("admin").role(), Role::Admin);
    }

    #[test]
    fn unknown_role_is_least_privileged() {
        assert_eq!(user("root").role(), Role::Athlete);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_email_conflicts() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        crate::db::migrate(&pool).await.unwrap();

        let email = Email::new(&format!("dup-{}@example.com", Uuid::new_v4())).unwrap();
        let new_user = NewUser {
            email: &email,
            password_hash: "x",
            name: "Dup",
            role: Role::Athlete,
            sport: None,
            bio: None,
        };
        let repo = UserRepo::new(&pool);
        repo.create(new_user.clone()).await.unwrap();
        assert!(matches!(
            repo.create(new_user).await.unwrap_err(),
            DbError::Conflict { .. }
        ));
    }
}
