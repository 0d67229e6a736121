//! Admin account repository for database operations.
//!
//! The password hash is read only by [`AdminRepository::get_auth_by_email`]
//! and never leaves this module inside a model.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use ambre_core::{AdminId, Email};

use super::RepositoryError;
use crate::models::Admin;

const SELECT_COLUMNS: &str =
    "id, username, email, name, last_login, created_at, updated_at";

/// Internal row type carrying the password hash alongside the account.
#[derive(Debug, sqlx::FromRow)]
struct AdminAuthRow {
    id: i32,
    username: String,
    email: Email,
    name: String,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    password_hash: String,
}

impl AdminAuthRow {
    fn into_parts(self) -> (Admin, String) {
        (
            Admin {
                id: AdminId::new(self.id),
                username: self.username,
                email: self.email,
                name: self.name,
                last_login: self.last_login,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            self.password_hash,
        )
    }
}

/// Optional fields for a profile update.
#[derive(Debug, Default, Clone)]
pub struct AdminPatch {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub username: Option<String>,
}

/// Repository for admin account database operations.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an admin account with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
        name: &str,
    ) -> Result<Admin, RepositoryError> {
        let admin = sqlx::query_as::<_, Admin>(
            "INSERT INTO store.admin_account (username, email, password_hash, name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, email, name, last_login, created_at, updated_at",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique)?;

        Ok(admin)
    }

    /// Get an admin by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, email, name, last_login, created_at, updated_at \
             FROM store.admin_account WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(admin)
    }

    /// Get an admin by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Admin>, RepositoryError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, email, name, last_login, created_at, updated_at \
             FROM store.admin_account WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(admin)
    }

    /// Get an admin together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_auth_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Admin, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminAuthRow>(
            "SELECT id, username, email, name, last_login, created_at, updated_at, \
             password_hash \
             FROM store.admin_account WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(AdminAuthRow::into_parts))
    }

    /// Record a successful login and return the refreshed account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch_last_login(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        let admin = sqlx::query_as::<_, Admin>(
            "UPDATE store.admin_account SET last_login = NOW(), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, username, email, name, last_login, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(admin)
    }

    /// Apply a partial profile update, bumping `updated_at`.
    ///
    /// Returns `None` when no admin has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the new username or email is
    /// taken. Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: AdminId,
        patch: AdminPatch,
    ) -> Result<Option<Admin>, RepositoryError> {
        let mut query: sqlx::QueryBuilder<'_, sqlx::Postgres> =
            sqlx::QueryBuilder::new("UPDATE store.admin_account SET updated_at = NOW()");

        if let Some(name) = patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(email) = patch.email {
            query.push(", email = ").push_bind(email);
        }
        if let Some(username) = patch.username {
            query.push(", username = ").push_bind(username);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {SELECT_COLUMNS}"));

        let admin = query
            .build_query_as::<Admin>()
            .fetch_optional(self.pool)
            .await
            .map_err(conflict_on_unique)?;

        Ok(admin)
    }

    /// Replace the password hash (rehash-on-change).
    ///
    /// Returns `false` when no admin has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_password_hash(
        &self,
        id: AdminId,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let updated: Option<(i32,)> = sqlx::query_as(
            "UPDATE store.admin_account SET password_hash = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(password_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(updated.is_some())
    }
}

/// Map unique-index violations onto `Conflict`.
fn conflict_on_unique(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("username or email already exists".to_owned());
    }
    RepositoryError::Database(e)
}
