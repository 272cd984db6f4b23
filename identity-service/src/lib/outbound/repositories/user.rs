use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::user::errors::AuthError;
use crate::user::models::EmailAddress;
use crate::user::models::NewUser;
use crate::user::models::User;
use crate::user::models::UserId;
use crate::user::ports::UserRepository;

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     enabled, role, provider, verification_token, created_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_column(&self, column: &str, value: &str) -> Result<Option<User>, AuthError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        self.find_by_column("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        self.find_by_column("email", email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, AuthError> {
        self.find_by_column("verification_token", token).await
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, \
             enabled, role, provider, verification_token) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(user.email.as_str())
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.enabled)
            .bind(user.role.as_str())
            .bind(user.provider.as_str())
            .bind(&user.verification_token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e))?;

        row.into_user()
    }

    async fn update(&self, user: &User) -> Result<User, AuthError> {
        let sql = format!(
            "UPDATE users \
             SET username = $2, email = $3, password_hash = $4, first_name = $5, \
                 last_name = $6, enabled = $7, role = $8, provider = $9, \
                 verification_token = $10 \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id.0)
            .bind(&user.username)
            .bind(user.email.as_str())
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.enabled)
            .bind(user.role.as_str())
            .bind(user.provider.as_str())
            .bind(&user.verification_token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e))?
            .ok_or(AuthError::UserNotFound)?;

        row.into_user()
    }
}

/// Unique-constraint violations are the storage-level resolution of the
/// register race; constraint names match the migration.
fn map_unique_violation(e: sqlx::Error) -> AuthError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("users_username_key") {
                return AuthError::UsernameTaken;
            }
            if db_err.constraint() == Some("users_email_key") {
                return AuthError::EmailTaken;
            }
        }
    }
    AuthError::Database(e.to_string())
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: Option<String>,
    first_name: String,
    last_name: String,
    enabled: bool,
    role: String,
    provider: String,
    verification_token: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, AuthError> {
        Ok(User {
            id: UserId(self.id),
            username: self.username,
            email: EmailAddress::new(self.email)?,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            enabled: self.enabled,
            role: self
                .role
                .parse()
                .map_err(|e: crate::user::errors::InvalidRoleError| {
                    AuthError::Database(e.to_string())
                })?,
            provider: self.provider.parse().map_err(
                |e: crate::user::errors::InvalidProviderError| AuthError::Database(e.to_string()),
            )?,
            verification_token: self.verification_token,
            created_at: self.created_at,
        })
    }
}
