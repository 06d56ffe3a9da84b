//! SafeRoof authentication crate
//!
//! Password signup/login backed by Argon2 hashes plus stateless JWT
//! validation for the gateway's auth guard.

use saferoof_config::AuthConfig;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use saferoof_database::{CreateUserRequest, UpdateUserRequest, User, UserError, UserRepository};

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtManager};
pub use password::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token creation failed: {0}")]
    TokenCreation(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("user not found")]
    UserNotFound,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<UserError> for AuthError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::UserNotFound => AuthError::UserNotFound,
            UserError::EmailAlreadyExists => AuthError::UserExists,
            UserError::DatabaseError(msg) => AuthError::Database(msg),
        }
    }
}

/// The identity the auth guard attaches to a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

/// New account details
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Profile changes. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
    jwt: std::sync::Arc<JwtManager>,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        let jwt = JwtManager::new(
            &config.jwt_secret,
            config.issuer.clone(),
            config.audience.clone(),
        )
        .with_duration(Duration::from_secs(config.token_ttl_seconds));

        Self {
            users: UserRepository::new(pool),
            jwt: std::sync::Arc::new(jwt),
        }
    }

    /// Register a new account and issue its first token
    pub async fn signup(&self, request: &SignupRequest) -> Result<(User, String), AuthError> {
        validate_name("first name", &request.first_name)?;
        validate_name("last name", &request.last_name)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        if self.users.email_exists(&request.email).await? {
            return Err(AuthError::UserExists);
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .users
            .create(&CreateUserRequest {
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                email: request.email.trim().to_string(),
                password_hash,
            })
            .await?;

        let token = self.jwt.generate_token(user.id, &user.email)?;
        info!(user_id = user.id, "registered new account");

        Ok((user, token))
    }

    /// Verify credentials and issue a token
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).unwrap_or(false) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.generate_token(user.id, &user.email)?;
        info!(user_id = user.id, "login succeeded");

        Ok((user, token))
    }

    /// Validate a token and return the identity it carries
    pub fn verify_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.jwt.validate_token(token)?;
        Ok(AuthUser {
            id: claims.user_id()?,
            email: claims.email,
        })
    }

    /// Fetch a user's profile
    pub async fn profile(&self, user_id: i64) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply a partial profile update, re-hashing the password when it changes
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<User, AuthError> {
        if let Some(ref email) = update.email {
            validate_email(email)?;
        }
        if let Some(ref password) = update.password {
            validate_password(password)?;
        }

        let password_hash = match update.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let user = self
            .users
            .update(
                user_id,
                &UpdateUserRequest {
                    first_name: update.first_name.clone(),
                    last_name: update.last_name.clone(),
                    email: update.email.as_deref().map(|e| e.trim().to_string()),
                    password_hash,
                },
            )
            .await?;

        info!(user_id, "updated profile");
        Ok(user)
    }

    /// Delete an account and everything hanging off it
    pub async fn delete_account(&self, user_id: i64) -> Result<(), AuthError> {
        self.users.delete(user_id).await?;
        info!(user_id, "deleted account");
        Ok(())
    }
}

fn validate_name(field: &str, value: &str) -> Result<(), AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidInput(format!("{field} must not be empty")));
    }
    if trimmed.len() > 100 {
        return Err(AuthError::InvalidInput(format!(
            "{field} too long (max 100 characters)"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidInput("email must not be empty".to_string()));
    }
    if trimmed.len() > 255 {
        return Err(AuthError::InvalidInput(
            "email too long (max 255 characters)".to_string(),
        ));
    }

    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(AuthError::InvalidInput("invalid email format".to_string()));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AuthError::InvalidInput("invalid email format".to_string()));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < 6 {
        return Err(AuthError::InvalidInput(
            "password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}
