use saferoof_auth::{AuthError, Authenticator, ProfileUpdate, SignupRequest};
use saferoof_config::AuthConfig;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn default_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-that-is-long-enough".to_string(),
        issuer: "saferoof-test".to_string(),
        audience: "saferoof-test-web".to_string(),
        token_ttl_seconds: 3_600,
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let mut options = SqliteConnectOptions::from_str(&db_url)?;
        options = options.create_if_missing(true);
        options = options.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        saferoof_database::MIGRATOR.run(&pool).await?;

        let authenticator = Authenticator::new(pool.clone(), &default_auth_config());

        Ok(Self {
            pool,
            authenticator,
            _temp_dir: temp_dir,
        })
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

fn signup_request(email: &str) -> SignupRequest {
    SignupRequest {
        first_name: "Alice".to_string(),
        last_name: "Example".to_string(),
        email: email.to_string(),
        password: "s3cret-pass".to_string(),
    }
}

#[tokio::test]
async fn signup_persists_user_with_argon2_hash() -> TestResult {
    let ctx = TestContext::new().await?;

    let (user, token) = ctx
        .authenticator()
        .signup(&signup_request("alice@example.com"))
        .await?;

    assert!(!token.is_empty());
    assert_eq!(user.email, "alice@example.com");

    let stored_hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
        .bind(user.id)
        .fetch_one(ctx.pool())
        .await?;
    assert!(
        stored_hash.starts_with("$argon2"),
        "credential must be an argon2 hash"
    );

    Ok(())
}

#[tokio::test]
async fn signup_rejects_duplicate_email() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.authenticator()
        .signup(&signup_request("alice@example.com"))
        .await?;

    let err = ctx
        .authenticator()
        .signup(&signup_request("alice@example.com"))
        .await
        .expect_err("expected duplicate email to fail");
    assert!(matches!(err, AuthError::UserExists));

    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(user_count, 1, "no additional users should be created");

    Ok(())
}

#[tokio::test]
async fn signup_rejects_invalid_input() -> TestResult {
    let ctx = TestContext::new().await?;

    let mut bad_email = signup_request("not-an-email");
    bad_email.email = "not-an-email".to_string();
    assert!(matches!(
        ctx.authenticator().signup(&bad_email).await.unwrap_err(),
        AuthError::InvalidInput(_)
    ));

    let mut short_password = signup_request("ok@example.com");
    short_password.password = "abc".to_string();
    assert!(matches!(
        ctx.authenticator().signup(&short_password).await.unwrap_err(),
        AuthError::InvalidInput(_)
    ));

    Ok(())
}

#[tokio::test]
async fn login_issues_verifiable_token() -> TestResult {
    let ctx = TestContext::new().await?;
    let (registered, _) = ctx
        .authenticator()
        .signup(&signup_request("alice@example.com"))
        .await?;

    let (user, token) = ctx
        .authenticator()
        .login("alice@example.com", "s3cret-pass")
        .await?;
    assert_eq!(user.id, registered.id);

    let identity = ctx.authenticator().verify_token(&token)?;
    assert_eq!(identity.id, registered.id);
    assert_eq!(identity.email, "alice@example.com");

    Ok(())
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.authenticator()
        .signup(&signup_request("alice@example.com"))
        .await?;

    let err = ctx
        .authenticator()
        .login("alice@example.com", "wrong-pass")
        .await
        .expect_err("wrong password must fail");
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = ctx
        .authenticator()
        .login("nobody@example.com", "s3cret-pass")
        .await
        .expect_err("unknown email must fail");
    assert!(matches!(err, AuthError::InvalidCredentials));

    Ok(())
}

#[tokio::test]
async fn verify_token_rejects_tampered_tokens() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, token) = ctx
        .authenticator()
        .signup(&signup_request("alice@example.com"))
        .await?;

    let mut tampered = token.clone();
    tampered.pop();
    assert!(ctx.authenticator().verify_token(&tampered).is_err());
    assert!(ctx.authenticator().verify_token("garbage").is_err());

    Ok(())
}

#[tokio::test]
async fn update_profile_changes_fields_and_rehashes_password() -> TestResult {
    let ctx = TestContext::new().await?;
    let (user, _) = ctx
        .authenticator()
        .signup(&signup_request("alice@example.com"))
        .await?;

    let old_hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
        .bind(user.id)
        .fetch_one(ctx.pool())
        .await?;

    let updated = ctx
        .authenticator()
        .update_profile(
            user.id,
            &ProfileUpdate {
                first_name: Some("Alicia".to_string()),
                password: Some("brand-new-pass".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.first_name, "Alicia");

    let new_hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
        .bind(user.id)
        .fetch_one(ctx.pool())
        .await?;
    assert_ne!(old_hash, new_hash);

    // old password no longer works, the new one does
    assert!(ctx
        .authenticator()
        .login("alice@example.com", "s3cret-pass")
        .await
        .is_err());
    ctx.authenticator()
        .login("alice@example.com", "brand-new-pass")
        .await?;

    Ok(())
}

#[tokio::test]
async fn update_profile_rejects_taken_email() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.authenticator()
        .signup(&signup_request("first@example.com"))
        .await?;
    let (second, _) = ctx
        .authenticator()
        .signup(&signup_request("second@example.com"))
        .await?;

    let err = ctx
        .authenticator()
        .update_profile(
            second.id,
            &ProfileUpdate {
                email: Some("first@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect_err("email collision must fail");
    assert!(matches!(err, AuthError::UserExists));

    Ok(())
}

#[tokio::test]
async fn delete_account_removes_user() -> TestResult {
    let ctx = TestContext::new().await?;
    let (user, _) = ctx
        .authenticator()
        .signup(&signup_request("alice@example.com"))
        .await?;

    ctx.authenticator().delete_account(user.id).await?;

    let err = ctx
        .authenticator()
        .profile(user.id)
        .await
        .expect_err("profile should be gone");
    assert!(matches!(err, AuthError::UserNotFound));

    let err = ctx
        .authenticator()
        .delete_account(user.id)
        .await
        .expect_err("second delete should fail");
    assert!(matches!(err, AuthError::UserNotFound));

    Ok(())
}
