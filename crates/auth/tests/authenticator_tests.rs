use chrono::{Duration, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use tempfile::TempDir;

use duolog_auth::{AuthError, Authenticator};
use duolog_config::AuthConfig;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

fn default_auth_config() -> AuthConfig {
    AuthConfig {
        token_ttl_seconds: 3_600,
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new(config: AuthConfig) -> TestResult<Self> {
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

        MIGRATOR.run(&pool).await?;

        let authenticator = Authenticator::new(pool.clone(), config);

        Ok(Self {
            pool,
            authenticator,
            _temp_dir: temp_dir,
        })
    }

    async fn new_default() -> TestResult<Self> {
        Self::new(default_auth_config()).await
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

#[tokio::test]
async fn register_persists_user_with_hashed_password() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let user = ctx
        .authenticator()
        .register("alice", "alice@example.com", "s3cret")
        .await?;

    let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
        .bind(user.id)
        .fetch_one(ctx.pool())
        .await?;

    assert_ne!(stored, "s3cret", "password must not be stored in the clear");
    assert!(stored.starts_with("$argon2"), "expected a PHC hash string");
    Ok(())
}

#[tokio::test]
async fn register_rejects_duplicate_email_and_username() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let auth = ctx.authenticator();

    auth.register("alice", "alice@example.com", "s3cret").await?;

    let same_email = auth.register("allie", "alice@example.com", "s3cret").await;
    assert!(matches!(same_email, Err(AuthError::UserExists)));

    let same_username = auth.register("alice", "other@example.com", "s3cret").await;
    assert!(matches!(same_username, Err(AuthError::UserExists)));
    Ok(())
}

#[tokio::test]
async fn login_issues_a_token_that_authenticates() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let auth = ctx.authenticator();

    let registered = auth.register("alice", "alice@example.com", "s3cret").await?;
    let session = auth.login("alice@example.com", "s3cret").await?;

    assert_eq!(session.user_id, registered.id);
    assert!(session.expires_at > Utc::now());

    let (user, resolved) = auth.authenticate_token(&session.token).await?;
    assert_eq!(user.id, registered.id);
    assert_eq!(user.username, "alice");
    assert_eq!(resolved.token, session.token);
    Ok(())
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let auth = ctx.authenticator();

    auth.register("alice", "alice@example.com", "s3cret").await?;

    let wrong = auth.login("alice@example.com", "nope").await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

    let unknown = auth.login("bob@example.com", "s3cret").await;
    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    Ok(())
}

#[tokio::test]
async fn unknown_token_is_rejected() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let result = ctx.authenticator().authenticate_token("no-such-token").await;
    assert!(matches!(result, Err(AuthError::TokenNotFound)));
    Ok(())
}

#[tokio::test]
async fn revoked_token_no_longer_authenticates() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let auth = ctx.authenticator();

    auth.register("alice", "alice@example.com", "s3cret").await?;
    let session = auth.login("alice@example.com", "s3cret").await?;

    auth.revoke_token(&session.token).await?;

    let result = auth.authenticate_token(&session.token).await;
    assert!(matches!(result, Err(AuthError::TokenRevoked)));

    // Revoking again is harmless.
    auth.revoke_token(&session.token).await?;
    Ok(())
}

#[tokio::test]
async fn expired_session_is_rejected_and_removed() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let auth = ctx.authenticator();

    let user = auth.register("alice", "alice@example.com", "s3cret").await?;

    let past = (Utc::now() - Duration::hours(2)).to_rfc3339();
    sqlx::query("INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(user.id)
        .bind("stale-token")
        .bind(&past)
        .bind(&past)
        .execute(ctx.pool())
        .await?;

    let result = auth.authenticate_token("stale-token").await;
    assert!(matches!(result, Err(AuthError::TokenExpired)));

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE token = ?")
        .bind("stale-token")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(remaining, 0, "expired session should be deleted on sight");
    Ok(())
}

#[tokio::test]
async fn purge_expired_clears_stale_rows() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let auth = ctx.authenticator();

    let user = auth.register("alice", "alice@example.com", "s3cret").await?;
    let live = auth.login("alice@example.com", "s3cret").await?;

    let past = (Utc::now() - Duration::hours(2)).to_rfc3339();
    sqlx::query("INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(user.id)
        .bind("stale-token")
        .bind(&past)
        .bind(&past)
        .execute(ctx.pool())
        .await?;
    sqlx::query("INSERT INTO revoked_tokens (token, revoked_at, expires_at) VALUES (?, ?, ?)")
        .bind("stale-revocation")
        .bind(&past)
        .bind(&past)
        .execute(ctx.pool())
        .await?;

    let purged = auth.purge_expired().await?;
    assert_eq!(purged, 2);

    // The live session survives the purge.
    let (resolved, _) = auth.authenticate_token(&live.token).await?;
    assert_eq!(resolved.id, user.id);
    Ok(())
}
