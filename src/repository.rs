use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use thiserror::Error;

use crate::models::{Post, User};

#[derive(Debug, Error)]
pub enum RepoError {
    /// The `users.username` uniqueness constraint rejected the insert.
    #[error("username is already taken")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// Persistence contract for the two stores. Handlers and flows only see
/// `Arc<dyn Repository>`, so tests can run against an in-memory database or a fake.
///
/// Mutations here are unconditional: ownership is decided by `guard` before any
/// post-mutating method is called, never inside the store.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    /// Inserts a user. A taken username yields `RepoError::Duplicate` even when the
    /// caller's pre-check raced with a concurrent registration.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepoError>;

    // --- Post Store ---
    async fn create_post(&self, title: &str, body: &str, author_id: i64)
    -> Result<Post, RepoError>;
    /// Looks a post up by id, joined with its author's username.
    async fn get_post(&self, id: i64) -> Result<Option<Post>, RepoError>;
    /// The author's posts, newest first.
    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>, RepoError>;
    async fn update_post(&self, id: i64, title: &str, body: &str) -> Result<(), RepoError>;
    async fn delete_post(&self, id: i64) -> Result<(), RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Opens a connection pool. In-memory databases get a single, never-recycled
/// connection, since every SQLite connection to `:memory:` is a separate database.
pub async fn connect(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(db_url)?
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool_options = if db_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    pool_options.connect_with(options).await
}

/// Creates the tables if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at DATETIME NOT NULL,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            author_id INTEGER NOT NULL REFERENCES users (id)
        )
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS posts_author_idx ON posts (author_id, created_at)")
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// SqliteRepository
///
/// The concrete implementation of `Repository`, backed by SQLite.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// The UNIQUE constraint is the authority on username uniqueness; its violation
    /// is translated rather than surfaced as a database fault.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES (?, ?) RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => RepoError::Duplicate,
            other => RepoError::Database(other),
        })
    }

    async fn create_post(
        &self,
        title: &str,
        body: &str,
        author_id: i64,
    ) -> Result<Post, RepoError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (created_at, title, body, author_id) VALUES (?, ?, ?, ?)
            RETURNING id, title, body, author_id, created_at
            "#,
        )
        .bind(Utc::now())
        .bind(title)
        .bind(body)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.body, p.author_id, p.created_at, u.username AS author_username
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>, RepoError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, body, author_id, created_at
            FROM posts
            WHERE author_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn update_post(&self, id: i64, title: &str, body: &str) -> Result<(), RepoError> {
        sqlx::query("UPDATE posts SET title = ?, body = ? WHERE id = ?")
            .bind(title)
            .bind(body)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
