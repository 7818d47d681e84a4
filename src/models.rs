use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A row of the `users` table. The hash never leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Post
///
/// A row of the `posts` table, optionally joined with the author's username.
/// `title` and `body` are stored with all markup stripped.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    // FK to users.id (Owner).
    pub author_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // Loaded via a JOIN on users in single-post lookups.
    #[sqlx(default)]
    pub author_username: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// CredentialsForm
///
/// Form body of `POST /register` and `POST /login`. Missing fields deserialize as
/// empty strings so they surface as validation errors rather than extractor rejections.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// PostForm
///
/// Form body for creating and editing a post.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub body: String,
}

// --- Views (Output Schemas) ---

/// ErrorList
///
/// Ordered, human-readable problems with a submitted form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ErrorList {
    pub errors: Vec<String>,
}

/// UserSummary
///
/// The "current user" exposed to views.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

/// PostSummary
///
/// A dashboard list entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// DashboardView
///
/// `GET /`: anonymous visitors get `current_user: null` and no posts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DashboardView {
    pub current_user: Option<UserSummary>,
    pub posts: Vec<PostSummary>,
}

/// PostView
///
/// `GET /posts/{id}`: the body rendered to allow-listed HTML.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub body_html: String,
    pub author_id: i64,
    pub author_username: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    /// Whether the requesting identity may edit or delete this post.
    pub is_author: bool,
}

/// EditablePost
///
/// `GET /posts/{id}/edit`: stored source for pre-filling an edit form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EditablePost {
    pub id: i64,
    pub title: String,
    pub body: String,
}
