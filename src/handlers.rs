use crate::{
    AppState, accounts,
    auth::{AuthUser, CurrentUser},
    error::{AppError, SAFE_DEFAULT_PATH},
    guard::{self, Decision},
    models::{
        CredentialsForm, DashboardView, EditablePost, ErrorList, Post, PostForm, PostSummary,
        PostView,
    },
    sanitize,
    session::removal_cookie,
    validation::{BODY, Phase, TITLE, validate},
};
use axum::{
    Form, Json,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;

/// Length of the plain-text excerpt shown per post on the dashboard.
const EXCERPT_CHARS: usize = 120;

/// PostId Extractor
///
/// The `{id}` path segment. An id that is not a number names no post, so it is rejected
/// the same way as an unknown one.
#[derive(Debug, Clone, Copy)]
pub struct PostId(pub i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(%rejection, "unparseable post id");
                AppError::NotFound
            })?;
        Ok(PostId(id))
    }
}

// --- Account Handlers ---

/// register_user
///
/// [Public Route] Creates an account and signs the new user in straight away.
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = CredentialsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Registered; session cookie set"),
        (status = 422, description = "Validation errors", body = ErrorList)
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let issued = accounts::register(state.repo.as_ref(), &state.codec, &form).await?;
    let jar = jar.add(state.codec.session_cookie(issued.token));
    Ok((jar, Redirect::to(SAFE_DEFAULT_PATH)))
}

/// login_user
///
/// [Public Route] Verifies credentials and sets the session cookie.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = CredentialsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; session cookie set"),
        (status = 422, description = "Invalid username / password", body = ErrorList)
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let issued = accounts::login(state.repo.as_ref(), &state.codec, &form).await?;
    let jar = jar.add(state.codec.session_cookie(issued.token));
    Ok((jar, Redirect::to(SAFE_DEFAULT_PATH)))
}

/// logout
///
/// [Public Route] Clears the session cookie. The token itself stays valid until it
/// expires; nothing is recorded server-side.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Session cookie cleared"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(removal_cookie()), Redirect::to(SAFE_DEFAULT_PATH))
}

// --- Read Handlers ---

/// dashboard
///
/// [Public Route] The home view: the current user, if any, and their posts newest first.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Dashboard", body = DashboardView))
)]
pub async fn dashboard(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, AppError> {
    let Some(current_user) = identity.summary() else {
        return Ok(Json(DashboardView::default()));
    };

    let posts = state
        .repo
        .list_posts_by_author(current_user.id)
        .await?
        .into_iter()
        .map(|post| PostSummary {
            excerpt: sanitize::excerpt(&post.body, EXCERPT_CHARS),
            id: post.id,
            title: post.title,
            created_at: post.created_at,
        })
        .collect();

    Ok(Json(DashboardView {
        current_user: Some(current_user),
        posts,
    }))
}

/// get_post
///
/// [Public Route] A single post with its body rendered to allow-listed HTML.
/// An unknown id redirects to the home page.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostView),
        (status = 303, description = "Unknown post")
    )
)]
pub async fn get_post(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    PostId(id): PostId,
) -> Result<Json<PostView>, AppError> {
    let post = state.repo.get_post(id).await?.ok_or(AppError::NotFound)?;
    let is_author = guard::authorize(&identity, &post) == Decision::Allowed;

    Ok(Json(PostView {
        id: post.id,
        body_html: sanitize::render_markdown(&post.body),
        title: post.title,
        author_id: post.author_id,
        author_username: post.author_username.unwrap_or_default(),
        created_at: post.created_at,
        is_author,
    }))
}

// --- Post Mutation Handlers ---

/// create_post
///
/// [Authenticated Route] Publishes a post owned by the signed-in user.
#[utoipa::path(
    post,
    path = "/posts",
    request_body(content = PostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created; redirects to the new post"),
        (status = 422, description = "Validation errors", body = ErrorList)
    )
)]
pub async fn create_post(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Form(form): Form<PostForm>,
) -> Result<Redirect, AppError> {
    let (title, body) = clean_post_form(&form)?;
    let post = state.repo.create_post(&title, &body, user_id).await?;
    tracing::info!(post_id = post.id, user_id, "post created");
    Ok(Redirect::to(&format!("/posts/{}", post.id)))
}

/// edit_post_form
///
/// [Authenticated Route] The stored title and body of one of the user's own posts.
#[utoipa::path(
    get,
    path = "/posts/{id}/edit",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Editable post", body = EditablePost),
        (status = 303, description = "Unknown post or not the author")
    )
)]
pub async fn edit_post_form(
    auth_user: AuthUser,
    State(state): State<AppState>,
    PostId(id): PostId,
) -> Result<Json<EditablePost>, AppError> {
    let post = owned_post(&state, &auth_user, id).await?;
    Ok(Json(EditablePost {
        id: post.id,
        title: post.title,
        body: post.body,
    }))
}

/// update_post
///
/// [Authenticated Route] Replaces the title and body of one of the user's own posts.
#[utoipa::path(
    post,
    path = "/posts/{id}/edit",
    params(("id" = i64, Path, description = "Post ID")),
    request_body(content = PostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, or silently refused"),
        (status = 422, description = "Validation errors", body = ErrorList)
    )
)]
pub async fn update_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    PostId(id): PostId,
    Form(form): Form<PostForm>,
) -> Result<Redirect, AppError> {
    let post = owned_post(&state, &auth_user, id).await?;
    let (title, body) = clean_post_form(&form)?;
    state.repo.update_post(post.id, &title, &body).await?;
    tracing::info!(post_id = post.id, user_id = auth_user.id, "post updated");
    Ok(Redirect::to(&format!("/posts/{}", post.id)))
}

/// delete_post
///
/// [Authenticated Route] Deletes one of the user's own posts.
#[utoipa::path(
    post,
    path = "/posts/{id}/delete",
    params(("id" = i64, Path, description = "Post ID")),
    responses((status = 303, description = "Deleted, or silently refused"))
)]
pub async fn delete_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    PostId(id): PostId,
) -> Result<Redirect, AppError> {
    let post = owned_post(&state, &auth_user, id).await?;
    state.repo.delete_post(post.id).await?;
    tracing::info!(post_id = post.id, user_id = auth_user.id, "post deleted");
    Ok(Redirect::to(SAFE_DEFAULT_PATH))
}

// --- Helpers ---

/// Loads a post and applies the ownership guard. Both a missing post and someone
/// else's post end in the same redirect.
async fn owned_post(state: &AppState, auth_user: &AuthUser, id: i64) -> Result<Post, AppError> {
    let post = state.repo.get_post(id).await?.ok_or(AppError::NotFound)?;

    if guard::authorize(&auth_user.identity, &post) == Decision::Denied {
        tracing::warn!(post_id = id, user_id = auth_user.id, "post mutation denied");
        return Err(AppError::Denied);
    }
    Ok(post)
}

/// Strips markup from both fields, then reports every empty one together.
fn clean_post_form(form: &PostForm) -> Result<(String, String), AppError> {
    let title = sanitize::strip_markup(&form.title);
    let body = sanitize::strip_markup(&form.body);

    let errors = validate(
        &[(&TITLE, title.as_str()), (&BODY, body.as_str())],
        Phase::Presence,
    );
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok((title, body))
}
