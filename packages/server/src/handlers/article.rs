use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::article::{ArticleService, ImageUpload, LikeRegistry, MAX_IMAGES};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, OptionalAuthUser};
use crate::extractors::json::parse_json_part;
use crate::models::article::*;
use crate::state::AppState;
use crate::utils::filename::image_kind;

/// Parsed `multipart/form-data` of an article write.
struct ArticleForm<T> {
    fields: Option<T>,
    images: Vec<ImageUpload>,
}

/// Read the `article` JSON part and the `images` file parts.
async fn read_article_form<T: DeserializeOwned>(
    multipart: &mut Multipart,
    max_blob_size: u64,
) -> Result<ArticleForm<T>, AppError> {
    let mut fields = None;
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("article") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read 'article': {e}")))?;
                fields = Some(parse_json_part("article", &text)?);
            }
            Some("images") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;
                // Browsers send an empty, unnamed part when no file is picked.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if bytes.is_empty() {
                    return Err(AppError::Validation(format!("Image '{file_name}' is empty")));
                }
                if bytes.len() as u64 > max_blob_size {
                    return Err(AppError::Validation(format!(
                        "Image '{file_name}' exceeds {max_blob_size} bytes"
                    )));
                }
                let kind =
                    image_kind(&file_name).map_err(|e| AppError::Validation(e.message().into()))?;
                images.push(ImageUpload {
                    kind,
                    bytes: bytes.to_vec(),
                });
                if images.len() > MAX_IMAGES {
                    return Err(AppError::Validation(format!(
                        "At most {MAX_IMAGES} images per article"
                    )));
                }
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(ArticleForm { fields, images })
}

#[utoipa::path(
    post,
    path = "/articles",
    tag = "Articles",
    operation_id = "createArticle",
    summary = "Create an article",
    description = "Multipart request: a text part `article` holding `CreateArticleRequest` as JSON, \
        followed by zero or more file parts `images` (at most 10). The article starts in `SALE`.",
    request_body(content_type = "multipart/form-data", content = CreateArticleRequest),
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 400, description = "Validation error (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn create_article(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_article_form::<CreateArticleRequest>(
        &mut multipart,
        state.config.storage.max_blob_size,
    )
    .await?;
    let payload = form
        .fields
        .ok_or_else(|| AppError::Validation("Missing 'article' part".into()))?;
    validate_create_article(&payload)?;

    let created = ArticleService::new(&state.db, &*state.blob_store)
        .create(&auth_user, payload.into(), form.images)
        .await?;

    Ok((StatusCode::CREATED, Json(ArticleResponse::from(created))))
}

#[utoipa::path(
    put,
    path = "/articles/{id}",
    tag = "Articles",
    operation_id = "updateArticle",
    summary = "Update an article",
    description = "Multipart request shaped like create. Fields of the `article` part that are absent \
        or `null` keep their value; the part itself may be omitted. A non-empty `images` set \
        replaces every existing image, no `images` parts leave the images untouched.",
    params(("id" = i32, Path, description = "Article ID")),
    request_body(content_type = "multipart/form-data", content = UpdateArticleRequest),
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 400, description = "Validation error (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Not the writer (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id))]
pub async fn update_article(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ArticleResponse>, AppError> {
    let form = read_article_form::<UpdateArticleRequest>(
        &mut multipart,
        state.config.storage.max_blob_size,
    )
    .await?;
    let payload = form.fields.unwrap_or_default();
    validate_update_article(&payload)?;

    let updated = ArticleService::new(&state.db, &*state.blob_store)
        .update(&auth_user, id, payload.into(), form.images)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/articles/{id}",
    tag = "Articles",
    operation_id = "deleteArticle",
    summary = "Delete an article",
    description = "Deletes the article with its images, likes and offers. Refused once the trade \
        has been reviewed.",
    params(("id" = i32, Path, description = "Article ID")),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Not the writer (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Trade already reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_article(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    ArticleService::new(&state.db, &*state.blob_store)
        .delete(&auth_user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/articles/{id}",
    tag = "Articles",
    operation_id = "getArticle",
    summary = "Get an article",
    description = "Returns the article with its images and writer, and counts the view. \
        `isLiked` is `null` for anonymous callers.",
    params(("id" = i32, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article details", body = ArticleDetailResponse),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn get_article(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ArticleDetailResponse>, AppError> {
    let detail = ArticleService::new(&state.db, &*state.blob_store)
        .detail(viewer.as_ref(), id)
        .await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    post,
    path = "/articles/{id}/like",
    tag = "Articles",
    operation_id = "toggleLike",
    summary = "Like or unlike an article",
    description = "Adds the caller's like if absent and removes it if present. Writers cannot like \
        their own articles.",
    params(("id" = i32, Path, description = "Article ID")),
    responses(
        (status = 200, description = "New like state", body = LikeResponse),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Own article (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn toggle_like(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LikeResponse>, AppError> {
    let (like_state, like_count) = LikeRegistry::new(&state.db).toggle(&auth_user, id).await?;
    Ok(Json(LikeResponse {
        state: like_state,
        like_count,
    }))
}
