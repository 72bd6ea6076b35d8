use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::{ConnectionTrait, EntityTrait};
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, OptionalAuthUser};
use crate::listing::{ArticleScope, list_articles, profile_counts};
use crate::models::article::{ArticleSummaryPage, ListQuery, Pagination, SalesQuery};
use crate::models::user::ProfileResponse;
use crate::state::AppState;

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn profile(state: &AppState, id: i32, is_self: bool) -> Result<ProfileResponse, AppError> {
    let u = find_user(&state.db, id).await?;
    let counts = profile_counts(&state.db, id).await?;
    Ok(ProfileResponse::new(u, counts, is_self))
}

async fn article_page(
    state: &AppState,
    scope: ArticleScope,
    viewer: Option<i32>,
    query: &ListQuery,
) -> Result<ArticleSummaryPage, AppError> {
    let request = query.page_request();
    let page = list_articles(&state.db, scope, viewer, query.sort(), request).await?;
    Ok(ArticleSummaryPage {
        data: page.items,
        pagination: Pagination::new(request, page.total),
    })
}

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    operation_id = "getMyProfile",
    summary = "Get the caller's profile",
    responses(
        (status = 200, description = "Profile with counters", body = ProfileResponse),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(profile(&state, auth_user.user_id, true).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    operation_id = "getProfile",
    summary = "Get a user's public profile",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile with counters", body = ProfileResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(id))]
pub async fn get_profile(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProfileResponse>, AppError> {
    let is_self = viewer.as_ref().is_some_and(|v| v.user_id == id);
    Ok(Json(profile(&state, id, is_self).await?))
}

#[utoipa::path(
    get,
    path = "/users/{id}/sales",
    tag = "Users",
    operation_id = "listUserSales",
    summary = "List a user's articles",
    description = "Articles written by the user, optionally filtered by trade status. `isLiked` is \
        only populated for signed-in callers.",
    params(("id" = i32, Path, description = "User ID"), SalesQuery),
    responses(
        (status = 200, description = "Articles", body = ArticleSummaryPage),
        (status = 400, description = "Unknown status (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, query), fields(id))]
pub async fn list_user_sales(
    viewer: OptionalAuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<ArticleSummaryPage>, AppError> {
    let status = query.status()?;
    find_user(&state.db, id).await?;

    let scope = ArticleScope::Sales {
        writer_id: id,
        status,
    };
    let viewer = viewer.as_ref().map(|v| v.user_id);
    Ok(Json(article_page(&state, scope, viewer, &query.list()).await?))
}

#[utoipa::path(
    get,
    path = "/users/me/sales",
    tag = "Users",
    operation_id = "listMySales",
    summary = "List the caller's articles",
    params(SalesQuery),
    responses(
        (status = 200, description = "Articles", body = ArticleSummaryPage),
        (status = 400, description = "Unknown status (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_sales(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<ArticleSummaryPage>, AppError> {
    let scope = ArticleScope::Sales {
        writer_id: auth_user.user_id,
        status: query.status()?,
    };
    Ok(Json(
        article_page(&state, scope, Some(auth_user.user_id), &query.list()).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/users/me/likes",
    tag = "Users",
    operation_id = "listMyLikes",
    summary = "List articles the caller likes",
    params(ListQuery),
    responses(
        (status = 200, description = "Articles", body = ArticleSummaryPage),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_likes(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ArticleSummaryPage>, AppError> {
    let scope = ArticleScope::Likes {
        user_id: auth_user.user_id,
    };
    Ok(Json(
        article_page(&state, scope, Some(auth_user.user_id), &query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/users/me/offers",
    tag = "Users",
    operation_id = "listMyOffers",
    summary = "List articles the caller made offers on",
    params(ListQuery),
    responses(
        (status = 200, description = "Articles", body = ArticleSummaryPage),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_offers(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ArticleSummaryPage>, AppError> {
    let scope = ArticleScope::Offers {
        user_id: auth_user.user_id,
    };
    Ok(Json(
        article_page(&state, scope, Some(auth_user.user_id), &query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/users/me/buys",
    tag = "Users",
    operation_id = "listMyBuys",
    summary = "List articles the caller bought",
    description = "Articles whose selected offer is the caller's. `isReviewed` tells whether the \
        caller already reviewed the trade.",
    params(ListQuery),
    responses(
        (status = 200, description = "Articles", body = ArticleSummaryPage),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_buys(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ArticleSummaryPage>, AppError> {
    let scope = ArticleScope::Buys {
        user_id: auth_user.user_id,
    };
    Ok(Json(
        article_page(&state, scope, Some(auth_user.user_id), &query).await?,
    ))
}
