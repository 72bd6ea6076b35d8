use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::trade::*;
use crate::state::AppState;
use crate::trade::{OfferService, ReviewLedger};

#[utoipa::path(
    post,
    path = "/articles/{id}/offers",
    tag = "Trade",
    operation_id = "placeOffer",
    summary = "Make an offer on an article",
    description = "Quotes a price on an article that is on sale. Writers cannot make offers on \
        their own articles.",
    params(("id" = i32, Path, description = "Article ID")),
    request_body = PlaceOfferRequest,
    responses(
        (status = 201, description = "Offer placed", body = OfferResponse),
        (status = 400, description = "Validation error (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Own article (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Article not on sale (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, price = payload.price))]
pub async fn place_offer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<PlaceOfferRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_place_offer(&payload)?;

    let offer = OfferService::new(&state.db)
        .place(&auth_user, id, payload.price)
        .await?;

    Ok((StatusCode::CREATED, Json(OfferResponse::from(offer))))
}

#[utoipa::path(
    get,
    path = "/articles/{id}/offers",
    tag = "Trade",
    operation_id = "listOffers",
    summary = "List offers on an article",
    description = "The writer sees every offer; anyone else sees only their own. Oldest first.",
    params(("id" = i32, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Offers", body = Vec<OfferResponse>),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn list_offers(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<OfferResponse>>, AppError> {
    let offers = OfferService::new(&state.db)
        .list_for_article(&auth_user, id)
        .await?;
    Ok(Json(offers.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/offers/{id}",
    tag = "Trade",
    operation_id = "withdrawOffer",
    summary = "Withdraw an offer",
    description = "Deletes the caller's own offer. A selected offer cannot be withdrawn.",
    params(("id" = i32, Path, description = "Offer ID")),
    responses(
        (status = 204, description = "Offer withdrawn"),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Not the offerer, or offer selected (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Offer not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn withdraw_offer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    OfferService::new(&state.db).withdraw(&auth_user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/offers/{id}/select",
    tag = "Trade",
    operation_id = "selectOffer",
    summary = "Select the buyer",
    description = "Marks the offer as selected and moves its article from `SALE` to `RESERVED`. \
        Only the article's writer may select.",
    params(("id" = i32, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer selected", body = TradeStatusResponse),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Not the writer (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Offer not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Article not on sale (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn select_offer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TradeStatusResponse>, AppError> {
    let (article, offer) = OfferService::new(&state.db).select(&auth_user, id).await?;
    Ok(Json(TradeStatusResponse::new(article, Some(offer))))
}

#[utoipa::path(
    post,
    path = "/articles/{id}/complete",
    tag = "Trade",
    operation_id = "completeTrade",
    summary = "Complete the trade",
    description = "Moves a `RESERVED` article with its selected offer to `COMPLETE`.",
    params(("id" = i32, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Trade completed", body = TradeStatusResponse),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Not the writer (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Article not reserved (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn complete_trade(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TradeStatusResponse>, AppError> {
    let article = OfferService::new(&state.db).complete(&auth_user, id).await?;
    Ok(Json(TradeStatusResponse::new(article, None)))
}

#[utoipa::path(
    post,
    path = "/articles/{id}/unselect",
    tag = "Trade",
    operation_id = "unselectOffer",
    summary = "Release the selected buyer",
    description = "Clears the selection and moves a `RESERVED` article back to `SALE`. Offers are \
        kept. Refused once the trade has been reviewed.",
    params(("id" = i32, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Back on sale", body = TradeStatusResponse),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Not the writer (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Article not reserved, or reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn unselect_offer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TradeStatusResponse>, AppError> {
    let article = OfferService::new(&state.db).unselect(&auth_user, id).await?;
    Ok(Json(TradeStatusResponse::new(article, None)))
}

#[utoipa::path(
    post,
    path = "/articles/{id}/reopen",
    tag = "Trade",
    operation_id = "reopenTrade",
    summary = "Undo completion",
    description = "Moves a `COMPLETE` article back to `RESERVED`, keeping the selected offer. \
        Refused once the trade has been reviewed.",
    params(("id" = i32, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Reserved again", body = TradeStatusResponse),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Not the writer (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Article not complete, or reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn reopen_trade(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TradeStatusResponse>, AppError> {
    let article = OfferService::new(&state.db).reopen(&auth_user, id).await?;
    Ok(Json(TradeStatusResponse::new(article, None)))
}

#[utoipa::path(
    post,
    path = "/reviews",
    tag = "Trade",
    operation_id = "createReview",
    summary = "Review the other party of a trade",
    description = "The writer and the selected buyer of a `COMPLETE` article may each review the \
        other once. The score is added to the reviewee's totals.",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 400, description = "Validation error (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Not signed in (UNAUTHENTICATED)", body = ErrorBody),
        (status = 403, description = "Not a party of the trade (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Article not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Trade not complete, or already reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(article_id = payload.article_id))]
pub async fn create_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_review(&payload)?;

    let review = ReviewLedger::new(&state.db)
        .post(&auth_user, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}
