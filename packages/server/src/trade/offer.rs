use chrono::Utc;
use common::TradeStatus;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use super::has_reviews;
use crate::article::{find_article, find_article_for_update};
use crate::entity::{article, offer};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;

fn ensure_writer(target: &article::Model, principal: &AuthUser) -> Result<(), AppError> {
    if target.writer_id != principal.user_id {
        return Err(AppError::Forbidden(
            "Only the writer of the article can do this".into(),
        ));
    }
    Ok(())
}

/// Move `target` to `next`, refusing moves the state machine does not have.
async fn transition(
    txn: &DatabaseTransaction,
    target: article::Model,
    next: TradeStatus,
) -> Result<article::Model, AppError> {
    let current = target.trade_status;
    if !current.allows(next) {
        return Err(AppError::Conflict(format!(
            "Article is {current} and cannot become {next}"
        )));
    }
    let mut active: article::ActiveModel = target.into();
    active.trade_status = Set(next);
    active.modified_at = Set(Utc::now());
    Ok(active.update(txn).await?)
}

async fn clear_selection(txn: &DatabaseTransaction, article_id: i32) -> Result<(), AppError> {
    offer::Entity::update_many()
        .col_expr(offer::Column::IsSelected, Expr::value(false))
        .filter(offer::Column::ArticleId.eq(article_id))
        .exec(txn)
        .await?;
    Ok(())
}

async fn find_offer<C: ConnectionTrait>(conn: &C, id: i32) -> Result<offer::Model, AppError> {
    offer::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Offer not found".into()))
}

/// Lock the article an offer belongs to, then re-read the offer under that
/// lock. Offer rows only change while their article is locked, so the
/// returned offer cannot go stale before the transaction ends.
async fn lock_offer(
    txn: &DatabaseTransaction,
    offer_id: i32,
) -> Result<(article::Model, offer::Model), AppError> {
    let unlocked = find_offer(txn, offer_id).await?;
    let target = find_article_for_update(txn, unlocked.article_id).await?;
    let locked = find_offer(txn, offer_id).await?;
    Ok((target, locked))
}

/// Offers and the trade status transitions they drive.
pub struct OfferService<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait<Transaction = DatabaseTransaction>>
    OfferService<'a, C>
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Quote a price on an article that is on sale.
    pub async fn place(
        &self,
        principal: &AuthUser,
        article_id: i32,
        price: i64,
    ) -> Result<offer::Model, AppError> {
        if price < 0 {
            return Err(AppError::Validation("Price must be >= 0".into()));
        }

        let txn = self.conn.begin().await?;
        let target = find_article_for_update(&txn, article_id).await?;
        if target.writer_id == principal.user_id {
            return Err(AppError::Forbidden(
                "You cannot make an offer on your own article".into(),
            ));
        }
        if target.trade_status != TradeStatus::Sale {
            return Err(AppError::Conflict("Article is not on sale".into()));
        }

        let created = offer::ActiveModel {
            article_id: Set(article_id),
            offerer_id: Set(principal.user_id),
            price: Set(price),
            is_selected: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(offer_id = created.id, article_id, "Offer placed");
        Ok(created)
    }

    /// Delete the caller's own, unselected offer.
    pub async fn withdraw(&self, principal: &AuthUser, offer_id: i32) -> Result<(), AppError> {
        let txn = self.conn.begin().await?;
        let (_, target) = lock_offer(&txn, offer_id).await?;
        if target.offerer_id != principal.user_id {
            return Err(AppError::Forbidden(
                "Only the offerer can withdraw this offer".into(),
            ));
        }
        if target.is_selected {
            return Err(AppError::Forbidden(
                "A selected offer cannot be withdrawn".into(),
            ));
        }

        offer::Entity::delete_by_id(offer_id).exec(&txn).await?;
        txn.commit().await?;

        info!(offer_id, "Offer withdrawn");
        Ok(())
    }

    /// Choose the buyer: `SALE -> RESERVED`.
    ///
    /// Of two concurrent selections on one article, the second to take the
    /// lock finds it RESERVED and fails with a conflict.
    pub async fn select(
        &self,
        principal: &AuthUser,
        offer_id: i32,
    ) -> Result<(article::Model, offer::Model), AppError> {
        let txn = self.conn.begin().await?;
        let (target, chosen) = lock_offer(&txn, offer_id).await?;
        ensure_writer(&target, principal)?;
        if target.trade_status != TradeStatus::Sale {
            return Err(AppError::Conflict("Article is not on sale".into()));
        }

        let article_id = target.id;
        clear_selection(&txn, article_id).await?;
        let mut active: offer::ActiveModel = chosen.into();
        active.is_selected = Set(true);
        let chosen = active.update(&txn).await?;
        let target = transition(&txn, target, TradeStatus::Reserved).await?;

        txn.commit().await?;

        info!(offer_id, article_id, "Offer selected");
        Ok((target, chosen))
    }

    /// Settle the trade: `RESERVED -> COMPLETE`.
    pub async fn complete(
        &self,
        principal: &AuthUser,
        article_id: i32,
    ) -> Result<article::Model, AppError> {
        let txn = self.conn.begin().await?;
        let target = find_article_for_update(&txn, article_id).await?;
        ensure_writer(&target, principal)?;
        if target.trade_status != TradeStatus::Reserved {
            return Err(AppError::Conflict("Article is not reserved".into()));
        }

        let selected = offer::Entity::find()
            .filter(offer::Column::ArticleId.eq(article_id))
            .filter(offer::Column::IsSelected.eq(true))
            .count(&txn)
            .await?;
        if selected != 1 {
            return Err(AppError::Conflict(format!(
                "Expected exactly one selected offer, found {selected}"
            )));
        }

        let target = transition(&txn, target, TradeStatus::Complete).await?;
        txn.commit().await?;

        info!(article_id, "Trade completed");
        Ok(target)
    }

    /// Release the chosen buyer: `RESERVED -> SALE`, keeping every offer.
    pub async fn unselect(
        &self,
        principal: &AuthUser,
        article_id: i32,
    ) -> Result<article::Model, AppError> {
        let txn = self.conn.begin().await?;
        let target = find_article_for_update(&txn, article_id).await?;
        ensure_writer(&target, principal)?;
        if target.trade_status != TradeStatus::Reserved {
            return Err(AppError::Conflict("Article is not reserved".into()));
        }
        if has_reviews(&txn, article_id).await? {
            return Err(AppError::Conflict(
                "The trade has already been reviewed".into(),
            ));
        }

        clear_selection(&txn, article_id).await?;
        let target = transition(&txn, target, TradeStatus::Sale).await?;
        txn.commit().await?;

        info!(article_id, "Offer unselected");
        Ok(target)
    }

    /// Undo completion: `COMPLETE -> RESERVED`, keeping the selection.
    pub async fn reopen(
        &self,
        principal: &AuthUser,
        article_id: i32,
    ) -> Result<article::Model, AppError> {
        let txn = self.conn.begin().await?;
        let target = find_article_for_update(&txn, article_id).await?;
        ensure_writer(&target, principal)?;
        if target.trade_status != TradeStatus::Complete {
            return Err(AppError::Conflict("Article is not complete".into()));
        }
        if has_reviews(&txn, article_id).await? {
            return Err(AppError::Conflict(
                "The trade has already been reviewed".into(),
            ));
        }

        let target = transition(&txn, target, TradeStatus::Reserved).await?;
        txn.commit().await?;

        info!(article_id, "Trade reopened");
        Ok(target)
    }

    /// Offers on an article visible to the caller: all of them for the
    /// writer, the caller's own for anyone else. Oldest first.
    pub async fn list_for_article(
        &self,
        principal: &AuthUser,
        article_id: i32,
    ) -> Result<Vec<offer::Model>, AppError> {
        let target = find_article(self.conn, article_id).await?;

        let mut select = offer::Entity::find().filter(offer::Column::ArticleId.eq(article_id));
        if target.writer_id != principal.user_id {
            select = select.filter(offer::Column::OffererId.eq(principal.user_id));
        }

        Ok(select
            .order_by_asc(offer::Column::CreatedAt)
            .order_by_asc(offer::Column::Id)
            .all(self.conn)
            .await?)
    }
}
