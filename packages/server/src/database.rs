use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{article, like_article, offer, product_image, review, user};

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    prepare_schema(&db).await?;

    Ok(db)
}

/// Create missing tables, then the secondary indexes.
pub async fn prepare_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("bidbuy_server::entity::*")
        .sync(db)
        .await?;
    ensure_indexes(db).await
}

/// SeaORM's schema-sync doesn't create composite or non-unique indexes,
/// so they are created here on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let indexes = [
        (
            "idx_article_writer",
            Index::create()
                .table(article::Entity)
                .col(article::Column::WriterId)
                .to_owned(),
        ),
        (
            "idx_like_article_article_user",
            Index::create()
                .table(like_article::Entity)
                .col(like_article::Column::ArticleId)
                .col(like_article::Column::UserId)
                .to_owned(),
        ),
        (
            "idx_offer_article",
            Index::create()
                .table(offer::Entity)
                .col(offer::Column::ArticleId)
                .to_owned(),
        ),
        (
            "idx_offer_offerer",
            Index::create()
                .table(offer::Entity)
                .col(offer::Column::OffererId)
                .to_owned(),
        ),
        (
            "idx_product_image_article",
            Index::create()
                .table(product_image::Entity)
                .col(product_image::Column::ArticleId)
                .to_owned(),
        ),
        (
            "uq_user_provider",
            Index::create()
                .unique()
                .table(user::Entity)
                .col(user::Column::Provider)
                .col(user::Column::ProviderId)
                .to_owned(),
        ),
        // One review per reviewer and article; racing duplicates fail here.
        (
            "uq_review_article_reviewer",
            Index::create()
                .unique()
                .table(review::Entity)
                .col(review::Column::ArticleId)
                .col(review::Column::ReviewerId)
                .to_owned(),
        ),
    ];

    for (name, mut stmt) in indexes {
        stmt.if_not_exists().name(name);
        let built = db.get_database_backend().build(&stmt);
        db.execute_raw(built).await?;
        info!("Ensured index {} exists", name);
    }

    Ok(())
}
