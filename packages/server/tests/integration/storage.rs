use std::sync::atomic::{AtomicUsize, Ordering};

use ::common::UserRole;
use ::common::storage::{BlobStore, BoxReader, FilesystemBlobStore, ObjectKey, StorageError};
use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tempfile::TempDir;

use bidbuy_server::article::{ArticleChanges, ArticleService, ImageUpload, NewArticle};
use bidbuy_server::entity::{article, product_image};
use bidbuy_server::extractors::auth::AuthUser;
use bidbuy_server::session::{IdentityProfile, find_or_create_user};
use bidbuy_server::utils::filename::image_kind;

use crate::common::{count_files, fresh_database};

/// Filesystem store whose puts start failing after `allowed` successes.
struct FlakyBlobStore {
    inner: FilesystemBlobStore,
    allowed: usize,
    puts: AtomicUsize,
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn put(&self, key: &ObjectKey, data: &[u8], content_type: &str) -> Result<(), StorageError> {
        if self.puts.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(StorageError::Backend("injected failure".into()));
        }
        self.inner.put(key, data, content_type).await
    }

    async fn get_stream(&self, key: &ObjectKey) -> Result<BoxReader, StorageError> {
        self.inner.get_stream(key).await
    }

    async fn exists(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        self.inner.delete(key).await
    }

    fn public_base_url(&self) -> &str {
        self.inner.public_base_url()
    }
}

async fn flaky_store(dir: &TempDir, allowed: usize) -> FlakyBlobStore {
    FlakyBlobStore {
        inner: FilesystemBlobStore::new(dir.path().to_path_buf(), 1024 * 1024, "/api/images")
            .await
            .unwrap(),
        allowed,
        puts: AtomicUsize::new(0),
    }
}

async fn writer(db: &sea_orm::DatabaseConnection) -> AuthUser {
    let (user, _) = find_or_create_user(
        db,
        &IdentityProfile {
            provider: "google".into(),
            provider_id: "writer".into(),
            email: "writer@example.com".into(),
            name: "Writer".into(),
        },
    )
    .await
    .unwrap();
    AuthUser {
        user_id: user.id,
        username: user.username,
        role: UserRole::User,
    }
}

fn fields() -> NewArticle {
    NewArticle {
        title: "Bike".into(),
        content: "Barely used".into(),
        price: 10000,
        quantity: 1,
        category: "sports".into(),
        trade_method: "direct".into(),
        addr1: None,
        addr2: None,
    }
}

fn uploads(n: usize) -> Vec<ImageUpload> {
    (0..n)
        .map(|i| ImageUpload {
            kind: image_kind("photo.png").unwrap(),
            bytes: vec![i as u8; 16],
        })
        .collect()
}

#[tokio::test]
async fn failed_create_leaves_no_rows_or_blobs() {
    let (db, _) = fresh_database().await;
    let dir = TempDir::new().unwrap();
    let blobs = flaky_store(&dir, 2).await;
    let principal = writer(&db).await;

    let result = ArticleService::new(&db, &blobs)
        .create(&principal, fields(), uploads(3))
        .await;

    assert!(result.is_err());
    assert_eq!(article::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(product_image::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(count_files(&dir.path().join("articles")), 0);
}

#[tokio::test]
async fn failed_image_replacement_keeps_the_old_state() {
    let (db, _) = fresh_database().await;
    let dir = TempDir::new().unwrap();
    let blobs = flaky_store(&dir, 2).await;
    let principal = writer(&db).await;
    let service = ArticleService::new(&db, &blobs);

    let created = service
        .create(&principal, fields(), uploads(2))
        .await
        .unwrap();
    let id = created.article.id;

    let result = service
        .update(
            &principal,
            id,
            ArticleChanges {
                price: Some(1),
                ..Default::default()
            },
            uploads(1),
        )
        .await;

    assert!(result.is_err());
    let stored = article::Entity::find_by_id(id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.price, 10000);
    let rows = product_image::Entity::find()
        .filter(product_image::Column::ArticleId.eq(id))
        .order_by_asc(product_image::Column::Id)
        .all(&db)
        .await
        .unwrap();
    let urls: Vec<_> = rows.into_iter().map(|r| r.url).collect();
    let before: Vec<_> = created.images.into_iter().map(|r| r.url).collect();
    assert_eq!(urls, before);
    assert_eq!(count_files(&dir.path().join("articles")), 2);
}

#[tokio::test]
async fn schema_preparation_is_idempotent() {
    let (db, _) = fresh_database().await;

    bidbuy_server::database::prepare_schema(&db).await.unwrap();
    bidbuy_server::database::prepare_schema(&db).await.unwrap();
}
