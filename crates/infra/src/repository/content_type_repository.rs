//! # ContentTypeRepository
//!
//! 共有対象の種別（名前空間 + 種別名）の取得を担当するリポジトリ。
//!
//! 種別の登録はホストアプリケーションの責務で、このサービスは読み取りのみ行う。

use async_trait::async_trait;
use emailshare_domain::content::{ContentType, ContentTypeId};
use sqlx::PgPool;

use crate::error::InfraError;

/// コンテンツ種別リポジトリトレイト
#[async_trait]
pub trait ContentTypeRepository: Send + Sync {
    /// ID でコンテンツ種別を検索
    async fn find_by_id(&self, id: ContentTypeId) -> Result<Option<ContentType>, InfraError>;
}

#[derive(Debug, sqlx::FromRow)]
struct ContentTypeRow {
    id:        i64,
    namespace: String,
    type_name: String,
}

impl From<ContentTypeRow> for ContentType {
    fn from(row: ContentTypeRow) -> Self {
        ContentType::new(ContentTypeId::new(row.id), row.namespace, row.type_name)
    }
}

/// PostgreSQL 実装の ContentTypeRepository
#[derive(Debug, Clone)]
pub struct PostgresContentTypeRepository {
    pool: PgPool,
}

impl PostgresContentTypeRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentTypeRepository for PostgresContentTypeRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: ContentTypeId) -> Result<Option<ContentType>, InfraError> {
        let row = sqlx::query_as::<_, ContentTypeRow>(
            r#"
            SELECT id, namespace, type_name
            FROM content_types
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ContentType::from))
    }
}
