//! # ContentObjectRepository
//!
//! 共有対象オブジェクトの解決を担当するリポジトリ。
//!
//! ホストアプリケーションは共有可能なオブジェクトを `shareable_objects`
//! カタログに登録する。カタログに存在しないオブジェクトは共有できない。

use async_trait::async_trait;
use emailshare_domain::content::{ContentObject, ContentType, ObjectId};
use sqlx::PgPool;

use crate::error::InfraError;

/// 共有対象オブジェクトリポジトリトレイト
#[async_trait]
pub trait ContentObjectRepository: Send + Sync {
    /// 種別とオブジェクト ID で共有対象を検索
    async fn find(
        &self,
        content_type: &ContentType,
        object_id: ObjectId,
    ) -> Result<Option<ContentObject>, InfraError>;
}

#[derive(Debug, sqlx::FromRow)]
struct ShareableObjectRow {
    object_id: i64,
    title:     String,
    url:       Option<String>,
}

/// PostgreSQL 実装の ContentObjectRepository
#[derive(Debug, Clone)]
pub struct PostgresContentObjectRepository {
    pool: PgPool,
}

impl PostgresContentObjectRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentObjectRepository for PostgresContentObjectRepository {
    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(content_type_id = %content_type.id(), %object_id)
    )]
    async fn find(
        &self,
        content_type: &ContentType,
        object_id: ObjectId,
    ) -> Result<Option<ContentObject>, InfraError> {
        let row = sqlx::query_as::<_, ShareableObjectRow>(
            r#"
            SELECT object_id, title, url
            FROM shareable_objects
            WHERE content_type_id = $1 AND object_id = $2
            "#,
        )
        .bind(content_type.id().as_i64())
        .bind(object_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            ContentObject::new(
                content_type.clone(),
                ObjectId::new(row.object_id),
                row.title,
                row.url,
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresContentObjectRepository>();
    }
}
