//! # ShareEmailRepository
//!
//! 共有記録の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **書き込みはトランザクション内**: 1 回の送信で作られる共有記録は
//!   [`TxContext`] 経由でまとめてコミットする
//! - **ID は DB 採番**: `BIGSERIAL` の値を `RETURNING` で受け取る
//! - **IP アドレスは文字列で保存**: 復元時にパースし、不正値はデータ不整合とする

use std::net::IpAddr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emailshare_domain::{
    content::{ContentTypeId, ObjectId},
    email::Email,
    share_email::{NewShareEmail, ShareEmail, ShareEmailId, SubmissionId},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{db::TxContext, error::InfraError};

/// 共有記録リポジトリトレイト
#[async_trait]
pub trait ShareEmailRepository: Send + Sync {
    /// 共有記録を挿入し、採番済みの共有記録を返す
    async fn insert(
        &self,
        tx: &mut TxContext,
        share_email: &NewShareEmail,
    ) -> Result<ShareEmail, InfraError>;

    /// ID で共有記録を検索
    async fn find_by_id(&self, id: ShareEmailId) -> Result<Option<ShareEmail>, InfraError>;

    /// 同じ送信単位の共有記録を ID 順に取得
    async fn find_by_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<ShareEmail>, InfraError>;
}

#[derive(Debug, sqlx::FromRow)]
struct ShareEmailRow {
    id:              i64,
    submission_id:   Uuid,
    content_type_id: i64,
    object_id:       i64,
    sender_email:    String,
    recipient_email: String,
    message:         String,
    ip_address:      Option<String>,
    created_at:      DateTime<Utc>,
}

impl TryFrom<ShareEmailRow> for ShareEmail {
    type Error = InfraError;

    fn try_from(row: ShareEmailRow) -> Result<Self, Self::Error> {
        let ip_address = row
            .ip_address
            .map(|raw| {
                raw.parse::<IpAddr>().map_err(|e| {
                    InfraError::invalid_data(format!(
                        "share_emails.ip_address が不正です（id={}）: {e}",
                        row.id
                    ))
                })
            })
            .transpose()?;

        Ok(ShareEmail::from_new(
            ShareEmailId::new(row.id),
            NewShareEmail {
                submission_id: SubmissionId::from_uuid(row.submission_id),
                content_type_id: ContentTypeId::new(row.content_type_id),
                object_id: ObjectId::new(row.object_id),
                sender_email: Email::from_db(row.sender_email),
                recipient_email: Email::from_db(row.recipient_email),
                message: row.message,
                ip_address,
                created_at: row.created_at,
            },
        ))
    }
}

/// PostgreSQL 実装の ShareEmailRepository
#[derive(Debug, Clone)]
pub struct PostgresShareEmailRepository {
    pool: PgPool,
}

impl PostgresShareEmailRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareEmailRepository for PostgresShareEmailRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(submission_id = %share_email.submission_id))]
    async fn insert(
        &self,
        tx: &mut TxContext,
        share_email: &NewShareEmail,
    ) -> Result<ShareEmail, InfraError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO share_emails (
                submission_id, content_type_id, object_id,
                sender_email, recipient_email, message,
                ip_address, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(share_email.submission_id.as_uuid())
        .bind(share_email.content_type_id.as_i64())
        .bind(share_email.object_id.as_i64())
        .bind(share_email.sender_email.as_str())
        .bind(share_email.recipient_email.as_str())
        .bind(&share_email.message)
        .bind(share_email.ip_address.map(|ip| ip.to_string()))
        .bind(share_email.created_at)
        .fetch_one(tx.conn()?)
        .await?;

        Ok(ShareEmail::from_new(
            ShareEmailId::new(id),
            share_email.clone(),
        ))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: ShareEmailId) -> Result<Option<ShareEmail>, InfraError> {
        let row = sqlx::query_as::<_, ShareEmailRow>(
            r#"
            SELECT
                id, submission_id, content_type_id, object_id,
                sender_email, recipient_email, message,
                ip_address, created_at
            FROM share_emails
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ShareEmail::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%submission_id))]
    async fn find_by_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<ShareEmail>, InfraError> {
        let rows = sqlx::query_as::<_, ShareEmailRow>(
            r#"
            SELECT
                id, submission_id, content_type_id, object_id,
                sender_email, recipient_email, message,
                ip_address, created_at
            FROM share_emails
            WHERE submission_id = $1
            ORDER BY id
            "#,
        )
        .bind(submission_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ShareEmail::try_from).collect()
    }
}
