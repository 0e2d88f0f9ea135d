//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するシードデータ投入ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use emailshare_domain::{
    content::{ContentTypeId, ObjectId},
    email::Email,
    share_email::{NewShareEmail, SubmissionId},
};
use sqlx::PgPool;

/// コンテンツタイプを登録し、採番された ID を返す
pub async fn insert_content_type(pool: &PgPool, namespace: &str, type_name: &str) -> ContentTypeId {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO content_types (namespace, type_name) VALUES ($1, $2) RETURNING id",
    )
    .bind(namespace)
    .bind(type_name)
    .fetch_one(pool)
    .await
    .expect("コンテンツタイプ作成に失敗");
    ContentTypeId::new(id)
}

/// 共有対象オブジェクトを登録する
pub async fn insert_shareable_object(
    pool: &PgPool,
    content_type_id: ContentTypeId,
    object_id: i64,
    title: &str,
    url: Option<&str>,
) -> ObjectId {
    sqlx::query(
        "INSERT INTO shareable_objects (content_type_id, object_id, title, url) VALUES ($1, $2, $3, $4)",
    )
    .bind(content_type_id.as_i64())
    .bind(object_id)
    .bind(title)
    .bind(url)
    .execute(pool)
    .await
    .expect("共有対象オブジェクト作成に失敗");
    ObjectId::new(object_id)
}

pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// 共有記録の挿入データを作成する
pub fn new_share_email(
    submission_id: &SubmissionId,
    content_type_id: ContentTypeId,
    object_id: ObjectId,
    recipient: &str,
) -> NewShareEmail {
    NewShareEmail {
        submission_id: submission_id.clone(),
        content_type_id,
        object_id,
        sender_email: Email::new("sender@example.com").unwrap(),
        recipient_email: Email::new(recipient).unwrap(),
        message: "Message from the sender!".to_string(),
        ip_address: Some("127.0.0.1".parse().unwrap()),
        created_at: fixed_now(),
    }
}
