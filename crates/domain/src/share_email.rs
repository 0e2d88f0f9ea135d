//! # 共有記録
//!
//! 「誰が・誰に・何を」共有したかを記録するエンティティ。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`ShareEmail`] | 共有記録 | 宛先 1 件ごとに 1 レコード |
//! | [`SubmissionId`] | 送信単位 | 1 回のフォーム送信で作成された共有記録の束 |
//!
//! ## 設計方針
//!
//! - **宛先ごとのレコード**: 複数宛先の送信は宛先の数だけ共有記録を作り、
//!   同じ [`SubmissionId`] で束ねる
//! - **確認 URL**: [`ShareEmail::confirmation_path`] が正規の URL を返し、
//!   リクエストされた URL との完全一致で照合する

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    confirmation::confirmation_hash,
    content::{ContentTypeId, ObjectId},
    email::Email,
};

define_i64_id! {
    /// 共有記録 ID
    ///
    /// `share_emails` テーブルの主キー（BIGSERIAL）。確認 URL に含まれる。
    pub struct ShareEmailId;
}

define_uuid_id! {
    /// 送信単位 ID
    ///
    /// 1 回のフォーム送信で作成された共有記録が共有する。UUID v7 を使用。
    pub struct SubmissionId;
}

/// 共有記録の作成パラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShareEmail {
    pub submission_id:   SubmissionId,
    pub content_type_id: ContentTypeId,
    pub object_id:       ObjectId,
    pub sender_email:    Email,
    pub recipient_email: Email,
    pub message:         String,
    pub ip_address:      Option<IpAddr>,
    pub created_at:      DateTime<Utc>,
}

/// 共有記録エンティティ
///
/// ID は永続化時に採番されるため、[`NewShareEmail`] の保存結果としてのみ生成される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareEmail {
    id:              ShareEmailId,
    submission_id:   SubmissionId,
    content_type_id: ContentTypeId,
    object_id:       ObjectId,
    sender_email:    Email,
    recipient_email: Email,
    message:         String,
    ip_address:      Option<IpAddr>,
    created_at:      DateTime<Utc>,
}

impl ShareEmail {
    /// 採番済み ID と作成パラメータから共有記録を組み立てる
    pub fn from_new(id: ShareEmailId, new: NewShareEmail) -> Self {
        Self {
            id,
            submission_id: new.submission_id,
            content_type_id: new.content_type_id,
            object_id: new.object_id,
            sender_email: new.sender_email,
            recipient_email: new.recipient_email,
            message: new.message,
            ip_address: new.ip_address,
            created_at: new.created_at,
        }
    }

    pub fn id(&self) -> ShareEmailId {
        self.id
    }

    pub fn submission_id(&self) -> &SubmissionId {
        &self.submission_id
    }

    pub fn content_type_id(&self) -> ContentTypeId {
        self.content_type_id
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn sender_email(&self) -> &Email {
        &self.sender_email
    }

    pub fn recipient_email(&self) -> &Email {
        &self.recipient_email
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn ip_address(&self) -> Option<IpAddr> {
        self.ip_address
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 確認ハッシュ
    pub fn confirmation_hash(&self, secret: &str) -> u64 {
        confirmation_hash(
            self.sender_email.as_str(),
            self.recipient_email.as_str(),
            &self.message,
            secret,
        )
    }

    /// 送信完了ページの正規パス（`/sent/{id}/{hash}/`）
    pub fn confirmation_path(&self, secret: &str) -> String {
        format!("/sent/{}/{}/", self.id, self.confirmation_hash(secret))
    }

    /// リクエストされたパスセグメントが正規パスと一致するか
    ///
    /// 数値として等しくても表記が異なる（先頭ゼロなど）場合は一致しない。
    pub fn matches_confirmation(&self, raw_id: &str, raw_hash: &str, secret: &str) -> bool {
        raw_id == self.id.to_string() && raw_hash == self.confirmation_hash(secret).to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    const SECRET: &str = "test-secret";

    #[fixture]
    fn share_email() -> ShareEmail {
        ShareEmail::from_new(
            ShareEmailId::new(15),
            NewShareEmail {
                submission_id:   SubmissionId::new(),
                content_type_id: ContentTypeId::new(1),
                object_id:       ObjectId::new(2),
                sender_email:    Email::new("sender@example.com").unwrap(),
                recipient_email: Email::new("recipient@example.com").unwrap(),
                message:         "Message from the sender!".to_string(),
                ip_address:      Some("127.0.0.1".parse().unwrap()),
                created_at:      DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            },
        )
    }

    #[rstest]
    fn test_確認パスはidとハッシュを含む(share_email: ShareEmail) {
        let hash = share_email.confirmation_hash(SECRET);

        assert_eq!(
            share_email.confirmation_path(SECRET),
            format!("/sent/15/{hash}/")
        );
    }

    #[rstest]
    fn test_正規のセグメントは一致する(share_email: ShareEmail) {
        let hash = share_email.confirmation_hash(SECRET).to_string();

        assert!(share_email.matches_confirmation("15", &hash, SECRET));
    }

    #[rstest]
    #[case("15", "0")]
    #[case("015", "")]
    #[case("16", "")]
    fn test_正規でないセグメントは一致しない(
        share_email: ShareEmail,
        #[case] raw_id: &str,
        #[case] raw_hash: &str,
    ) {
        let raw_hash = if raw_hash.is_empty() {
            share_email.confirmation_hash(SECRET).to_string()
        } else {
            raw_hash.to_string()
        };

        assert!(!share_email.matches_confirmation(raw_id, &raw_hash, SECRET));
    }

    #[rstest]
    fn test_シークレットが異なると一致しない(share_email: ShareEmail) {
        let hash = share_email.confirmation_hash(SECRET).to_string();

        assert!(!share_email.matches_confirmation("15", &hash, "leaked-guess"));
    }
}
