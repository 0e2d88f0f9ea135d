//! # テスト用モック
//!
//! ユースケーステスト・HTTP テストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! emailshare-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use emailshare_domain::{
    content::{ContentObject, ContentType, ContentTypeId, ObjectId},
    notification::{EmailMessage, NotificationError},
    share_email::{NewShareEmail, ShareEmail, ShareEmailId, SubmissionId},
};

use crate::{
    db::{TransactionManager, TxContext},
    error::InfraError,
    notification::NotificationSender,
    repository::{ContentObjectRepository, ContentTypeRepository, ShareEmailRepository},
};

// ===== MockContentTypeRepository =====

#[derive(Clone, Default)]
pub struct MockContentTypeRepository {
    content_types: Arc<Mutex<Vec<ContentType>>>,
}

impl MockContentTypeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, content_type: ContentType) {
        self.content_types.lock().unwrap().push(content_type);
    }
}

#[async_trait]
impl ContentTypeRepository for MockContentTypeRepository {
    async fn find_by_id(&self, id: ContentTypeId) -> Result<Option<ContentType>, InfraError> {
        Ok(self
            .content_types
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }
}

// ===== MockContentObjectRepository =====

#[derive(Clone, Default)]
pub struct MockContentObjectRepository {
    objects: Arc<Mutex<Vec<ContentObject>>>,
}

impl MockContentObjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, object: ContentObject) {
        self.objects.lock().unwrap().push(object);
    }
}

#[async_trait]
impl ContentObjectRepository for MockContentObjectRepository {
    async fn find(
        &self,
        content_type: &ContentType,
        object_id: ObjectId,
    ) -> Result<Option<ContentObject>, InfraError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.content_type().id() == content_type.id() && o.object_id() == object_id)
            .cloned())
    }
}

// ===== MockShareEmailRepository =====

/// ID を 1 から順に採番するインメモリ共有記録リポジトリ
#[derive(Clone, Default)]
pub struct MockShareEmailRepository {
    share_emails: Arc<Mutex<Vec<ShareEmail>>>,
}

impl MockShareEmailRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みの共有記録（挿入順）
    pub fn share_emails(&self) -> Vec<ShareEmail> {
        self.share_emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShareEmailRepository for MockShareEmailRepository {
    async fn insert(
        &self,
        _tx: &mut TxContext,
        share_email: &NewShareEmail,
    ) -> Result<ShareEmail, InfraError> {
        let mut share_emails = self.share_emails.lock().unwrap();
        let id = ShareEmailId::new(share_emails.len() as i64 + 1);
        let saved = ShareEmail::from_new(id, share_email.clone());
        share_emails.push(saved.clone());
        Ok(saved)
    }

    async fn find_by_id(&self, id: ShareEmailId) -> Result<Option<ShareEmail>, InfraError> {
        Ok(self
            .share_emails
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id() == id)
            .cloned())
    }

    async fn find_by_submission(
        &self,
        submission_id: &SubmissionId,
    ) -> Result<Vec<ShareEmail>, InfraError> {
        Ok(self
            .share_emails
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.submission_id() == submission_id)
            .cloned()
            .collect())
    }
}

// ===== MockNotificationSender =====

/// 送信されたメールを記録するモック
///
/// `failing_for` で指定した宛先への送信は `SendFailed` を返す。
/// 失敗した送信も `sent_emails` には記録される。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent_emails:       Arc<Mutex<Vec<EmailMessage>>>,
    failing_addresses: Arc<HashSet<String>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sent_emails:       Arc::default(),
            failing_addresses: Arc::new(addresses.into_iter().map(Into::into).collect()),
        }
    }

    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent_emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        self.sent_emails.lock().unwrap().push(email.clone());
        if self.failing_addresses.contains(&email.to) {
            return Err(NotificationError::SendFailed(format!(
                "モック送信失敗: {}",
                email.to
            )));
        }
        Ok(())
    }
}

// ===== MockTransactionManager =====

pub struct MockTransactionManager;

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}
