//! # 共有ユースケース
//!
//! 共有対象の解決、共有記録の保存、メール送信、送信完了ページの照合を担当する。
//!
//! ## 送信の流れ
//!
//! 1. トランザクション内で宛先ごとの共有記録を保存し、コミットする
//! 2. 共有記録ごとにテンプレートからメールを組み立てて送信する
//! 3. 送信結果をビジネスイベントとして記録する
//!
//! 送信に失敗しても共有記録は残る。再送は行わず、すべての宛先への送信を
//! 試みた後に最初のエラーを返す。

use std::{net::IpAddr, sync::Arc};

use emailshare_domain::{
    clock::Clock,
    content::{ContentObject, ContentTypeId, ObjectId},
    form::ValidShareRequest,
    notification::NotificationError,
    share_email::{ShareEmail, ShareEmailId, SubmissionId},
};
use emailshare_infra::{
    db::TransactionManager,
    notification::NotificationSender,
    repository::{ContentObjectRepository, ContentTypeRepository, ShareEmailRepository},
};
use emailshare_shared::{event_log::event, log_business_event};

use crate::{error::ShareError, usecase::template_renderer::TemplateRenderer};

/// 共有ユースケースが使うリポジトリ群
pub struct ShareRepositories {
    pub content_types:   Arc<dyn ContentTypeRepository>,
    pub content_objects: Arc<dyn ContentObjectRepository>,
    pub share_emails:    Arc<dyn ShareEmailRepository>,
    pub tx_manager:      Arc<dyn TransactionManager>,
}

/// 送信完了ページの表示内容
#[derive(Debug, Clone)]
pub struct SentShare {
    /// URL で指定された共有記録
    pub share_email:    ShareEmail,
    pub content_object: ContentObject,
    /// 同じ送信で作成された共有記録（ID 順）
    pub submission:     Vec<ShareEmail>,
}

pub struct ShareUseCaseImpl {
    repositories: ShareRepositories,
    sender:       Arc<dyn NotificationSender>,
    renderer:     Arc<TemplateRenderer>,
    clock:        Arc<dyn Clock>,
    secret_key:   String,
}

impl ShareUseCaseImpl {
    pub fn new(
        repositories: ShareRepositories,
        sender: Arc<dyn NotificationSender>,
        renderer: Arc<TemplateRenderer>,
        clock: Arc<dyn Clock>,
        secret_key: String,
    ) -> Self {
        Self {
            repositories,
            sender,
            renderer,
            clock,
            secret_key,
        }
    }

    /// パスセグメントから共有対象を解決する
    ///
    /// 数値でない ID、未登録の種別、存在しないオブジェクトはいずれも `NotFound`。
    pub async fn load_content_object(
        &self,
        raw_content_type_id: &str,
        raw_object_id: &str,
    ) -> Result<ContentObject, ShareError> {
        let (Some(content_type_id), Some(object_id)) = (
            ContentTypeId::parse_path(raw_content_type_id),
            ObjectId::parse_path(raw_object_id),
        ) else {
            return Err(ShareError::not_found(format!(
                "共有対象 /{raw_content_type_id}/{raw_object_id}/"
            )));
        };

        self.find_content_object(content_type_id, object_id).await
    }

    async fn find_content_object(
        &self,
        content_type_id: ContentTypeId,
        object_id: ObjectId,
    ) -> Result<ContentObject, ShareError> {
        let content_type = self
            .repositories
            .content_types
            .find_by_id(content_type_id)
            .await?
            .ok_or_else(|| ShareError::not_found(format!("content_type {content_type_id}")))?;

        self.repositories
            .content_objects
            .find(&content_type, object_id)
            .await?
            .ok_or_else(|| {
                ShareError::not_found(format!("object {object_id} (content_type {content_type_id})"))
            })
    }

    /// 共有記録を保存し、宛先ごとにメールを送信する
    ///
    /// 戻り値は宛先の入力順に並んだ共有記録。
    pub async fn share(
        &self,
        content_object: &ContentObject,
        request: ValidShareRequest,
        ip_address: Option<IpAddr>,
    ) -> Result<Vec<ShareEmail>, ShareError> {
        let submission_id = SubmissionId::new();
        let new_share_emails = request.into_new_share_emails(
            content_object,
            &submission_id,
            ip_address,
            self.clock.now(),
        );

        let mut tx = self.repositories.tx_manager.begin().await?;
        let mut share_emails = Vec::with_capacity(new_share_emails.len());
        for new_share_email in &new_share_emails {
            share_emails.push(
                self.repositories
                    .share_emails
                    .insert(&mut tx, new_share_email)
                    .await?,
            );
        }
        tx.commit().await?;

        log_business_event!(
            event.category = event::category::SHARE,
            event.action = event::action::SHARE_CREATED,
            event.entity_type = event::entity_type::SUBMISSION,
            event.entity_id = %submission_id,
            event.recipient_count = share_emails.len(),
            event.result = event::result::SUCCESS,
            "共有記録を保存"
        );

        let mut first_error = None;
        for share_email in &share_emails {
            let result = self.send(content_object, share_email).await;
            first_error = first_error.or(result.err());
        }

        match first_error {
            Some(e) => Err(ShareError::Notification(e)),
            None => Ok(share_emails),
        }
    }

    async fn send(
        &self,
        content_object: &ContentObject,
        share_email: &ShareEmail,
    ) -> Result<(), NotificationError> {
        let result = async {
            let email = self.renderer.render_email(
                content_object,
                share_email,
                &self.confirmation_url(share_email),
            )?;
            self.sender.send_email(&email).await
        }
        .await;

        match &result {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::SHARE,
                    event.action = event::action::SHARE_EMAIL_SENT,
                    event.entity_type = event::entity_type::SHARE_EMAIL,
                    event.entity_id = %share_email.id(),
                    event.result = event::result::SUCCESS,
                    "共有メールを送信"
                );
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::SHARE,
                    event.action = event::action::SHARE_EMAIL_FAILED,
                    event.entity_type = event::entity_type::SHARE_EMAIL,
                    event.entity_id = %share_email.id(),
                    event.result = event::result::FAILURE,
                    error = %e,
                    "共有メールの送信に失敗"
                );
            }
        }

        result
    }

    /// 送信完了ページの内容を取得する
    ///
    /// ID が存在しない、またはパスが共有記録の正規パスと一致しない場合は `NotFound`。
    pub async fn find_sent(&self, raw_id: &str, raw_hash: &str) -> Result<SentShare, ShareError> {
        let not_found = || ShareError::not_found(format!("送信完了ページ /sent/{raw_id}/{raw_hash}/"));

        let id = ShareEmailId::parse_path(raw_id).ok_or_else(not_found)?;
        let share_email = self
            .repositories
            .share_emails
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)?;
        if !share_email.matches_confirmation(raw_id, raw_hash, &self.secret_key) {
            return Err(not_found());
        }

        let content_object = self
            .find_content_object(share_email.content_type_id(), share_email.object_id())
            .await?;
        let submission = self
            .repositories
            .share_emails
            .find_by_submission(share_email.submission_id())
            .await?;

        Ok(SentShare {
            share_email,
            content_object,
            submission,
        })
    }

    /// 送信完了ページのパス
    pub fn confirmation_path(&self, share_email: &ShareEmail) -> String {
        share_email.confirmation_path(&self.secret_key)
    }

    /// 送信完了ページの絶対 URL（メール本文用）
    pub fn confirmation_url(&self, share_email: &ShareEmail) -> String {
        format!(
            "{}{}",
            self.renderer.site().base_url,
            self.confirmation_path(share_email)
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use emailshare_domain::{
        clock::FixedClock,
        content::ContentType,
        form::{ShareEmailForm, ShareEmailFormData},
    };
    use emailshare_infra::mock::{
        MockContentObjectRepository,
        MockContentTypeRepository,
        MockNotificationSender,
        MockShareEmailRepository,
        MockTransactionManager,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::usecase::template_renderer::SiteContext;

    const SECRET: &str = "test-secret";

    struct Setup {
        sut:          ShareUseCaseImpl,
        share_emails: MockShareEmailRepository,
        sender:       MockNotificationSender,
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn content_object() -> ContentObject {
        ContentObject::new(
            ContentType::new(ContentTypeId::new(3), "blog", "entry"),
            ObjectId::new(15),
            "最初の記事",
            None,
        )
    }

    fn setup_with(sender: MockNotificationSender, templates: &[(&str, &str)]) -> Setup {
        let content_types = MockContentTypeRepository::new();
        content_types.add(content_object().content_type().clone());
        let content_objects = MockContentObjectRepository::new();
        content_objects.add(content_object());
        let share_emails = MockShareEmailRepository::new();

        let renderer = TemplateRenderer::from_raw(
            templates.iter().copied(),
            SiteContext {
                site_name: "EmailShare".to_string(),
                base_url:  "http://share.example.com".to_string(),
            },
        )
        .unwrap();

        let sut = ShareUseCaseImpl::new(
            ShareRepositories {
                content_types:   Arc::new(content_types),
                content_objects: Arc::new(content_objects),
                share_emails:    Arc::new(share_emails.clone()),
                tx_manager:      Arc::new(MockTransactionManager),
            },
            Arc::new(sender.clone()),
            Arc::new(renderer),
            Arc::new(FixedClock::new(now())),
            SECRET.to_string(),
        );

        Setup {
            sut,
            share_emails,
            sender,
        }
    }

    fn setup() -> Setup {
        setup_with(
            MockNotificationSender::new(),
            &[
                ("email_share/subject.txt", "{{ content_object.title }}"),
                ("email_share/body.txt", "{{ message }} {{ confirmation_url }}"),
            ],
        )
    }

    fn request(recipients: &str) -> ValidShareRequest {
        ShareEmailForm::multiple()
            .validate(&ShareEmailFormData {
                sender_email:    "sender@example.com".to_string(),
                recipient_email: recipients.to_string(),
                message:         "Message from the sender!".to_string(),
            })
            .unwrap()
    }

    #[tokio::test]
    async fn 共有対象をパスセグメントから解決できる() {
        let setup = setup();

        let object = setup.sut.load_content_object("3", "15").await.unwrap();

        assert_eq!(object, content_object());
    }

    #[rstest]
    #[case("abc", "15")]
    #[case("3", "1x")]
    #[case("99", "15")]
    #[case("3", "99")]
    #[tokio::test]
    async fn 解決できない共有対象はnot_found(#[case] ct: &str, #[case] obj: &str) {
        let setup = setup();

        let result = setup.sut.load_content_object(ct, obj).await;

        assert!(matches!(result, Err(ShareError::NotFound(_))));
    }

    #[tokio::test]
    async fn 宛先ごとに共有記録を保存してメールを送る() {
        let setup = setup();

        let share_emails = setup
            .sut
            .share(
                &content_object(),
                request("recipient@example.com\nrecipient2@example.com, recipient3@example.com"),
                Some("192.0.2.1".parse().unwrap()),
            )
            .await
            .unwrap();

        let recipients: Vec<&str> = share_emails
            .iter()
            .map(|s| s.recipient_email().as_str())
            .collect();
        assert_eq!(
            recipients,
            vec![
                "recipient@example.com",
                "recipient2@example.com",
                "recipient3@example.com"
            ]
        );
        assert!(
            share_emails
                .iter()
                .all(|s| s.submission_id() == share_emails[0].submission_id())
        );
        assert!(share_emails.iter().all(|s| s.created_at() == now()));
        assert!(
            share_emails
                .iter()
                .all(|s| s.ip_address() == Some("192.0.2.1".parse().unwrap()))
        );
        assert_eq!(setup.share_emails.share_emails(), share_emails);

        let sent = setup.sender.sent_emails();
        let sent_to: Vec<&str> = sent.iter().map(|e| e.to.as_str()).collect();
        assert_eq!(sent_to, recipients);
        assert!(sent.iter().all(|e| e.reply_to.as_deref() == Some("sender@example.com")));
        assert_eq!(sent[0].subject, "最初の記事");
    }

    #[tokio::test]
    async fn メール本文に絶対urlの確認urlが入る() {
        let setup = setup();

        let share_emails = setup
            .sut
            .share(&content_object(), request("recipient@example.com"), None)
            .await
            .unwrap();

        let expected_url = format!(
            "http://share.example.com{}",
            share_emails[0].confirmation_path(SECRET)
        );
        assert_eq!(
            setup.sender.sent_emails()[0].text_body,
            format!("Message from the sender! {expected_url}")
        );
    }

    #[tokio::test]
    async fn 送信失敗でも全宛先に送信を試みて記録は残る() {
        let setup = setup_with(
            MockNotificationSender::failing_for(["bad@example.com"]),
            &[
                ("email_share/subject.txt", "件名"),
                ("email_share/body.txt", "本文"),
            ],
        );

        let result = setup
            .sut
            .share(
                &content_object(),
                request("bad@example.com good@example.com"),
                None,
            )
            .await;

        assert!(matches!(
            result,
            Err(ShareError::Notification(NotificationError::SendFailed(_)))
        ));
        assert_eq!(setup.sender.sent_emails().len(), 2);
        assert_eq!(setup.share_emails.share_emails().len(), 2);
    }

    #[tokio::test]
    async fn テンプレートがなければ送信せずにエラーを返す() {
        let setup = setup_with(MockNotificationSender::new(), &[("email_share/body.txt", "本文")]);

        let result = setup
            .sut
            .share(&content_object(), request("recipient@example.com"), None)
            .await;

        assert!(matches!(
            result,
            Err(ShareError::Notification(NotificationError::TemplateNotFound(_)))
        ));
        assert!(setup.sender.sent_emails().is_empty());
        assert_eq!(setup.share_emails.share_emails().len(), 1);
    }

    #[tokio::test]
    async fn 正しい確認パスで送信完了ページの内容を取得できる() {
        let setup = setup();
        let share_emails = setup
            .sut
            .share(&content_object(), request("a@example.com b@example.com"), None)
            .await
            .unwrap();
        let second = &share_emails[1];

        let sent = setup
            .sut
            .find_sent(
                &second.id().to_string(),
                &second.confirmation_hash(SECRET).to_string(),
            )
            .await
            .unwrap();

        assert_eq!(&sent.share_email, second);
        assert_eq!(sent.content_object, content_object());
        assert_eq!(sent.submission, share_emails);
    }

    #[tokio::test]
    async fn 確認ハッシュが一致しなければnot_found() {
        let setup = setup();
        let share_emails = setup
            .sut
            .share(&content_object(), request("a@example.com"), None)
            .await
            .unwrap();
        let hash = share_emails[0].confirmation_hash(SECRET);

        for (raw_id, raw_hash) in [
            ("1".to_string(), hash.wrapping_add(1).to_string()),
            ("01".to_string(), hash.to_string()),
            ("2".to_string(), hash.to_string()),
            ("x".to_string(), hash.to_string()),
        ] {
            let result = setup.sut.find_sent(&raw_id, &raw_hash).await;
            assert!(
                matches!(result, Err(ShareError::NotFound(_))),
                "/sent/{raw_id}/{raw_hash}/ は NotFound になるべき"
            );
        }
    }

    #[tokio::test]
    async fn 別の秘密値で作られたハッシュは一致しない() {
        let setup = setup();
        let share_emails = setup
            .sut
            .share(&content_object(), request("a@example.com"), None)
            .await
            .unwrap();

        let result = setup
            .sut
            .find_sent(
                "1",
                &share_emails[0].confirmation_hash("other-secret").to_string(),
            )
            .await;

        assert!(matches!(result, Err(ShareError::NotFound(_))));
    }
}
