//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。

use async_trait::async_trait;
use emailshare_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            html = email.has_html_alternative(),
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_emailがエラーを返さない() {
        let sender = NoopNotificationSender;
        let email = EmailMessage {
            to:        "recipient@example.com".to_string(),
            reply_to:  Some("sender@example.com".to_string()),
            subject:   "共有のお知らせ".to_string(),
            text_body: "本文".to_string(),
            html_body: None,
        };

        let result = sender.send_email(&email).await;
        assert!(result.is_ok());
    }
}
