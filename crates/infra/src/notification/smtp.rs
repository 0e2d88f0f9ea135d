//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー）に接続する。

use async_trait::async_trait;
use emailshare_domain::notification::{EmailMessage, NotificationError};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, MultiPart, SinglePart, header::ContentType},
};

use super::NotificationSender;

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport:    AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 1025 for Mailpit）
    /// - `from_address`: 送信元メールアドレス
    pub fn new(host: &str, port: u16, from_address: String) -> Self {
        // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self {
            transport,
            from_address,
        }
    }
}

/// `EmailMessage` を lettre のメッセージに変換する
///
/// HTML 本文がある場合は `multipart/alternative`、ない場合は `text/plain` 単体になる。
fn build_message(from_address: &str, email: &EmailMessage) -> Result<Message, NotificationError> {
    let from: Mailbox = from_address
        .parse()
        .map_err(|e| NotificationError::SendFailed(format!("送信元アドレス不正: {e}")))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| NotificationError::SendFailed(format!("宛先アドレス不正: {e}")))?;

    let mut builder = Message::builder().from(from).to(to).subject(&email.subject);
    if let Some(reply_to) = &email.reply_to {
        let reply_to: Mailbox = reply_to
            .parse()
            .map_err(|e| NotificationError::SendFailed(format!("返信先アドレス不正: {e}")))?;
        builder = builder.reply_to(reply_to);
    }

    let text_part = SinglePart::builder()
        .header(ContentType::TEXT_PLAIN)
        .body(email.text_body.clone());

    let message = match &email.html_body {
        Some(html_body) => builder.multipart(
            MultiPart::alternative().singlepart(text_part).singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(html_body.clone()),
            ),
        ),
        None => builder.singlepart(text_part),
    };

    message.map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let message = build_message(&self.from_address, email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use emailshare_domain::email::Email;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn email(html_body: Option<&str>) -> EmailMessage {
        EmailMessage {
            to:        "recipient@example.com".to_string(),
            reply_to:  Some("sender@example.com".to_string()),
            subject:   "共有のお知らせ".to_string(),
            text_body: "本文".to_string(),
            html_body: html_body.map(str::to_string),
        }
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpNotificationSender>();
    }

    #[test]
    fn html本文があるとmultipart_alternativeになる() {
        let message = build_message("noreply@example.com", &email(Some("<p>本文</p>"))).unwrap();

        let raw = formatted(&message);
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn html本文がなければtext_plainのみになる() {
        let message = build_message("noreply@example.com", &email(None)).unwrap();

        let raw = formatted(&message);
        assert!(!raw.contains("multipart/alternative"));
        assert!(!raw.contains("text/html"));
        assert!(raw.contains("text/plain"));
    }

    #[test]
    fn 返信先に共有者のアドレスが入る() {
        let message = build_message("noreply@example.com", &email(None)).unwrap();

        let reply_to = message
            .headers()
            .get_raw("Reply-To")
            .map(str::to_string);
        assert_eq!(reply_to.as_deref(), Some("sender@example.com"));
    }

    #[test]
    fn 不正な宛先はsend_failedになる() {
        let mut message = email(None);
        message.to = "not an address".to_string();

        let result = build_message("noreply@example.com", &message);
        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    }

    #[rstest]
    #[case("recipient@example.com")]
    #[case("first.last+tag@sub.example.com")]
    #[case("a..b@example.com")]
    #[case(".a@example.com")]
    #[case("a.@example.com")]
    #[case("user@[127.0.0.1]")]
    fn 宛先として受け付けるアドレスはすべてメッセージにできる(#[case] address: &str) {
        let mut message = email(None);
        message.to = address.to_string();

        assert_eq!(
            Email::new(address).is_ok(),
            build_message("noreply@example.com", &message).is_ok(),
            "{address}"
        );
    }
}
