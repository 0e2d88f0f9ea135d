//! # 通知送信
//!
//! 共有メールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **3 つの実装**: SMTP（Mailpit 開発用）、SES（本番用）、Noop（通知無効化）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択
//! - **配送保証なし**: 再送やキューイングは行わず、失敗はそのまま呼び出し元に返す

mod noop;
mod ses;
mod smtp;

use async_trait::async_trait;
use emailshare_domain::notification::{EmailMessage, NotificationError};
pub use noop::NoopNotificationSender;
pub use ses::{SesNotificationSender, create_ses_client};
pub use smtp::SmtpNotificationSender;

/// メール送信トレイト
///
/// SMTP / SES / Noop の 3 実装を環境変数で切り替える。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを 1 通送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}
