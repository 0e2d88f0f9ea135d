//! # 共有フォーム
//!
//! 送信フォームの入力検証と、宛先ごとの共有記録への展開を担当する。
//!
//! ## 宛先の書式
//!
//! 複数宛先モードでは、宛先欄を区切りパターン `[\s,;]+`（空白・改行・カンマ・
//! セミコロン）で分割し、各トークンをメールアドレスとして検証する。
//!
//! ```text
//! recipient@example.com
//! recipient2@example.com, recipient3@example.com
//! ```
//!
//! は 3 件の宛先になる。
//!
//! ## 設計方針
//!
//! - **フィールド単位のエラー**: フォーム再表示のため、エラーはフィールド名ごとに集約する
//! - **全件報告**: 不正な宛先は最初の 1 件で打ち切らず、すべて報告する
//! - **重複除去**: 同じ宛先（大文字小文字を区別しない）は最初の 1 件のみ残す

use std::{collections::BTreeMap, net::IpAddr, sync::LazyLock};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    DomainError,
    content::ContentObject,
    email::Email,
    share_email::{NewShareEmail, SubmissionId},
};

/// 宛先欄の区切りパターン
static RECIPIENT_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,;]+").expect("区切りパターンは妥当な正規表現"));

/// 必須フィールド未入力時のメッセージ
pub const REQUIRED_MESSAGE: &str = "このフィールドは必須です。";

/// フォームのフィールド名
pub mod field {
    pub const SENDER_EMAIL: &str = "sender_email";
    pub const RECIPIENT_EMAIL: &str = "recipient_email";
}

/// フォーム入力（未検証）
///
/// `application/x-www-form-urlencoded` のボディをそのまま受け取る。
/// 未送信のフィールドは空文字列になる。再表示時はこの値をそのままテンプレートに渡す。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareEmailFormData {
    pub sender_email:    String,
    pub recipient_email: String,
    pub message:         String,
}

/// フォームの検証エラー
///
/// フィールド名 → エラーメッセージ一覧。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 指定フィールドのエラーメッセージ
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// エラーのあるフィールド名
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" / ")))
            .join(", ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for FormErrors {}

/// 宛先の入力モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipientMode {
    /// 宛先は 1 件のみ
    Single,
    /// 区切りパターンで分割した複数宛先
    #[default]
    Multiple,
}

/// 共有フォーム
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareEmailForm {
    mode: RecipientMode,
}

impl ShareEmailForm {
    pub fn new(mode: RecipientMode) -> Self {
        Self { mode }
    }

    /// 宛先 1 件のフォーム
    pub fn single() -> Self {
        Self::new(RecipientMode::Single)
    }

    /// 複数宛先のフォーム
    pub fn multiple() -> Self {
        Self::new(RecipientMode::Multiple)
    }

    pub fn mode(&self) -> RecipientMode {
        self.mode
    }

    /// フォーム入力を検証する
    ///
    /// # エラー
    ///
    /// いずれかのフィールドが不正な場合、すべての検証エラーを [`FormErrors`] で返す。
    pub fn validate(&self, data: &ShareEmailFormData) -> Result<ValidShareRequest, FormErrors> {
        let mut errors = FormErrors::new();

        let sender_email = match clean_sender_email(&data.sender_email) {
            Ok(email) => Some(email),
            Err(message) => {
                errors.add(field::SENDER_EMAIL, message);
                None
            }
        };

        let recipients = match self.mode {
            RecipientMode::Single => clean_single_recipient(&data.recipient_email),
            RecipientMode::Multiple => clean_multiple_recipients(&data.recipient_email),
        };
        let recipients = match recipients {
            Ok(recipients) => Some(recipients),
            Err(messages) => {
                for message in messages {
                    errors.add(field::RECIPIENT_EMAIL, message);
                }
                None
            }
        };

        match (sender_email, recipients) {
            (Some(sender_email), Some(recipients)) if errors.is_empty() => Ok(ValidShareRequest {
                sender_email,
                recipients,
                message: data.message.clone(),
            }),
            _ => Err(errors),
        }
    }
}

fn clean_sender_email(raw: &str) -> Result<Email, String> {
    if raw.trim().is_empty() {
        return Err(REQUIRED_MESSAGE.to_string());
    }
    Email::new(raw).map_err(validation_message)
}

fn clean_single_recipient(raw: &str) -> Result<Vec<Email>, Vec<String>> {
    if raw.trim().is_empty() {
        return Err(vec![REQUIRED_MESSAGE.to_string()]);
    }
    Email::new(raw)
        .map(|email| vec![email])
        .map_err(|e| vec![validation_message(e)])
}

fn clean_multiple_recipients(raw: &str) -> Result<Vec<Email>, Vec<String>> {
    let (valid, invalid): (Vec<_>, Vec<_>) = split_recipients(raw)
        .map(Email::new)
        .partition_result();

    if !invalid.is_empty() {
        return Err(invalid.into_iter().map(validation_message).collect());
    }
    if valid.is_empty() {
        return Err(vec![REQUIRED_MESSAGE.to_string()]);
    }

    Ok(valid.into_iter().unique_by(Email::dedup_key).collect())
}

/// 宛先欄を区切りパターンで分割する（空トークンは除外）
pub fn split_recipients(raw: &str) -> impl Iterator<Item = &str> {
    RECIPIENT_SEPARATOR
        .split(raw)
        .filter(|token| !token.is_empty())
}

fn validation_message(error: DomainError) -> String {
    match error {
        DomainError::Validation(message) => message,
        other => other.to_string(),
    }
}

/// 検証済みの共有リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidShareRequest {
    sender_email: Email,
    recipients:   Vec<Email>,
    message:      String,
}

impl ValidShareRequest {
    pub fn sender_email(&self) -> &Email {
        &self.sender_email
    }

    /// 宛先（入力順、重複除去済み、1 件以上）
    pub fn recipients(&self) -> &[Email] {
        &self.recipients
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 宛先ごとの共有記録作成パラメータに展開する
    ///
    /// 送信者とメッセージはすべての宛先で共通。並びは宛先の入力順。
    pub fn into_new_share_emails(
        self,
        content_object: &ContentObject,
        submission_id: &SubmissionId,
        ip_address: Option<IpAddr>,
        now: DateTime<Utc>,
    ) -> Vec<NewShareEmail> {
        let Self {
            sender_email,
            recipients,
            message,
        } = self;

        recipients
            .into_iter()
            .map(|recipient_email| NewShareEmail {
                submission_id: submission_id.clone(),
                content_type_id: content_object.content_type().id(),
                object_id: content_object.object_id(),
                sender_email: sender_email.clone(),
                recipient_email,
                message: message.clone(),
                ip_address,
                created_at: now,
            })
            .collect()
    }
}
