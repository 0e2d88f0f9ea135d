//! # 送信メール
//!
//! テンプレートレンダリングの出力であり、送信バックエンドへの入力となる
//! メールメッセージを定義する。
//!
//! ## 設計方針
//!
//! - **HTML は任意**: HTML テンプレートが見つからない場合はプレーンテキストのみで送信する
//! - **返信先**: 受信者がそのまま返信できるよう、`Reply-To` に共有者のアドレスを入れる

use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),

    /// 候補のいずれにもテンプレートが存在しない
    #[error("テンプレートが見つかりません: {0}")]
    TemplateNotFound(String),
}

/// メールメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:        String,
    /// 返信先メールアドレス（共有者）
    pub reply_to:  Option<String>,
    /// 件名（1 行）
    pub subject:   String,
    /// プレーンテキスト本文
    pub text_body: String,
    /// HTML 本文（HTML テンプレートがある場合のみ）
    pub html_body: Option<String>,
}

impl EmailMessage {
    /// HTML の代替パートを持つか
    pub fn has_html_alternative(&self) -> bool {
        self.html_body.is_some()
    }
}
