//! # ドメイン層エラー定義
//!
//! 値オブジェクトの生成時に発生する検証エラー。
//!
//! フォーム入力の検証エラーはフィールド単位で利用者に返す必要があるため、
//! [`crate::form::FormErrors`] で別途表現する。共有対象や共有記録が見つからない状態は
//! サービス層のエラーで表す。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - メールアドレスの形式が不正
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
