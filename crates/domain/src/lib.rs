//! # EmailShare ドメイン層
//!
//! 「オブジェクトをメールで共有する」機能の中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 共有記録（[`share_email::ShareEmail`]）
//! - **値オブジェクト**: メールアドレス、コンテンツ種別、各種 ID
//! - **フォーム検証**: 送信フォームの入力検証と宛先ごとの展開（[`form`]）
//! - **確認 URL**: 推測されにくい確認ページ URL の生成と照合（[`confirmation`]）
//!
//! ## 依存関係の方向
//!
//! ```text
//! share-service → infra → domain
//!        ↘                   ↑
//!          ──────────────────┘
//! ```
//!
//! ドメイン層は DB やメール送信といったインフラには一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダ
//! - [`confirmation`] - 確認ハッシュ
//! - [`content`] - 共有対象オブジェクトとその種別
//! - [`email`] - メールアドレス値オブジェクト
//! - [`error`] - ドメインエラー
//! - [`form`] - 共有フォームの検証
//! - [`notification`] - 送信メールのモデル
//! - [`share_email`] - 共有記録エンティティ
//!
//! ## 使用例
//!
//! ```rust
//! use emailshare_domain::{DomainError, email::Email};
//!
//! let email = Email::new("sender@example.com").unwrap();
//! assert_eq!(email.as_str(), "sender@example.com");
//!
//! let error = Email::new("not-an-address").unwrap_err();
//! assert!(matches!(error, DomainError::Validation(_)));
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod confirmation;
pub mod content;
pub mod email;
pub mod error;
pub mod form;
pub mod notification;
pub mod share_email;

pub use error::DomainError;
