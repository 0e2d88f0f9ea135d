//! # ユースケース層
//!
//! Share Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリと送信バックエンドを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//!
//! ## モジュール構成
//!
//! - `share`: 共有の送信と送信完了ページ
//! - `template_renderer`: テンプレートの解決とレンダリング

pub mod share;
pub mod template_renderer;

pub use share::{SentShare, ShareRepositories, ShareUseCaseImpl};
pub use template_renderer::{SiteContext, TemplateRenderer};
