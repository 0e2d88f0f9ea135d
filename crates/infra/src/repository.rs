//! # リポジトリ実装
//!
//! 共有対象オブジェクトの解決と共有記録の永続化を提供する。
//!
//! ## 設計方針
//!
//! - **トレイト経由**: ユースケース層はトレイトにのみ依存し、テストではモックに差し替える
//! - **ランタイムクエリ**: sqlx の `query_as` + `FromRow` で行をマッピングする

pub mod content_object_repository;
pub mod content_type_repository;
pub mod share_email_repository;

pub use content_object_repository::{ContentObjectRepository, PostgresContentObjectRepository};
pub use content_type_repository::{ContentTypeRepository, PostgresContentTypeRepository};
pub use share_email_repository::{PostgresShareEmailRepository, ShareEmailRepository};
