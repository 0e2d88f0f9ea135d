//! # EmailShare インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール、マイグレーション、トランザクション
//! - **リポジトリ実装**: 共有対象オブジェクトの解決と共有記録の永続化
//! - **メール送信**: SMTP / SES / Noop の送信バックエンド
//!
//! ## 依存関係
//!
//! ```text
//! share-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信
//! - [`repository`] - リポジトリ実装
//! - `mock` - テスト用インメモリ実装（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use emailshare_infra::{db, repository::PostgresShareEmailRepository};
//!
//! async fn setup() -> Result<(), emailshare_infra::InfraError> {
//!     let pool = db::create_pool("postgres://localhost/emailshare").await?;
//!     db::run_migrations(&pool).await?;
//!     let _repo = PostgresShareEmailRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use error::InfraError;
