//! # インフラ層エラー定義
//!
//! 共有記録の保存・読み出しと、その復元で発生するエラーを表現する。
//!
//! [`InfraError`] は種別（[`InfraErrorKind`]）と生成時点の [`SpanTrace`] を持つ。
//! どの経路で生成しても [`InfraError::capture`] を通るため、スパン情報が欠けることはない。
//! `SpanTrace` に中身が入るのは subscriber に `tracing_error::ErrorLayer` がある場合のみ。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// クエリ失敗、接続エラー、制約違反
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    #[error("マイグレーションエラー: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// 行の値がドメインの不変条件を満たさない（不正な IP アドレス文字列、メールアドレスなど）
    #[error("データ不整合: {0}")]
    InvalidData(String),

    /// 応答が制限時間内に返らなかった
    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    /// 現在のスパンを記録してエラーを生成する
    fn capture(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::InvalidData(msg.into()))
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::capture(InfraErrorKind::Unexpected(msg.into()))
    }

    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 接続の取得やクエリがタイムアウト・切断で失敗したか
    ///
    /// Readiness Check やログの分類に使う。
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            &self.kind,
            InfraErrorKind::Timeout(_)
                | InfraErrorKind::Database(
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
                )
        )
    }
}

impl From<InfraErrorKind> for InfraError {
    fn from(kind: InfraErrorKind) -> Self {
        Self::capture(kind)
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        Self::capture(InfraErrorKind::Database(source))
    }
}

impl From<sqlx::migrate::MigrateError> for InfraError {
    fn from(source: sqlx::migrate::MigrateError) -> Self {
        Self::capture(InfraErrorKind::Migration(source))
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}
