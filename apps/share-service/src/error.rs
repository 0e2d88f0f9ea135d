//! # Share Service エラー定義
//!
//! Share Service 固有のエラーと、HTML レスポンスへの変換を定義する。
//!
//! 利用者に見せるのは最小限の HTML のみで、詳細はログに出力する。

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use emailshare_domain::notification::NotificationError;
use emailshare_shared::event_log::error::{category, kind};
use thiserror::Error;

/// Share Service で発生するエラー
#[derive(Debug, Error)]
pub enum ShareError {
    /// 共有対象・共有記録が見つからない、または確認 URL が一致しない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] emailshare_infra::InfraError),

    /// メールの組み立て・送信に失敗
    #[error("メール送信エラー: {0}")]
    Notification(#[from] NotificationError),

    /// ページテンプレートのレンダリングに失敗
    #[error("ページのレンダリングに失敗: {0}")]
    Page(#[from] tera::Error),
}

impl ShareError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Notification(_) | Self::Page(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        match &self {
            ShareError::NotFound(detail) => {
                tracing::debug!(detail = %detail, "リソースが見つかりません");
            }
            ShareError::Database(e) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::DATABASE,
                    "データベースエラー: {}",
                    e
                );
            }
            ShareError::Notification(e) => {
                tracing::error!(
                    error.category = category::EXTERNAL_SERVICE,
                    error.kind = kind::EMAIL_DELIVERY,
                    "メール送信エラー: {}",
                    e
                );
            }
            ShareError::Page(e) => {
                tracing::error!(
                    error.category = category::TEMPLATE,
                    error.kind = kind::TEMPLATE_RENDER,
                    "ページのレンダリングに失敗: {:?}",
                    e
                );
            }
        }

        let status = self.status_code();
        let title = match status {
            StatusCode::NOT_FOUND => "Not Found",
            _ => "Server Error",
        };
        let body = format!(
            "<!DOCTYPE html>\n<html><head><title>{code} {title}</title></head>\
             <body><h1>{title}</h1></body></html>\n",
            code = status.as_u16(),
        );

        (status, Html(body)).into_response()
    }
}
