//! # ヘルスチェックハンドラ
//!
//! ## エンドポイント
//!
//! ```text
//! GET /health         稼働確認
//! GET /health/ready   依存サービス（DB）への接続確認
//! ```
//!
//! レスポンス型は [`emailshare_shared::HealthResponse`] / [`emailshare_shared::ReadinessResponse`]。

use std::{sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode};
use emailshare_infra::{InfraError, db};
use emailshare_shared::{
    CheckStatus,
    HealthResponse,
    ReadinessResponse,
    event_log::error::{category, kind},
};
use sqlx::PgPool;

const DATABASE_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Readiness Check の共有状態
pub struct ReadinessState {
    pub pool: PgPool,
}

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Readiness Check エンドポイント
///
/// DB に到達できなければ 503 を返す。
pub async fn readiness_check(
    State(state): State<Arc<ReadinessState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = check_database(&state.pool).await;
    let response = ReadinessResponse::from_checks([("database", database)]);

    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

async fn check_database(pool: &PgPool) -> CheckStatus {
    match db::ping(pool, DATABASE_CHECK_TIMEOUT).await {
        Ok(()) => CheckStatus::Ok,
        Err(e) => {
            tracing::warn!(
                error.category = category::INFRASTRUCTURE,
                error.kind = database_error_kind(&e),
                "Readiness Check: DB の確認に失敗: {}",
                e
            );
            CheckStatus::Error
        }
    }
}

fn database_error_kind(error: &InfraError) -> &'static str {
    if error.is_connection_failure() {
        kind::DATABASE_CONNECTION
    } else {
        kind::DATABASE
    }
}
