//! # ルーター構築
//!
//! ルート定義と HTTP レイヤーを組み立てる。
//! `main` と HTTP テストの両方から使う。

use std::sync::Arc;

use axum::{Router, routing::get};
use emailshare_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handler::{
    ReadinessState,
    ShareState,
    health_check,
    readiness_check,
    show_sent,
    show_share_form,
    submit_share_form,
};

/// 共有関連のルートと `/health`
pub fn routes(share_state: Arc<ShareState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/{content_type_id}/{object_id}/",
            get(show_share_form).post(submit_share_form),
        )
        .route("/sent/{share_email_id}/{hash}/", get(show_sent))
        .with_state(share_state)
}

/// `/health/ready`
pub fn readiness_routes(readiness_state: Arc<ReadinessState>) -> Router {
    Router::new()
        .route("/health/ready", get(readiness_check))
        .with_state(readiness_state)
}

/// リクエスト ID の付与・伝播とリクエストトレースを追加する
///
/// 外側から SetRequestId → Trace → PropagateRequestId の順に適用される。
pub fn with_http_layers(router: Router) -> Router {
    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
