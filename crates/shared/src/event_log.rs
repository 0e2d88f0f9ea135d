//! # ビジネスイベントログの構造化ヘルパー
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const SHARE: &str = "share";
    }

    /// イベントアクション
    pub mod action {
        /// 1 回の送信分の共有記録を保存した
        pub const SHARE_CREATED: &str = "share.created";
        pub const SHARE_EMAIL_SENT: &str = "share.email_sent";
        pub const SHARE_EMAIL_FAILED: &str = "share.email_failed";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const SHARE_EMAIL: &str = "share_email";
        pub const SUBMISSION: &str = "submission";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
///
/// `tracing::error!` に `error.category` + `error.kind` を追加して使う。
pub mod error {
    pub mod category {
        /// インフラストラクチャ（DB）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 外部サービス呼び出し（SMTP、SES）
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// テンプレート解決・レンダリング
        pub const TEMPLATE: &str = "template";
    }

    pub mod kind {
        pub const DATABASE: &str = "database";
        /// 接続の取得失敗・タイムアウト・切断
        pub const DATABASE_CONNECTION: &str = "database_connection";
        pub const EMAIL_DELIVERY: &str = "email_delivery";
        pub const TEMPLATE_RENDER: &str = "template_render";
        pub const INTERNAL: &str = "internal";
    }
}
