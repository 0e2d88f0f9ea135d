//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ロジックはユースケースに委譲

pub mod client_ip;
pub mod health;
pub mod share;

pub use client_ip::ClientIp;
pub use health::{ReadinessState, health_check, readiness_check};
pub use share::{ShareState, show_sent, show_share_form, submit_share_form};
