//! # Share Service ライブラリ
//!
//! 設定、ハンドラ、ユースケース、ルーター構築を公開する。
//! バイナリ（`main.rs`）と HTTP テストから利用する。

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
