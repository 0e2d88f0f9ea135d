//! # Share Service 設定
//!
//! 環境変数から Share Service サーバーの設定を読み込む。
//! 不正な値は起動時に [`ConfigError`] として報告する。

use std::{env, path::PathBuf};

use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません（.env を確認してください）")]
    Missing(&'static str),

    /// 値が不正
    #[error("{var} の値が不正です（{value:?}）: {reason}")]
    Invalid {
        var:    &'static str,
        value:  String,
        reason: String,
    },
}

/// Share Service サーバーの設定
#[derive(Debug, Clone)]
pub struct ShareConfig {
    /// バインドアドレス
    pub host:                String,
    /// ポート番号
    pub port:                u16,
    /// データベース接続 URL
    pub database_url:        String,
    /// 確認 URL のハッシュに混ぜるサーバー秘密値
    pub secret_key:          String,
    /// テンプレートディレクトリ
    pub template_dir:        PathBuf,
    /// サイト名（テンプレートの `site_name`）
    pub site_name:           String,
    /// 公開 URL（テンプレートの `base_url`、確認 URL の組み立て）
    pub base_url:            String,
    /// 宛先欄に複数アドレスを受け付けるか
    pub multiple_recipients: bool,
    /// 通知設定
    pub notification:        NotificationConfig,
}

/// 送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationBackend {
    /// Mailpit（開発）/ SMTP サーバー経由で送信
    Smtp,
    /// Amazon SES v2 経由で送信（本番）
    Ses,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// 通知機能の設定
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub backend:          NotificationBackend,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:        String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:        u16,
    /// 送信元メールアドレス
    pub from_address:     String,
    /// SES エンドポイント URL（LocalStack 使用時に設定、未設定で AWS デフォルト）
    pub ses_endpoint_url: Option<String>,
}

impl ShareConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup: &lookup };
        Ok(Self {
            host:                vars.or("SHARE_HOST", "0.0.0.0"),
            port:                vars.parse_required("SHARE_PORT")?,
            database_url:        vars.required("DATABASE_URL")?,
            secret_key:          vars.required("SHARE_SECRET_KEY")?,
            template_dir:        PathBuf::from(vars.or("TEMPLATE_DIR", "templates")),
            site_name:           vars.or("SITE_NAME", "EmailShare"),
            base_url:            vars
                .or("BASE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            multiple_recipients: vars.bool_or("SHARE_MULTIPLE_RECIPIENTS", true)?,
            notification:        NotificationConfig::from_vars(&vars)?,
        })
    }
}

impl NotificationConfig {
    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            backend:          vars.backend()?,
            smtp_host:        vars.or("SMTP_HOST", "localhost"),
            smtp_port:        vars.parse_or("SMTP_PORT", 1025)?,
            from_address:     vars.or(
                "NOTIFICATION_FROM_ADDRESS",
                "noreply@emailshare.example.com",
            ),
            ses_endpoint_url: vars.optional("SES_ENDPOINT_URL"),
        })
    }
}

/// 環境変数の参照ヘルパー
///
/// 空文字列は未設定として扱う。
struct Vars<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Vars<'_> {
    fn optional(&self, var: &str) -> Option<String> {
        (self.lookup)(var).filter(|value| !value.trim().is_empty())
    }

    fn or(&self, var: &str, default: &str) -> String {
        self.optional(var).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.optional(var).ok_or(ConfigError::Missing(var))
    }

    fn parse_required<T>(&self, var: &'static str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.required(var)?;
        parse(var, value)
    }

    fn parse_or<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(var) {
            Some(value) => parse(var, value),
            None => Ok(default),
        }
    }

    fn bool_or(&self, var: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.optional(var) else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                value,
                reason: "true / false のいずれかを指定してください".to_string(),
            }),
        }
    }

    fn backend(&self) -> Result<NotificationBackend, ConfigError> {
        let var = "NOTIFICATION_BACKEND";
        let Some(value) = self.optional(var) else {
            return Ok(NotificationBackend::Noop);
        };
        match value.as_str() {
            "smtp" => Ok(NotificationBackend::Smtp),
            "ses" => Ok(NotificationBackend::Ses),
            "noop" => Ok(NotificationBackend::Noop),
            _ => Err(ConfigError::Invalid {
                var,
                value,
                reason: "smtp / ses / noop のいずれかを指定してください".to_string(),
            }),
        }
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}
