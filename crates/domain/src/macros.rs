/// UUID v7 ベースの ID 型を定義する宣言型マクロ
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`Uuid` をラップ）
/// - `derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)`
/// - `new()`: UUID v7 を生成
/// - `from_uuid()`: 既存 UUID から復元
/// - `as_uuid()`: 内部 UUID への参照
/// - `Default` impl（`new()` に委譲）
///
/// # 使用例
///
/// ```rust
/// use emailshare_domain::share_email::SubmissionId;
///
/// let id = SubmissionId::new();
/// let restored = SubmissionId::from_uuid(*id.as_uuid());
/// assert_eq!(id, restored);
/// ```
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            /// 新しい ID を生成する（UUID v7）
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// 既存の UUID から ID を作成する
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// 内部の UUID 参照を取得する
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// 整数（`BIGSERIAL` / 外部システムの主キー）ベースの ID 型を定義する宣言型マクロ
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`i64` をラップ）
/// - `derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)`
/// - `new()`: 既存の値から作成
/// - `as_i64()`: 内部値の取得
/// - `parse_path()`: URL パスセグメントからの厳密なパース
///
/// `parse_path()` は数字だけで構成されたセグメントのみを受け付ける。
/// `+1` や空白を含む値は `None` になる。
///
/// # 使用例
///
/// ```rust
/// use emailshare_domain::share_email::ShareEmailId;
///
/// assert_eq!(ShareEmailId::parse_path("42"), Some(ShareEmailId::new(42)));
/// assert_eq!(ShareEmailId::parse_path("+42"), None);
/// assert_eq!(ShareEmailId::parse_path("abc"), None);
/// ```
macro_rules! define_i64_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        #[serde(transparent)]
        $vis struct $Name(i64);

        impl $Name {
            /// 既存の値から ID を作成する
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// 内部の i64 値を取得する
            pub fn as_i64(&self) -> i64 {
                self.0
            }

            /// URL パスセグメントから ID をパースする
            pub fn parse_path(raw: &str) -> Option<Self> {
                if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                raw.parse().ok().map(Self)
            }
        }
    };
}
