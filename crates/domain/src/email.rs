//! # メールアドレス
//!
//! 送信者・宛先のメールアドレスを表す値オブジェクト。

use serde::Serialize;
use validator::ValidateEmail;

use crate::DomainError;

/// メールアドレスの最大長（RFC 5321 のパス長上限）
pub const MAX_EMAIL_LENGTH: usize = 254;

/// メールアドレス（値オブジェクト）
///
/// 生成時に前後の空白を除去し、形式を検証する。
/// 大文字小文字は入力どおりに保持する（ハッシュ計算の入力になるため）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `validator` のメールアドレス形式に合致する
    /// - ローカル部がドット区切りの atom（先頭・末尾・連続のドットを含まない）
    /// - ドメイン部がドメインリテラル（`[127.0.0.1]`）ではない
    /// - 最大 254 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        if value.chars().count() > MAX_EMAIL_LENGTH {
            return Err(DomainError::Validation(format!(
                "メールアドレスは{MAX_EMAIL_LENGTH}文字以内である必要があります"
            )));
        }

        if !value.validate_email() || !is_sendable(&value) {
            return Err(DomainError::Validation(format!(
                "有効なメールアドレスを入力してください: {value}"
            )));
        }

        Ok(Self(value))
    }

    /// DB から復元する（検証済みの値）
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 重複判定用のキー（大文字小文字を区別しない）
    pub(crate) fn dedup_key(&self) -> String {
        self.0.to_lowercase()
    }
}

/// SMTP の送信ヘッダとして組み立てられる形式か
///
/// `validator` はドットの連続やドメインリテラルを許容するが、
/// メール送信側（lettre の `Address`）はこれらを受け付けない。
fn is_sendable(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    local.split('.').all(|atom| !atom.is_empty()) && !domain.starts_with('[')
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_正常な形式を受け入れる() {
        let email = Email::new("recipient@example.com").unwrap();
        assert_eq!(email.as_str(), "recipient@example.com");
    }

    #[test]
    fn test_前後の空白を除去する() {
        let email = Email::new("  sender@example.com\n").unwrap();
        assert_eq!(email.as_str(), "sender@example.com");
    }

    #[rstest]
    #[case("first.last@example.com")]
    #[case("user+tag@sub.example.co.jp")]
    #[case("o'brien@example.com")]
    fn test_ドット区切りや記号を含むローカル部を受け入れる(#[case] input: &str) {
        assert!(Email::new(input).is_ok());
    }

    #[test]
    fn test_大文字小文字を保持する() {
        let email = Email::new("Sender@Example.COM").unwrap();
        assert_eq!(email.to_string(), "Sender@Example.COM");
    }

    #[rstest]
    #[case("", "空文字列")]
    #[case("   ", "空白のみ")]
    #[case("no-at-sign", "@記号なし")]
    #[case("@example.com", "ローカル部分が空")]
    #[case("user@", "ドメイン部分が空")]
    #[case("user name@example.com", "空白を含む")]
    #[case("a..b@example.com", "ローカル部のドット連続")]
    #[case(".a@example.com", "ローカル部の先頭ドット")]
    #[case("a.@example.com", "ローカル部の末尾ドット")]
    #[case("user@[127.0.0.1]", "ドメインリテラル")]
    #[case(&format!("{}@example.com", "a".repeat(250)), "254文字超過")]
    fn test_不正な形式を拒否する(#[case] input: &str, #[case] _reason: &str) {
        assert!(matches!(Email::new(input), Err(DomainError::Validation(_))));
    }
}
