//! # 共有対象オブジェクト
//!
//! メール共有の対象となる「任意のアプリケーションオブジェクト」への参照を表現する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`ContentType`] | コンテンツ種別 | 名前空間（アプリケーション名）+ 種別名の組 |
//! | [`ContentObject`] | 共有対象 | 種別内の ID で特定される個々のオブジェクト |
//!
//! 共有記録はオブジェクト本体を持たず、`(content_type_id, object_id)` の組で
//! 参照する。テンプレートは [`ContentType`] の名前空間と種別名で選択される。

use serde::Serialize;

define_i64_id! {
    /// コンテンツ種別 ID
    ///
    /// `content_types` テーブルの主キー。共有フォームの URL に含まれる。
    pub struct ContentTypeId;
}

define_i64_id! {
    /// コンテンツ種別内のオブジェクト ID
    pub struct ObjectId;
}

/// コンテンツ種別
///
/// # 不変条件
///
/// - `namespace` と `type_name` は小文字（テンプレートパスに使用するため）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentType {
    id:        ContentTypeId,
    namespace: String,
    type_name: String,
}

impl ContentType {
    pub fn new(
        id: ContentTypeId,
        namespace: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            namespace: namespace.into().to_lowercase(),
            type_name: type_name.into().to_lowercase(),
        }
    }

    pub fn id(&self) -> ContentTypeId {
        self.id
    }

    /// 名前空間（アプリケーション名）
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 種別名（モデル名）
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// 共有対象オブジェクト
///
/// 種別と ID に加え、メール本文や確認ページで表示するタイトルとリンクを持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentObject {
    content_type: ContentType,
    object_id:    ObjectId,
    title:        String,
    url:          Option<String>,
}

impl ContentObject {
    pub fn new(
        content_type: ContentType,
        object_id: ObjectId,
        title: impl Into<String>,
        url: Option<String>,
    ) -> Self {
        Self {
            content_type,
            object_id,
            title: title.into(),
            url,
        }
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// このオブジェクトの共有フォームのパス
    pub fn share_path(&self) -> String {
        share_path(self.content_type.id, self.object_id)
    }
}

/// 共有フォームのパスを組み立てる
///
/// テンプレートからは tera 関数 `email_share_url_for` として呼び出せる。
///
/// ```rust
/// use emailshare_domain::content::{ContentTypeId, ObjectId, share_path};
///
/// assert_eq!(share_path(ContentTypeId::new(3), ObjectId::new(15)), "/3/15/");
/// ```
pub fn share_path(content_type_id: ContentTypeId, object_id: ObjectId) -> String {
    format!("/{content_type_id}/{object_id}/")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_名前空間と種別名は小文字に正規化される() {
        let content_type = ContentType::new(ContentTypeId::new(1), "Blog", "Entry");

        assert_eq!(content_type.namespace(), "blog");
        assert_eq!(content_type.type_name(), "entry");
    }

    #[test]
    fn test_share_pathは種別idとオブジェクトidを含む() {
        let object = ContentObject::new(
            ContentType::new(ContentTypeId::new(7), "blog", "entry"),
            ObjectId::new(42),
            "はじめての投稿",
            None,
        );

        assert_eq!(object.share_path(), "/7/42/");
    }

    #[test]
    fn test_parse_pathは数字以外を拒否する() {
        assert_eq!(ContentTypeId::parse_path("12"), Some(ContentTypeId::new(12)));
        assert_eq!(ContentTypeId::parse_path(""), None);
        assert_eq!(ContentTypeId::parse_path("-1"), None);
        assert_eq!(ContentTypeId::parse_path("1.0"), None);
        assert_eq!(ObjectId::parse_path("99999999999999999999"), None);
    }
}
