//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで共有メールと画面を生成する。
//!
//! ## テンプレートの解決順
//!
//! 共有対象の種別（名前空間 + 種別名）ごとに以下の順で探し、最初に見つかったものを使う。
//!
//! ```text
//! email_share/{namespace}/{type_name}/{template}   種別専用
//! email_share/{namespace}/{template}               名前空間専用
//! email_share/{template}                           共通
//! ```
//!
//! - `subject.txt` / `body.txt` は必須。どれも見つからなければ `TemplateNotFound`
//! - `body.html` は任意。見つからなければプレーンテキストのみのメールになる
//! - 件名は 1 行に整形する（改行を空白に置換し、前後の空白を除去）

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use emailshare_domain::{
    content::{ContentObject, ContentType, ContentTypeId, ObjectId, share_path},
    notification::{EmailMessage, NotificationError},
    share_email::ShareEmail,
};
use serde::Serialize;
use tera::{Context, Tera, Value};

/// 共有フォーム画面
pub const FORM_PAGE: &str = "email_share/form.html";
/// 送信完了画面
pub const SENT_PAGE: &str = "email_share/sent.html";

const SUBJECT_TEMPLATE: &str = "subject.txt";
const TEXT_BODY_TEMPLATE: &str = "body.txt";
const HTML_BODY_TEMPLATE: &str = "body.html";

/// 全テンプレートに渡す追加コンテキスト
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub site_name: String,
    pub base_url:  String,
}

/// 種別に応じたテンプレート候補（優先順）
pub fn template_candidates(content_type: &ContentType, template: &str) -> [String; 3] {
    let namespace = content_type.namespace();
    let type_name = content_type.type_name();
    [
        format!("email_share/{namespace}/{type_name}/{template}"),
        format!("email_share/{namespace}/{template}"),
        format!("email_share/{template}"),
    ]
}

/// テンプレートレンダラー
pub struct TemplateRenderer {
    engine:         Tera,
    template_names: HashSet<String>,
    site:           SiteContext,
}

impl TemplateRenderer {
    /// ディレクトリ配下のテンプレートをすべて読み込む
    ///
    /// テンプレート名はディレクトリからの相対パス（例: `email_share/subject.txt`）。
    pub fn from_dir(dir: &Path, site: SiteContext) -> Result<Self, NotificationError> {
        let glob = format!("{}/**/*", dir.display());
        let engine =
            Tera::new(&glob).map_err(|e| NotificationError::TemplateFailed(format!("{e:?}")))?;
        Ok(Self::with_engine(engine, site))
    }

    /// 名前と本文の組からテンプレートを登録する
    pub fn from_raw<I, N, C>(templates: I, site: SiteContext) -> Result<Self, NotificationError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut engine = Tera::default();
        engine
            .add_raw_templates(templates)
            .map_err(|e| NotificationError::TemplateFailed(format!("{e:?}")))?;
        Ok(Self::with_engine(engine, site))
    }

    fn with_engine(mut engine: Tera, site: SiteContext) -> Self {
        engine.register_function("email_share_url_for", email_share_url_for);
        let template_names = engine.get_template_names().map(str::to_string).collect();
        Self {
            engine,
            template_names,
            site,
        }
    }

    pub fn site(&self) -> &SiteContext {
        &self.site
    }

    /// `site_name` / `base_url` を含むコンテキスト
    pub fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site_name", &self.site.site_name);
        context.insert("base_url", &self.site.base_url);
        context
    }

    /// 候補のうち最初に存在するテンプレート名
    pub fn resolve(&self, content_type: &ContentType, template: &str) -> Option<String> {
        template_candidates(content_type, template)
            .into_iter()
            .find(|name| self.template_names.contains(name))
    }

    /// 画面テンプレートをレンダリングする
    pub fn render_page(&self, name: &str, context: &Context) -> tera::Result<String> {
        self.engine.render(name, context)
    }

    /// 共有記録 1 件分のメールを組み立てる
    ///
    /// 宛先は共有記録の受信者、返信先は送信者になる。
    pub fn render_email(
        &self,
        content_object: &ContentObject,
        share_email: &ShareEmail,
        confirmation_url: &str,
    ) -> Result<EmailMessage, NotificationError> {
        let mut context = self.base_context();
        context.insert("content_object", content_object);
        context.insert("sender", share_email.sender_email().as_str());
        context.insert("recipient", share_email.recipient_email().as_str());
        context.insert("message", share_email.message());
        context.insert("share_email", share_email);
        context.insert("confirmation_url", confirmation_url);

        let content_type = content_object.content_type();
        let subject = self.render_required(content_type, SUBJECT_TEMPLATE, &context)?;
        let text_body = self.render_required(content_type, TEXT_BODY_TEMPLATE, &context)?;
        let html_body = self
            .resolve(content_type, HTML_BODY_TEMPLATE)
            .map(|name| self.render(&name, &context))
            .transpose()?;

        Ok(EmailMessage {
            to: share_email.recipient_email().to_string(),
            reply_to: Some(share_email.sender_email().to_string()),
            subject: flatten_subject(&subject),
            text_body,
            html_body,
        })
    }

    fn render_required(
        &self,
        content_type: &ContentType,
        template: &str,
        context: &Context,
    ) -> Result<String, NotificationError> {
        let name = self.resolve(content_type, template).ok_or_else(|| {
            NotificationError::TemplateNotFound(template_candidates(content_type, template).join(", "))
        })?;
        self.render(&name, context)
    }

    fn render(&self, name: &str, context: &Context) -> Result<String, NotificationError> {
        self.engine
            .render(name, context)
            .map_err(|e| NotificationError::TemplateFailed(format!("{name}: {e:?}")))
    }
}

/// 件名を 1 行に整形する
fn flatten_subject(subject: &str) -> String {
    subject
        .replace("\r\n", "\n")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// tera 関数 `email_share_url_for`
///
/// `content_type_id` と `object_id`、または `content_object` を受け取り、共有フォームのパスを返す。
///
/// ```text
/// {{ email_share_url_for(content_type_id=3, object_id=15) }}
/// {{ email_share_url_for(content_object=content_object) }}
/// ```
fn email_share_url_for(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let (content_type_id, object_id) = match args.get("content_object") {
        Some(object) => (
            integer_arg(object.pointer("/content_type/id"), "content_object.content_type.id")?,
            integer_arg(object.get("object_id"), "content_object.object_id")?,
        ),
        None => (
            integer_arg(args.get("content_type_id"), "content_type_id")?,
            integer_arg(args.get("object_id"), "object_id")?,
        ),
    };

    Ok(Value::String(share_path(
        ContentTypeId::new(content_type_id),
        ObjectId::new(object_id),
    )))
}

fn integer_arg(value: Option<&Value>, name: &str) -> tera::Result<i64> {
    value.and_then(Value::as_i64).ok_or_else(|| {
        tera::Error::msg(format!("email_share_url_for: `{name}` は整数で指定してください"))
    })
}
