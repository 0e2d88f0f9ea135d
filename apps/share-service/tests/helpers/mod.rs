//! HTTP テスト共通ヘルパー
//!
//! インメモリモックとリポジトリ同梱のテンプレートでルーターを組み立てる。

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::DateTime;
use emailshare_domain::{
    clock::FixedClock,
    content::{ContentObject, ContentType, ContentTypeId, ObjectId},
    form::ShareEmailForm,
};
use emailshare_infra::mock::{
    MockContentObjectRepository,
    MockContentTypeRepository,
    MockNotificationSender,
    MockShareEmailRepository,
    MockTransactionManager,
};
use emailshare_service::{
    app,
    handler::ShareState,
    usecase::{ShareRepositories, ShareUseCaseImpl, SiteContext, TemplateRenderer},
};

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub router:       Router,
    pub share_emails: MockShareEmailRepository,
    pub sender:       MockNotificationSender,
}

pub fn content_object() -> ContentObject {
    ContentObject::new(
        ContentType::new(ContentTypeId::new(3), "blog", "entry"),
        ObjectId::new(15),
        "最初の記事",
        Some("https://example.com/blog/15".to_string()),
    )
}

fn template_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../templates")
        .canonicalize()
        .expect("templates ディレクトリが見つからない")
}

pub fn build_app(form: ShareEmailForm, sender: MockNotificationSender) -> TestApp {
    let content_types = MockContentTypeRepository::new();
    content_types.add(content_object().content_type().clone());
    let content_objects = MockContentObjectRepository::new();
    content_objects.add(content_object());
    let share_emails = MockShareEmailRepository::new();

    let renderer = Arc::new(
        TemplateRenderer::from_dir(
            &template_dir(),
            SiteContext {
                site_name: "EmailShare".to_string(),
                base_url:  "http://share.example.com".to_string(),
            },
        )
        .unwrap(),
    );

    let usecase = ShareUseCaseImpl::new(
        ShareRepositories {
            content_types:   Arc::new(content_types),
            content_objects: Arc::new(content_objects),
            share_emails:    Arc::new(share_emails.clone()),
            tx_manager:      Arc::new(MockTransactionManager),
        },
        Arc::new(sender.clone()),
        renderer.clone(),
        Arc::new(FixedClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        )),
        SECRET.to_string(),
    );
    let state = Arc::new(ShareState {
        usecase,
        renderer,
        form,
    });

    TestApp {
        router: app::with_http_layers(app::routes(state)),
        share_emails,
        sender,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// `application/x-www-form-urlencoded` の POST リクエスト（ボディはエンコード済み）
pub fn post_form(uri: &str, encoded_body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(encoded_body.to_string()))
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
