//! # 共有ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /{content_type_id}/{object_id}/` - 共有フォームを表示
//! - `POST /{content_type_id}/{object_id}/` - 共有を送信し、送信完了ページへリダイレクト
//! - `GET /sent/{share_email_id}/{hash}/` - 送信完了ページ
//!
//! 入力エラーの場合は 200 でフォームを再表示する（入力値とエラーを保持）。

use std::sync::Arc;

use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use emailshare_domain::{
    content::ContentObject,
    form::{FormErrors, RecipientMode, ShareEmailForm, ShareEmailFormData},
};
use serde::Serialize;

use crate::{
    error::ShareError,
    handler::ClientIp,
    usecase::{
        ShareUseCaseImpl,
        TemplateRenderer,
        template_renderer::{FORM_PAGE, SENT_PAGE},
    },
};

/// 共有 API の共有状態
pub struct ShareState {
    pub usecase:  ShareUseCaseImpl,
    pub renderer: Arc<TemplateRenderer>,
    pub form:     ShareEmailForm,
}

/// フォーム画面に渡す値
#[derive(Debug, Serialize)]
struct FormView<'a> {
    data:     &'a ShareEmailFormData,
    errors:   &'a FormErrors,
    /// 宛先欄が複数アドレスを受け付けるか
    multiple: bool,
}

/// GET /{content_type_id}/{object_id}/
pub async fn show_share_form(
    State(state): State<Arc<ShareState>>,
    Path((content_type_id, object_id)): Path<(String, String)>,
) -> Result<Html<String>, ShareError> {
    let content_object = state
        .usecase
        .load_content_object(&content_type_id, &object_id)
        .await?;

    render_form(
        &state,
        &content_object,
        &ShareEmailFormData::default(),
        &FormErrors::new(),
    )
}

/// POST /{content_type_id}/{object_id}/
#[tracing::instrument(skip_all, fields(%content_type_id, %object_id))]
pub async fn submit_share_form(
    State(state): State<Arc<ShareState>>,
    Path((content_type_id, object_id)): Path<(String, String)>,
    ClientIp(ip_address): ClientIp,
    Form(data): Form<ShareEmailFormData>,
) -> Result<Response, ShareError> {
    let content_object = state
        .usecase
        .load_content_object(&content_type_id, &object_id)
        .await?;

    let request = match state.form.validate(&data) {
        Ok(request) => request,
        Err(errors) => {
            tracing::debug!(fields = ?errors.fields().collect::<Vec<_>>(), "入力エラー");
            return Ok(render_form(&state, &content_object, &data, &errors)?.into_response());
        }
    };

    let share_emails = state
        .usecase
        .share(&content_object, request, ip_address)
        .await?;

    // 宛先は 1 件以上あるため、先頭の送信完了ページへ遷移する
    let location = share_emails
        .first()
        .map(|share_email| state.usecase.confirmation_path(share_email))
        .unwrap_or_else(|| content_object.share_path());
    Ok(Redirect::to(&location).into_response())
}

/// GET /sent/{share_email_id}/{hash}/
pub async fn show_sent(
    State(state): State<Arc<ShareState>>,
    Path((share_email_id, hash)): Path<(String, String)>,
) -> Result<Html<String>, ShareError> {
    let sent = state.usecase.find_sent(&share_email_id, &hash).await?;

    let mut context = state.renderer.base_context();
    context.insert("content_object", &sent.content_object);
    context.insert("share_email", &sent.share_email);
    context.insert("share_emails", &sent.submission);

    Ok(Html(state.renderer.render_page(SENT_PAGE, &context)?))
}

fn render_form(
    state: &ShareState,
    content_object: &ContentObject,
    data: &ShareEmailFormData,
    errors: &FormErrors,
) -> Result<Html<String>, ShareError> {
    let mut context = state.renderer.base_context();
    context.insert("content_object", content_object);
    context.insert("share_url", &content_object.share_path());
    context.insert(
        "form",
        &FormView {
            data,
            errors,
            multiple: state.form.mode() == RecipientMode::Multiple,
        },
    );

    Ok(Html(state.renderer.render_page(FORM_PAGE, &context)?))
}
