//! # Share Service サーバー
//!
//! 任意のオブジェクトへの参照をメールで共有するサービス。
//!
//! ## 役割
//!
//! - **共有フォーム**: 送信者・宛先・メッセージを受け付け、検証する
//! - **共有記録**: 宛先ごとの送信記録を PostgreSQL に保存する
//! - **メール送信**: 共有対象の種別ごとのテンプレートでメールを組み立て、送信する
//! - **送信完了ページ**: 推測されにくいハッシュ付き URL で送信内容を表示する
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `SHARE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `SHARE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `SHARE_SECRET_KEY` | **Yes** | 確認 URL のハッシュに使う秘密値 |
//! | `TEMPLATE_DIR` | No | テンプレートディレクトリ（デフォルト: `templates`） |
//! | `SITE_NAME` | No | サイト名（デフォルト: `EmailShare`） |
//! | `BASE_URL` | No | 公開 URL（デフォルト: `http://localhost:3000`） |
//! | `SHARE_MULTIPLE_RECIPIENTS` | No | 複数宛先を受け付けるか（デフォルト: `true`） |
//! | `NOTIFICATION_BACKEND` | No | `smtp` / `ses` / `noop`（デフォルト: `noop`） |
//! | `SMTP_HOST` / `SMTP_PORT` | No | SMTP 接続先（デフォルト: `localhost:1025`） |
//! | `NOTIFICATION_FROM_ADDRESS` | No | 送信元アドレス |
//! | `SES_ENDPOINT_URL` | No | SES エンドポイント（LocalStack 用） |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! SHARE_PORT=3000 DATABASE_URL=postgres://... SHARE_SECRET_KEY=... cargo run -p emailshare-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use emailshare_domain::{clock::SystemClock, form::ShareEmailForm};
use emailshare_infra::{
    db::{self, PgTransactionManager},
    notification::{
        NoopNotificationSender,
        NotificationSender,
        SesNotificationSender,
        SmtpNotificationSender,
        create_ses_client,
    },
    repository::{
        PostgresContentObjectRepository,
        PostgresContentTypeRepository,
        PostgresShareEmailRepository,
    },
};
use emailshare_service::{
    app,
    config::{NotificationBackend, NotificationConfig, ShareConfig},
    handler::{ReadinessState, ShareState},
    usecase::{ShareRepositories, ShareUseCaseImpl, SiteContext, TemplateRenderer},
};
use emailshare_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Share Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("share-service"));
    let _tracing_guard = tracing::info_span!("app", service = "share-service").entered();

    let config = ShareConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Share Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    db::run_migrations(&pool)
        .await
        .context("マイグレーションの実行に失敗しました")?;
    tracing::info!("マイグレーションを適用しました");

    let renderer = Arc::new(
        TemplateRenderer::from_dir(
            &config.template_dir,
            SiteContext {
                site_name: config.site_name.clone(),
                base_url:  config.base_url.clone(),
            },
        )
        .with_context(|| {
            format!(
                "テンプレートの読み込みに失敗しました: {}",
                config.template_dir.display()
            )
        })?,
    );
    tracing::info!(dir = %config.template_dir.display(), "テンプレートを読み込みました");

    let sender = create_sender(&config.notification).await;

    let usecase = ShareUseCaseImpl::new(
        ShareRepositories {
            content_types:   Arc::new(PostgresContentTypeRepository::new(pool.clone())),
            content_objects: Arc::new(PostgresContentObjectRepository::new(pool.clone())),
            share_emails:    Arc::new(PostgresShareEmailRepository::new(pool.clone())),
            tx_manager:      Arc::new(PgTransactionManager::new(pool.clone())),
        },
        sender,
        renderer.clone(),
        Arc::new(SystemClock),
        config.secret_key.clone(),
    );
    let form = if config.multiple_recipients {
        ShareEmailForm::multiple()
    } else {
        ShareEmailForm::single()
    };
    let share_state = Arc::new(ShareState {
        usecase,
        renderer,
        form,
    });
    let readiness_state = Arc::new(ReadinessState { pool });

    let router = app::with_http_layers(
        app::routes(share_state).merge(app::readiness_routes(readiness_state)),
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Share Service サーバーが起動しました: {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// 設定に応じた送信バックエンドを作成する
async fn create_sender(config: &NotificationConfig) -> Arc<dyn NotificationSender> {
    match config.backend {
        NotificationBackend::Smtp => {
            tracing::info!(
                "通知バックエンド: SMTP ({}:{})",
                config.smtp_host,
                config.smtp_port
            );
            Arc::new(SmtpNotificationSender::new(
                &config.smtp_host,
                config.smtp_port,
                config.from_address.clone(),
            ))
        }
        NotificationBackend::Ses => {
            tracing::info!("通知バックエンド: SES");
            let client = create_ses_client(config.ses_endpoint_url.as_deref()).await;
            Arc::new(SesNotificationSender::new(
                client,
                config.from_address.clone(),
            ))
        }
        NotificationBackend::Noop => {
            tracing::info!("通知バックエンド: Noop（送信しません）");
            Arc::new(NoopNotificationSender)
        }
    }
}
