//! # PostgreSQL 接続とトランザクション
//!
//! 共有記録は 1 回の送信で宛先の数だけ作られる。これらは必ず 1 つの
//! トランザクションでまとめて保存するため、書き込み系のリポジトリメソッドは
//! [`TxContext`] を引数に取る。
//!
//! ```rust,ignore
//! let pool = db::create_pool(&database_url).await?;
//! db::run_migrations(&pool).await?;
//!
//! let tx_manager = PgTransactionManager::new(pool.clone());
//! let mut tx = tx_manager.begin().await?;
//! repo.insert(&mut tx, &new_share_email).await?;
//! tx.commit().await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction, postgres::PgPoolOptions};

use crate::error::{InfraError, InfraErrorKind};

const MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// 接続プールを作成する
///
/// 起動時に一度だけ呼び、リポジトリ間で共有する。
pub async fn create_pool(database_url: &str) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// `migrations/` のマイグレーションを適用する（適用済みはスキップ）
pub async fn run_migrations(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// `SELECT 1` で DB に到達できるか確認する
///
/// `timeout` 内に応答がなければ `Timeout` エラーを返す。
pub async fn ping(pool: &PgPool, timeout: Duration) -> Result<(), InfraError> {
    match tokio::time::timeout(timeout, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(result) => result.map(|_| ()).map_err(InfraError::from),
        Err(_) => Err(
            InfraErrorKind::Timeout(format!("{}ms 以内に応答がありません", timeout.as_millis()))
                .into(),
        ),
    }
}

/// トランザクションコンテキスト
///
/// `TransactionManager::begin()` で作成し、`commit()` を呼ばずにドロップすると
/// ロールバックされる。
pub struct TxContext(TxBackend);

enum TxBackend {
    Pg(Transaction<'static, Postgres>),
    #[cfg(any(test, feature = "test-utils"))]
    InMemory,
}

impl TxContext {
    /// インメモリリポジトリ用のコンテキスト（コネクションを持たない）
    #[cfg(any(test, feature = "test-utils"))]
    pub fn mock() -> Self {
        Self(TxBackend::InMemory)
    }

    pub async fn commit(self) -> Result<(), InfraError> {
        match self.0 {
            TxBackend::Pg(tx) => Ok(tx.commit().await?),
            #[cfg(any(test, feature = "test-utils"))]
            TxBackend::InMemory => Ok(()),
        }
    }

    pub(crate) fn conn(&mut self) -> Result<&mut PgConnection, InfraError> {
        match &mut self.0 {
            TxBackend::Pg(tx) => Ok(&mut **tx),
            #[cfg(any(test, feature = "test-utils"))]
            TxBackend::InMemory => Err(InfraError::unexpected(
                "インメモリの TxContext ではコネクションを取得できません",
            )),
        }
    }
}

/// トランザクションの開始口
///
/// ユースケース層はプールを直接持たず、この trait 経由で書き込みを始める。
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<TxContext, InfraError>;
}

pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext(TxBackend::Pg(self.pool.begin().await?)))
    }
}
