//! ContentTypeRepository / ContentObjectRepository 統合テスト
//!
//! データベースを使用したテスト。sqlx::test マクロを使用して、
//! テストごとにデータベースを作成しマイグレーションを適用する。
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://localhost/emailshare cargo test -p emailshare-infra --test content_repository_test -- --ignored
//! ```

mod common;

use common::{insert_content_type, insert_shareable_object};
use emailshare_domain::content::{ContentTypeId, ObjectId};
use emailshare_infra::repository::{
    ContentObjectRepository,
    ContentTypeRepository,
    PostgresContentObjectRepository,
    PostgresContentTypeRepository,
};
use pretty_assertions::assert_eq;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "PostgreSQL が必要"]
async fn test_idでコンテンツタイプを取得できる(pool: PgPool) {
    let id = insert_content_type(&pool, "blog", "entry").await;
    let sut = PostgresContentTypeRepository::new(pool);

    let content_type = sut.find_by_id(id).await.unwrap().unwrap();

    assert_eq!(content_type.id(), id);
    assert_eq!(content_type.namespace(), "blog");
    assert_eq!(content_type.type_name(), "entry");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "PostgreSQL が必要"]
async fn test_存在しないコンテンツタイプはnoneを返す(pool: PgPool) {
    let sut = PostgresContentTypeRepository::new(pool);

    let result = sut.find_by_id(ContentTypeId::new(9_999)).await.unwrap();

    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "PostgreSQL が必要"]
async fn test_共有対象オブジェクトを取得できる(pool: PgPool) {
    let ct_id = insert_content_type(&pool, "blog", "entry").await;
    let object_id =
        insert_shareable_object(&pool, ct_id, 42, "最初の記事", Some("https://example.com/1")).await;
    let content_type = PostgresContentTypeRepository::new(pool.clone())
        .find_by_id(ct_id)
        .await
        .unwrap()
        .unwrap();
    let sut = PostgresContentObjectRepository::new(pool);

    let object = sut.find(&content_type, object_id).await.unwrap().unwrap();

    assert_eq!(object.title(), "最初の記事");
    assert_eq!(object.url(), Some("https://example.com/1"));
    assert_eq!(object.share_path(), format!("/{ct_id}/42/"));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "PostgreSQL が必要"]
async fn test_別のコンテンツタイプのオブジェクトは取得できない(pool: PgPool) {
    let entry = insert_content_type(&pool, "blog", "entry").await;
    let page = insert_content_type(&pool, "pages", "page").await;
    insert_shareable_object(&pool, entry, 1, "記事", None).await;
    let page_type = PostgresContentTypeRepository::new(pool.clone())
        .find_by_id(page)
        .await
        .unwrap()
        .unwrap();
    let sut = PostgresContentObjectRepository::new(pool);

    let result = sut.find(&page_type, ObjectId::new(1)).await.unwrap();

    assert!(result.is_none());
}
