//! CategoryStore interface tests.

use product_service::model::NewCategory;
use product_service::storage::{CategoryStore, StorageError};

pub fn make_category(id: i64, name: &str) -> NewCategory {
    NewCategory {
        id,
        name: name.to_string(),
        thumbnail: None,
    }
}

pub async fn test_create_and_list<S: CategoryStore>(store: &S) {
    let mut with_thumbnail = make_category(8, "Garden");
    with_thumbnail.thumbnail = Some("https://img.example/garden.png".to_string());

    store
        .create(make_category(7, "Books"))
        .await
        .expect("create should succeed");
    store
        .create(with_thumbnail)
        .await
        .expect("create should succeed");

    let categories = store.list().await.expect("list should succeed");

    let books = categories
        .iter()
        .find(|c| c.id == 7)
        .expect("category 7 should be listed");
    assert_eq!(books.name, "Books");
    assert_eq!(books.thumbnail, None);

    let garden = categories
        .iter()
        .find(|c| c.id == 8)
        .expect("category 8 should be listed");
    assert_eq!(
        garden.thumbnail.as_deref(),
        Some("https://img.example/garden.png")
    );
}

pub async fn test_duplicate_id_conflicts<S: CategoryStore>(store: &S) {
    store
        .create(make_category(9, "Toys"))
        .await
        .expect("create should succeed");

    let err = store
        .create(make_category(9, "Other toys"))
        .await
        .expect_err("duplicate id should fail");
    assert!(matches!(err, StorageError::Conflict(_)), "{err:?}");

    let categories = store.list().await.expect("list should succeed");
    let toys: Vec<_> = categories.iter().filter(|c| c.id == 9).collect();
    assert_eq!(toys.len(), 1);
    assert_eq!(toys[0].name, "Toys");
}

/// Run all CategoryStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_category_store_tests {
    ($store:expr) => {
        use $crate::storage::category_store_tests::*;

        test_create_and_list($store).await;
        println!("  test_create_and_list: PASSED");

        test_duplicate_id_conflicts($store).await;
        println!("  test_duplicate_id_conflicts: PASSED");
    };
}
