//! ProductStore interface tests.
//!
//! These tests verify the contract of the ProductStore trait.
//! Each storage implementation should run these tests.

use std::time::Duration;

use product_service::model::{NewProduct, Product, ProductUpdate};
use product_service::storage::{Page, ProductFilter, ProductListing, ProductStore};

/// Create a product for the given category and supplier.
pub fn make_product(name: &str, price: i64, category_id: i64, supplier_id: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: format!("{name} description"),
        price,
        thumbnail: format!("https://img.example/{name}.png"),
        inventory: 5,
        supplier_id,
        category_id,
        brand: None,
    }
}

fn page(limit: i32, offset: i32) -> Page {
    Page::new(limit, offset, 20).expect("valid page")
}

fn names(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.name.as_str()).collect()
}

async fn insert_all<S: ProductStore>(store: &S, products: Vec<NewProduct>) -> Vec<Product> {
    let mut stored = Vec::new();
    for product in products {
        stored.push(store.create(product).await.expect("create should succeed"));
    }
    stored
}

async fn list<S: ProductStore>(
    store: &S,
    category: Option<i64>,
    page: Page,
    filter: ProductFilter,
) -> Vec<Product> {
    store
        .list(&ProductListing::new(category, page, filter))
        .await
        .expect("list should succeed")
}

// =============================================================================
// create / get
// =============================================================================

pub async fn test_create_and_get<S: ProductStore>(store: &S) {
    let mut new = make_product("kettle", 2599, 1001, 2001);
    new.brand = Some("Acme".to_string());

    let created = store.create(new.clone()).await.expect("create should succeed");
    assert!(created.id > 0);

    let fetched = store
        .get(created.id)
        .await
        .expect("get should succeed")
        .expect("product should exist");

    assert_eq!(fetched, created);
    assert_eq!(fetched.name, new.name);
    assert_eq!(fetched.brand.as_deref(), Some("Acme"));
}

pub async fn test_get_nonexistent<S: ProductStore>(store: &S) {
    let fetched = store.get(9_999_999).await.expect("get should succeed");
    assert!(fetched.is_none());
}

pub async fn test_create_assigns_distinct_ids<S: ProductStore>(store: &S) {
    let stored = insert_all(
        store,
        vec![
            make_product("first", 100, 1002, 2002),
            make_product("second", 100, 1002, 2002),
        ],
    )
    .await;
    assert_ne!(stored[0].id, stored[1].id);
}

// =============================================================================
// list
// =============================================================================

pub async fn test_list_default_order_is_insertion<S: ProductStore>(store: &S) {
    insert_all(
        store,
        vec![
            make_product("c", 300, 1003, 2003),
            make_product("a", 100, 1003, 2003),
            make_product("b", 200, 1003, 2003),
        ],
    )
    .await;

    let listed = list(store, Some(1003), page(10, 0), ProductFilter::default()).await;
    assert_eq!(names(&listed), vec!["c", "a", "b"]);
}

pub async fn test_list_by_price<S: ProductStore>(store: &S) {
    insert_all(
        store,
        vec![
            make_product("mid", 200, 1004, 2004),
            make_product("low", 100, 1004, 2004),
            make_product("high", 300, 1004, 2004),
        ],
    )
    .await;

    let asc = list(
        store,
        Some(1004),
        page(10, 0),
        ProductFilter {
            by_price_asc: true,
            ..Default::default()
        },
    )
    .await;
    assert_eq!(names(&asc), vec!["low", "mid", "high"]);

    let desc = list(
        store,
        Some(1004),
        page(10, 0),
        ProductFilter {
            by_price_desc: true,
            ..Default::default()
        },
    )
    .await;
    assert_eq!(names(&desc), vec!["high", "mid", "low"]);
}

pub async fn test_list_recency_takes_precedence<S: ProductStore>(store: &S) {
    for (name, price) in [("old", 300), ("newer", 100), ("newest", 200)] {
        store
            .create(make_product(name, price, 1005, 2005))
            .await
            .expect("create should succeed");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let all_flags = ProductFilter {
        by_recency: true,
        by_price_asc: true,
        by_price_desc: true,
    };
    let listed = list(store, Some(1005), page(10, 0), all_flags).await;
    assert_eq!(names(&listed), vec!["old", "newer", "newest"]);
}

pub async fn test_list_paging<S: ProductStore>(store: &S) {
    insert_all(
        store,
        (1..=5)
            .map(|i| make_product(&format!("p{i}"), i * 100, 1006, 2006))
            .collect(),
    )
    .await;

    let price_asc = ProductFilter {
        by_price_asc: true,
        ..Default::default()
    };
    let listed = list(store, Some(1006), page(2, 2), price_asc).await;
    assert_eq!(names(&listed), vec!["p3", "p4"]);

    let past_end = list(store, Some(1006), page(2, 10), price_asc).await;
    assert!(past_end.is_empty());
}

pub async fn test_list_without_category_spans_catalog<S: ProductStore>(store: &S) {
    let stored = insert_all(
        store,
        vec![
            make_product("left", 100, 1007, 2007),
            make_product("right", 100, 1008, 2007),
        ],
    )
    .await;

    let listed = list(store, None, page(1000, 0), ProductFilter::default()).await;
    for product in &stored {
        assert!(listed.iter().any(|p| p.id == product.id));
    }

    let limited = list(store, None, page(1, 0), ProductFilter::default()).await;
    assert_eq!(limited.len(), 1);
}

pub async fn test_list_recommended_is_paged<S: ProductStore>(store: &S) {
    insert_all(
        store,
        vec![
            make_product("r1", 100, 1009, 2009),
            make_product("r2", 100, 1009, 2009),
        ],
    )
    .await;

    let first = store
        .list_recommended(page(1, 0))
        .await
        .expect("list_recommended should succeed");
    let second = store
        .list_recommended(page(1, 1))
        .await
        .expect("list_recommended should succeed");

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first[0].id, second[0].id);
}

pub async fn test_list_by_supplier<S: ProductStore>(store: &S) {
    insert_all(
        store,
        vec![
            make_product("mine-1", 100, 1010, 2010),
            make_product("theirs", 100, 1010, 2011),
            make_product("mine-2", 100, 1010, 2010),
        ],
    )
    .await;

    let listed = store
        .list_by_supplier(2010, page(10, 0))
        .await
        .expect("list_by_supplier should succeed");
    assert_eq!(names(&listed), vec!["mine-1", "mine-2"]);
}

pub async fn test_list_by_ids<S: ProductStore>(store: &S) {
    let stored = insert_all(
        store,
        vec![
            make_product("x", 100, 1011, 2012),
            make_product("y", 100, 1011, 2012),
            make_product("z", 100, 1011, 2012),
        ],
    )
    .await;

    let ids = [stored[0].id, stored[2].id, 8_888_888];
    let mut listed = store.list_by_ids(&ids).await.expect("list_by_ids should succeed");
    listed.sort_by_key(|p| p.id);
    assert_eq!(names(&listed), vec!["x", "z"]);

    let empty = store.list_by_ids(&[]).await.expect("list_by_ids should succeed");
    assert!(empty.is_empty());
}

// =============================================================================
// update / delete
// =============================================================================

pub async fn test_update_is_scoped_to_supplier<S: ProductStore>(store: &S) {
    let product = store
        .create(make_product("original", 100, 1012, 2013))
        .await
        .expect("create should succeed");

    let mut update = ProductUpdate {
        id: product.id,
        supplier_id: 2014,
        name: "changed".to_string(),
        price: 150,
        inventory: 9,
        brand: Some("Acme".to_string()),
    };
    let affected = store.update(update.clone()).await.expect("update should succeed");
    assert_eq!(affected, 0);
    let unchanged = store.get(product.id).await.unwrap().unwrap();
    assert_eq!(unchanged.name, "original");

    update.supplier_id = 2013;
    let affected = store.update(update).await.expect("update should succeed");
    assert_eq!(affected, 1);

    let changed = store.get(product.id).await.unwrap().unwrap();
    assert_eq!(changed.name, "changed");
    assert_eq!(changed.price, 150);
    assert_eq!(changed.inventory, 9);
    assert_eq!(changed.brand.as_deref(), Some("Acme"));
    assert_eq!(changed.created_at, product.created_at);
}

pub async fn test_delete_is_scoped_to_supplier<S: ProductStore>(store: &S) {
    let product = store
        .create(make_product("doomed", 100, 1013, 2015))
        .await
        .expect("create should succeed");

    assert_eq!(store.delete(product.id, 2016).await.unwrap(), 0);
    assert!(store.get(product.id).await.unwrap().is_some());

    assert_eq!(store.delete(product.id, 2015).await.unwrap(), 1);
    assert!(store.get(product.id).await.unwrap().is_none());
}

pub async fn test_delete_by_id<S: ProductStore>(store: &S) {
    let product = store
        .create(make_product("admin-removed", 100, 1014, 2017))
        .await
        .expect("create should succeed");

    assert_eq!(store.delete_by_id(product.id).await.unwrap(), 1);
    assert_eq!(store.delete_by_id(product.id).await.unwrap(), 0);
}

// =============================================================================
// inventory
// =============================================================================

pub async fn test_decrement_is_guarded<S: ProductStore>(store: &S) {
    let product = store
        .create(make_product("stocked", 100, 1015, 2018))
        .await
        .expect("create should succeed");

    assert_eq!(store.decrement_inventory(product.id, 6).await.unwrap(), 0);
    assert_eq!(store.inventory(product.id).await.unwrap(), Some(5));

    assert_eq!(store.decrement_inventory(product.id, 3).await.unwrap(), 1);
    assert_eq!(store.inventory(product.id).await.unwrap(), Some(2));

    assert_eq!(store.decrement_inventory(product.id, 2).await.unwrap(), 1);
    assert_eq!(store.inventory(product.id).await.unwrap(), Some(0));
}

pub async fn test_increment<S: ProductStore>(store: &S) {
    let product = store
        .create(make_product("restocked", 100, 1016, 2019))
        .await
        .expect("create should succeed");

    assert_eq!(store.increment_inventory(product.id, 4).await.unwrap(), 1);
    assert_eq!(store.inventory(product.id).await.unwrap(), Some(9));
}

pub async fn test_inventory_of_missing_product<S: ProductStore>(store: &S) {
    assert_eq!(store.inventory(7_777_777).await.unwrap(), None);
    assert_eq!(store.decrement_inventory(7_777_777, 1).await.unwrap(), 0);
    assert_eq!(store.increment_inventory(7_777_777, 1).await.unwrap(), 0);
}

// =============================================================================
// Test runner macro
// =============================================================================

/// Run all ProductStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_product_store_tests {
    ($store:expr) => {
        use $crate::storage::product_store_tests::*;

        // create / get
        test_create_and_get($store).await;
        println!("  test_create_and_get: PASSED");

        test_get_nonexistent($store).await;
        println!("  test_get_nonexistent: PASSED");

        test_create_assigns_distinct_ids($store).await;
        println!("  test_create_assigns_distinct_ids: PASSED");

        // list
        test_list_default_order_is_insertion($store).await;
        println!("  test_list_default_order_is_insertion: PASSED");

        test_list_by_price($store).await;
        println!("  test_list_by_price: PASSED");

        test_list_recency_takes_precedence($store).await;
        println!("  test_list_recency_takes_precedence: PASSED");

        test_list_paging($store).await;
        println!("  test_list_paging: PASSED");

        test_list_without_category_spans_catalog($store).await;
        println!("  test_list_without_category_spans_catalog: PASSED");

        test_list_recommended_is_paged($store).await;
        println!("  test_list_recommended_is_paged: PASSED");

        test_list_by_supplier($store).await;
        println!("  test_list_by_supplier: PASSED");

        test_list_by_ids($store).await;
        println!("  test_list_by_ids: PASSED");

        // update / delete
        test_update_is_scoped_to_supplier($store).await;
        println!("  test_update_is_scoped_to_supplier: PASSED");

        test_delete_is_scoped_to_supplier($store).await;
        println!("  test_delete_is_scoped_to_supplier: PASSED");

        test_delete_by_id($store).await;
        println!("  test_delete_by_id: PASSED");

        // inventory
        test_decrement_is_guarded($store).await;
        println!("  test_decrement_is_guarded: PASSED");

        test_increment($store).await;
        println!("  test_increment: PASSED");

        test_inventory_of_missing_product($store).await;
        println!("  test_inventory_of_missing_product: PASSED");
    };
}
