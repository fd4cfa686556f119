//! Product service integration tests.
//!
//! Run with: cargo test --test service_integration --features sqlite
//!
//! Drives the gRPC handlers against a migrated in-memory SQLite catalog,
//! with mock review, order, image and auth services.

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tonic::{Code, Request};

use product_service::peers::mock::{
    MockAuthPeer, MockImagePeer, MockOrderPeer, MockReviewPeer, UploadFailure,
};
use product_service::peers::{AuthPeer, ImagePeer, OrderPeer, Peers, ReviewPeer};
use product_service::proto::product_service_server::ProductService;
use product_service::proto::{
    CreateCategoryRequest, CreateProductRequest, DeleteProductByAdminRequest,
    DeleteProductRequest, GetListProductByIdsRequest, GetListProductRequest,
    GetListProductResponse, GetProductBySupplierRequest, GetProductInventoryRequest,
    GetProductRequest, InventoryAdjustmentRequest, UpdateProductRequest,
};
use product_service::services::{CatalogOptions, ProductCatalogService};
use product_service::storage::sql::sqlite::{SqliteCategoryStore, SqliteProductStore};
use product_service::storage::{CategoryStore, ProductStore};
use product_service::utils::Observability;

const THUMBNAIL_URL: &str = "https://images.example/kettle.png";

struct TestService {
    service: ProductCatalogService,
    reviews: Arc<MockReviewPeer>,
    orders: Arc<MockOrderPeer>,
    image: Arc<MockImagePeer>,
    auth: Arc<MockAuthPeer>,
}

async fn start(with_auth: bool) -> TestService {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to connect to SQLite");
    sqlx::migrate!("migrations/sqlite")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let reviews = Arc::new(MockReviewPeer::new());
    let orders = Arc::new(MockOrderPeer::new());
    let image = Arc::new(MockImagePeer::new(THUMBNAIL_URL));
    let auth = Arc::new(MockAuthPeer::new());

    let peers = Peers {
        review: reviews.clone() as Arc<dyn ReviewPeer>,
        order: orders.clone() as Arc<dyn OrderPeer>,
        image: image.clone() as Arc<dyn ImagePeer>,
        auth: with_auth.then(|| auth.clone() as Arc<dyn AuthPeer>),
    };
    let products: Arc<dyn ProductStore> = Arc::new(SqliteProductStore::new(pool.clone()));
    let categories: Arc<dyn CategoryStore> = Arc::new(SqliteCategoryStore::new(pool));
    let service = ProductCatalogService::new(
        (products, categories),
        peers,
        Arc::new(Observability::default()),
        CatalogOptions::default(),
    );

    TestService {
        service,
        reviews,
        orders,
        image,
        auth,
    }
}

fn product_request(
    name: &str,
    price: i64,
    inventory: i32,
    category_id: i64,
) -> CreateProductRequest {
    CreateProductRequest {
        product_name: name.to_string(),
        desc: format!("{name} description"),
        price,
        inventory,
        supplier_id: 10,
        category_id,
        brand: None,
        thumbnail_data_chunk: "data:image/png;base64,aGVsbG8=".to_string(),
    }
}

async fn create(t: &TestService, req: CreateProductRequest) -> i64 {
    t.service
        .create_product(Request::new(req))
        .await
        .expect("create_product should succeed")
        .into_inner()
        .product_id
}

fn with_token<T>(message: T, token: &str) -> Request<T> {
    let mut request = Request::new(message);
    request.metadata_mut().insert(
        "authorization",
        format!("Bearer {token}").parse().expect("valid header"),
    );
    request
}

fn names(response: GetListProductResponse) -> Vec<String> {
    response.list_product.into_iter().map(|p| p.name).collect()
}

#[tokio::test]
async fn test_create_then_sell_down_inventory() {
    let t = start(false).await;
    let id = create(&t, product_request("Kettle", 100, 5, 1)).await;

    let reply = t
        .service
        .desc_inventory(Request::new(InventoryAdjustmentRequest {
            product_id: id,
            count: 3,
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.message, "inventory is decreased");

    let product = t
        .service
        .get_product(Request::new(GetProductRequest { product_id: id }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(product.inventory, 2);
    assert_eq!(product.price, 100);
    assert_eq!(product.thumbnail, THUMBNAIL_URL);
    assert!(product.created_at.is_some());

    let status = t
        .service
        .desc_inventory(Request::new(InventoryAdjustmentRequest {
            product_id: id,
            count: 3,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);

    t.service
        .inc_inventory(Request::new(InventoryAdjustmentRequest {
            product_id: id,
            count: 4,
        }))
        .await
        .unwrap();
    let inventory = t
        .service
        .get_product_inventory(Request::new(GetProductInventoryRequest { product_id: id }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(inventory.count, 6);
}

#[tokio::test]
async fn test_get_product_is_enriched() {
    let t = start(false).await;
    let id = create(&t, product_request("Kettle", 100, 5, 1)).await;
    t.reviews.set_stars(id, &[5, 4, 0]).await;
    t.orders.set_sold(id, 12).await;

    let product = t
        .service
        .get_product(Request::new(GetProductRequest { product_id: id }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(product.star_average, 4.5);
    assert_eq!(product.total_sold, 12);
}

#[tokio::test]
async fn test_peer_failures_degrade_to_zero() {
    let t = start(false).await;
    let id = create(&t, product_request("Kettle", 100, 5, 1)).await;
    t.reviews.set_stars(id, &[5]).await;
    t.orders.set_sold(id, 3).await;
    t.reviews.set_fail(true).await;
    t.orders.set_fail(true).await;

    let listed = t
        .service
        .get_list_product_by_ids(Request::new(GetListProductByIdsRequest { list_id: vec![id] }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(listed.list_product.len(), 1);
    assert_eq!(listed.list_product[0].star_average, 0.0);
    assert_eq!(listed.list_product[0].total_sold, 0);
}

#[tokio::test]
async fn test_malformed_thumbnail_is_rejected_before_upload() {
    let t = start(false).await;
    let mut req = product_request("Kettle", 100, 5, 1);
    req.thumbnail_data_chunk = "not a data uri".to_string();

    let status = t.service.create_product(Request::new(req)).await.unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(t.image.open_count(), 0);
}

#[tokio::test]
async fn test_failed_upload_stores_nothing() {
    let t = start(false).await;
    t.image.set_failure(Some(UploadFailure::Close)).await;

    let status = t
        .service
        .create_product(Request::new(product_request("Kettle", 100, 5, 1)))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);

    let listed = t
        .service
        .get_product_by_supplier(Request::new(GetProductBySupplierRequest {
            supplier_id: 10,
            limit: 10,
            offset: 0,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(listed.list_product.is_empty());
}

#[tokio::test]
async fn test_list_ordering_precedence() {
    let t = start(false).await;
    for (name, price) in [("first", 300), ("second", 100), ("third", 200)] {
        create(&t, product_request(name, price, 5, 3)).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    create(&t, product_request("elsewhere", 50, 5, 4)).await;

    let list = |by_time, by_price_inc, by_price_desc| GetListProductRequest {
        category_id: 3,
        limit: 10,
        offset: 0,
        by_time,
        by_price_inc,
        by_price_desc,
    };

    let all_flags = t
        .service
        .get_list_product(Request::new(list(true, true, true)))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(names(all_flags), vec!["first", "second", "third"]);

    let price_both = t
        .service
        .get_list_product(Request::new(list(false, true, true)))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(names(price_both), vec!["second", "third", "first"]);

    let price_desc = t
        .service
        .get_list_product(Request::new(list(false, false, true)))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(names(price_desc), vec!["first", "third", "second"]);

    let mut everything = list(false, false, false);
    everything.category_id = 0;
    let everything = t
        .service
        .get_list_product(Request::new(everything))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(everything.list_product.len(), 4);
}

#[tokio::test]
async fn test_update_and_delete_are_scoped_to_supplier() {
    let t = start(false).await;
    let id = create(&t, product_request("Kettle", 100, 5, 1)).await;

    let update = |supplier_id| UpdateProductRequest {
        product_id: id,
        supplier_id,
        name: "Steel kettle".to_string(),
        price: 120,
        inventory: 7,
        brand: Some("Acme".to_string()),
    };

    let status = t
        .service
        .update_product(Request::new(update(99)))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    let status = t
        .service
        .delete_product(Request::new(DeleteProductRequest {
            product_id: id,
            supplier_id: 99,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    let reply = t
        .service
        .update_product(Request::new(update(10)))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.message, "product is updated");

    let product = t
        .service
        .get_product(Request::new(GetProductRequest { product_id: id }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(product.name, "Steel kettle");
    assert_eq!(product.brand.as_deref(), Some("Acme"));

    let reply = t
        .service
        .delete_product(Request::new(DeleteProductRequest {
            product_id: id,
            supplier_id: 10,
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.message, "product is deleted");

    let status = t
        .service
        .get_product(Request::new(GetProductRequest { product_id: id }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn test_categories_round_trip() {
    let t = start(false).await;

    let reply = t
        .service
        .create_category(Request::new(CreateCategoryRequest {
            category_id: 7,
            name: "Books".to_string(),
            thumbnail: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.message, "category is created");

    let status = t
        .service
        .create_category(Request::new(CreateCategoryRequest {
            category_id: 7,
            name: "More books".to_string(),
            thumbnail: None,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::AlreadyExists);

    let listed = t
        .service
        .get_list_category(Request::new(()))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(listed.list_category.len(), 1);
    assert_eq!(listed.list_category[0].category_id, 7);
    assert_eq!(listed.list_category[0].name, "Books");
}

#[tokio::test]
async fn test_admin_delete_requires_admin_token() {
    let t = start(true).await;
    t.auth.grant("supplier-token", 10, "supplier").await;
    t.auth.grant("admin-token", 1, "admin").await;

    let status = t
        .service
        .create_product(Request::new(product_request("Kettle", 100, 5, 1)))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
    assert_eq!(t.auth.call_count(), 0);

    let id = t
        .service
        .create_product(with_token(product_request("Kettle", 100, 5, 1), "supplier-token"))
        .await
        .unwrap()
        .into_inner()
        .product_id;

    let status = t
        .service
        .delete_product_by_admin(with_token(
            DeleteProductByAdminRequest { product_id: id },
            "supplier-token",
        ))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);

    let reply = t
        .service
        .delete_product_by_admin(with_token(
            DeleteProductByAdminRequest { product_id: id },
            "admin-token",
        ))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.message, "product is deleted");

    let status = t
        .service
        .delete_product_by_admin(with_token(
            DeleteProductByAdminRequest { product_id: id },
            "admin-token",
        ))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}
