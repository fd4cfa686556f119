//! Product catalog gRPC service.
//!
//! Every RPC follows the same shape: read the call context, validate the
//! request, pass the authorization gate for mutations, touch the store (and
//! the image service on create), enrich reads, and shape the reply.

use std::future::Future;
use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{debug, error, info, warn, Instrument};

use super::auth::{AuthGate, Role};
use super::enrichment::{Enricher, DEFAULT_CONCURRENCY};
use super::error::{Result, ServiceError};
use super::upload::ImageUploader;
use crate::config::Config;
use crate::context::CallContext;
use crate::model::{NewCategory, NewProduct, Product, ProductUpdate};
use crate::peers::{Claims, Peers};
use crate::proto::{
    self, product_service_server::ProductService, CreateCategoryRequest, CreateProductRequest,
    CreateProductResponse, DeleteProductByAdminRequest, DeleteProductRequest, GeneralResponse,
    GetListCategoryResponse, GetListProductByIdsRequest, GetListProductRequest,
    GetListProductResponse, GetProductBySupplierRequest, GetProductInventoryRequest,
    GetProductInventoryResponse, GetProductRequest, GetRecommendProductRequest,
    InventoryAdjustmentRequest, Pong, UpdateProductRequest,
};
use crate::storage::{CategoryStore, Page, ProductFilter, ProductListing, ProductStore, Stores};
use crate::utils::Observability;

/// Default page size when a request leaves `limit` at 0.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Tunables for the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    pub enrichment_concurrency: usize,
    pub default_page_size: u64,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            enrichment_concurrency: DEFAULT_CONCURRENCY,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CatalogOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enrichment_concurrency: config.enrichment.concurrency,
            default_page_size: config.pagination.default_limit,
        }
    }
}

/// Product catalog service.
pub struct ProductCatalogService {
    products: Arc<dyn ProductStore>,
    categories: Arc<dyn CategoryStore>,
    enricher: Enricher,
    uploader: ImageUploader,
    auth: AuthGate,
    observability: Arc<Observability>,
    default_page_size: u64,
}

impl ProductCatalogService {
    pub fn new(
        stores: Stores,
        peers: Peers,
        observability: Arc<Observability>,
        options: CatalogOptions,
    ) -> Self {
        let (products, categories) = stores;
        Self {
            products,
            categories,
            enricher: Enricher::with_concurrency(
                peers.review,
                peers.order,
                options.enrichment_concurrency,
            ),
            uploader: ImageUploader::new(peers.image),
            auth: AuthGate::from_peer(peers.auth),
            observability,
            default_page_size: options.default_page_size.max(1),
        }
    }

    /// Run one RPC body inside its span, bounded by the inbound deadline,
    /// and map its error to a status.
    async fn observe<T, F>(
        &self,
        method: &'static str,
        ctx: &CallContext,
        body: F,
    ) -> std::result::Result<Response<T>, Status>
    where
        F: Future<Output = Result<T>>,
    {
        let span = self.observability.rpc_span(method);
        // tonic's server also enforces `grpc-timeout`; this bound covers
        // handlers invoked directly and reports the expiry in the rpc span.
        let remaining = ctx.remaining();

        async move {
            let outcome = match remaining {
                Some(remaining) => match tokio::time::timeout(remaining, body).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!("Inbound deadline exceeded");
                        return Err(Status::deadline_exceeded("deadline exceeded"));
                    }
                },
                None => body.await,
            };

            match outcome {
                Ok(reply) => Ok(Response::new(reply)),
                Err(err) => {
                    match &err {
                        ServiceError::Storage(e) => error!(error = %e, "Store operation failed"),
                        ServiceError::Upload(e) => warn!(error = %e, "Thumbnail upload failed"),
                        ServiceError::AuthUnavailable(e) => {
                            warn!(error = %e, "Auth service unavailable")
                        }
                        other => debug!(error = %other, "Request rejected"),
                    }
                    Err(err.into())
                }
            }
        }
        .instrument(span)
        .await
    }

    fn page(&self, limit: i32, offset: i32) -> Result<Page> {
        Ok(Page::new(limit, offset, self.default_page_size)?)
    }

    async fn enriched_list(
        &self,
        products: Vec<Product>,
        ctx: &CallContext,
    ) -> GetListProductResponse {
        let enriched = self.enricher.enrich_all(products, ctx).await;
        GetListProductResponse {
            list_product: enriched.into_iter().map(Into::into).collect(),
        }
    }

    async fn create_product_inner(
        &self,
        req: CreateProductRequest,
        ctx: &CallContext,
    ) -> Result<CreateProductResponse> {
        if req.product_name.trim().is_empty() {
            return Err(invalid("product name must not be empty"));
        }
        if req.price <= 0 {
            return Err(invalid("price must be greater than 0"));
        }
        if req.inventory <= 0 {
            return Err(invalid("inventory must be greater than 0"));
        }

        self.auth.require(Role::Supplier, ctx).await?;

        let thumbnail = self.uploader.upload(&req.thumbnail_data_chunk, ctx).await?;

        let product = self
            .products
            .create(NewProduct {
                name: req.product_name,
                description: req.desc,
                price: req.price,
                thumbnail,
                inventory: req.inventory,
                supplier_id: req.supplier_id,
                category_id: req.category_id,
                brand: req.brand,
            })
            .await?;

        info!(product_id = product.id, supplier_id = product.supplier_id, "Product created");
        Ok(CreateProductResponse {
            message: "product is created".to_string(),
            product_id: product.id,
        })
    }

    async fn get_product_inner(
        &self,
        req: GetProductRequest,
        ctx: &CallContext,
    ) -> Result<proto::Product> {
        let product = self
            .products
            .get(req.product_id)
            .await?
            .ok_or_else(|| not_found(req.product_id))?;

        Ok(self.enricher.enrich(product, ctx).await.into())
    }

    async fn get_list_product_inner(
        &self,
        req: GetListProductRequest,
        ctx: &CallContext,
    ) -> Result<GetListProductResponse> {
        let category = match req.category_id {
            0 => None,
            id if id < 0 => return Err(invalid("category_id must not be negative")),
            id => Some(id),
        };
        let filter = ProductFilter {
            by_recency: req.by_time,
            by_price_asc: req.by_price_inc,
            by_price_desc: req.by_price_desc,
        };
        let listing = ProductListing::new(category, self.page(req.limit, req.offset)?, filter);

        let products = self.products.list(&listing).await?;
        Ok(self.enriched_list(products, ctx).await)
    }

    async fn get_recommend_product_inner(
        &self,
        req: GetRecommendProductRequest,
        ctx: &CallContext,
    ) -> Result<GetListProductResponse> {
        let page = self.page(req.limit, req.offset)?;
        let products = self.products.list_recommended(page).await?;
        Ok(self.enriched_list(products, ctx).await)
    }

    async fn get_product_by_supplier_inner(
        &self,
        req: GetProductBySupplierRequest,
        ctx: &CallContext,
    ) -> Result<GetListProductResponse> {
        let page = self.page(req.limit, req.offset)?;
        let products = self.products.list_by_supplier(req.supplier_id, page).await?;
        Ok(self.enriched_list(products, ctx).await)
    }

    async fn get_list_product_by_ids_inner(
        &self,
        req: GetListProductByIdsRequest,
        ctx: &CallContext,
    ) -> Result<GetListProductResponse> {
        if req.list_id.is_empty() {
            return Ok(GetListProductResponse::default());
        }
        let products = self.products.list_by_ids(&req.list_id).await?;
        Ok(self.enriched_list(products, ctx).await)
    }

    async fn update_product_inner(
        &self,
        req: UpdateProductRequest,
        ctx: &CallContext,
    ) -> Result<GeneralResponse> {
        if req.name.trim().is_empty() {
            return Err(invalid("product name must not be empty"));
        }
        if req.price <= 0 {
            return Err(invalid("price must be greater than 0"));
        }
        if req.inventory < 0 {
            return Err(invalid("inventory must not be negative"));
        }

        let claims = self.auth.require(Role::Supplier, ctx).await?;
        ensure_owner(claims.as_ref(), req.supplier_id)?;

        let affected = self
            .products
            .update(ProductUpdate {
                id: req.product_id,
                supplier_id: req.supplier_id,
                name: req.name,
                price: req.price,
                inventory: req.inventory,
                brand: req.brand,
            })
            .await?;
        if affected == 0 {
            return Err(not_owned(req.product_id, req.supplier_id));
        }

        info!(product_id = req.product_id, "Product updated");
        Ok(general("product is updated"))
    }

    async fn delete_product_inner(
        &self,
        req: DeleteProductRequest,
        ctx: &CallContext,
    ) -> Result<GeneralResponse> {
        let claims = self.auth.require(Role::Supplier, ctx).await?;
        ensure_owner(claims.as_ref(), req.supplier_id)?;

        let affected = self.products.delete(req.product_id, req.supplier_id).await?;
        if affected == 0 {
            return Err(not_owned(req.product_id, req.supplier_id));
        }

        info!(product_id = req.product_id, "Product deleted");
        Ok(general("product is deleted"))
    }

    async fn delete_product_by_admin_inner(
        &self,
        req: DeleteProductByAdminRequest,
        ctx: &CallContext,
    ) -> Result<GeneralResponse> {
        self.auth.require(Role::Admin, ctx).await?;

        let affected = self.products.delete_by_id(req.product_id).await?;
        if affected == 0 {
            return Err(not_found(req.product_id));
        }

        info!(product_id = req.product_id, "Product deleted by admin");
        Ok(general("product is deleted"))
    }

    async fn desc_inventory_inner(
        &self,
        req: InventoryAdjustmentRequest,
    ) -> Result<GeneralResponse> {
        if req.count <= 0 {
            return Err(invalid("count must be greater than 0"));
        }

        let affected = self
            .products
            .decrement_inventory(req.product_id, req.count)
            .await?;
        if affected == 0 {
            return match self.products.inventory(req.product_id).await? {
                None => Err(not_found(req.product_id)),
                Some(_) => Err(ServiceError::InsufficientInventory {
                    product_id: req.product_id,
                    requested: req.count,
                }),
            };
        }

        debug!(product_id = req.product_id, count = req.count, "Inventory decreased");
        Ok(general("inventory is decreased"))
    }

    async fn inc_inventory_inner(
        &self,
        req: InventoryAdjustmentRequest,
    ) -> Result<GeneralResponse> {
        if req.count <= 0 {
            return Err(invalid("count must be greater than 0"));
        }

        let affected = self
            .products
            .increment_inventory(req.product_id, req.count)
            .await?;
        if affected == 0 {
            return Err(not_found(req.product_id));
        }

        debug!(product_id = req.product_id, count = req.count, "Inventory increased");
        Ok(general("inventory is increased"))
    }

    async fn get_product_inventory_inner(
        &self,
        req: GetProductInventoryRequest,
    ) -> Result<GetProductInventoryResponse> {
        let count = self
            .products
            .inventory(req.product_id)
            .await?
            .ok_or_else(|| not_found(req.product_id))?;

        Ok(GetProductInventoryResponse {
            count: i64::from(count),
        })
    }

    async fn create_category_inner(
        &self,
        req: CreateCategoryRequest,
        ctx: &CallContext,
    ) -> Result<GeneralResponse> {
        if req.category_id <= 0 {
            return Err(invalid("category_id must be greater than 0"));
        }
        if req.name.trim().is_empty() {
            return Err(invalid("category name must not be empty"));
        }

        self.auth.require(Role::Admin, ctx).await?;

        let category = self
            .categories
            .create(NewCategory {
                id: req.category_id,
                name: req.name,
                thumbnail: req.thumbnail,
            })
            .await?;

        info!(category_id = category.id, "Category created");
        Ok(general("category is created"))
    }

    async fn get_list_category_inner(&self) -> Result<GetListCategoryResponse> {
        let categories = self.categories.list().await?;
        Ok(GetListCategoryResponse {
            list_category: categories.into_iter().map(Into::into).collect(),
        })
    }
}

fn invalid(message: &str) -> ServiceError {
    ServiceError::InvalidRequest(message.to_string())
}

fn not_found(product_id: i64) -> ServiceError {
    ServiceError::NotFound(format!("product {product_id}"))
}

fn not_owned(product_id: i64, supplier_id: i64) -> ServiceError {
    ServiceError::NotFound(format!("product {product_id} for supplier {supplier_id}"))
}

fn general(message: &str) -> GeneralResponse {
    GeneralResponse {
        message: message.to_string(),
    }
}

/// A supplier may only act on its own products; admins act on any.
fn ensure_owner(claims: Option<&Claims>, supplier_id: i64) -> Result<()> {
    match claims {
        Some(claims) if claims.role != Role::Admin.as_str() && claims.user_id != supplier_id => {
            Err(ServiceError::PermissionDenied(format!(
                "user {} cannot act for supplier {supplier_id}",
                claims.user_id
            )))
        }
        _ => Ok(()),
    }
}

#[tonic::async_trait]
impl ProductService for ProductCatalogService {
    async fn ping(&self, request: Request<()>) -> std::result::Result<Response<Pong>, Status> {
        let ctx = CallContext::from_request(&request);
        self.observe("Ping", &ctx, async {
            Ok(Pong {
                message: "pong".to_string(),
            })
        })
        .await
    }

    async fn create_product(
        &self,
        request: Request<CreateProductRequest>,
    ) -> std::result::Result<Response<CreateProductResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe("CreateProduct", &ctx, self.create_product_inner(req, &ctx))
            .await
    }

    async fn get_product(
        &self,
        request: Request<GetProductRequest>,
    ) -> std::result::Result<Response<proto::Product>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe("GetProduct", &ctx, self.get_product_inner(req, &ctx))
            .await
    }

    async fn get_list_product(
        &self,
        request: Request<GetListProductRequest>,
    ) -> std::result::Result<Response<GetListProductResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe("GetListProduct", &ctx, self.get_list_product_inner(req, &ctx))
            .await
    }

    async fn get_recommend_product(
        &self,
        request: Request<GetRecommendProductRequest>,
    ) -> std::result::Result<Response<GetListProductResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe(
            "GetRecommendProduct",
            &ctx,
            self.get_recommend_product_inner(req, &ctx),
        )
        .await
    }

    async fn get_product_by_supplier(
        &self,
        request: Request<GetProductBySupplierRequest>,
    ) -> std::result::Result<Response<GetListProductResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe(
            "GetProductBySupplier",
            &ctx,
            self.get_product_by_supplier_inner(req, &ctx),
        )
        .await
    }

    async fn get_list_product_by_ids(
        &self,
        request: Request<GetListProductByIdsRequest>,
    ) -> std::result::Result<Response<GetListProductResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe(
            "GetListProductByIds",
            &ctx,
            self.get_list_product_by_ids_inner(req, &ctx),
        )
        .await
    }

    async fn update_product(
        &self,
        request: Request<UpdateProductRequest>,
    ) -> std::result::Result<Response<GeneralResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe("UpdateProduct", &ctx, self.update_product_inner(req, &ctx))
            .await
    }

    async fn delete_product(
        &self,
        request: Request<DeleteProductRequest>,
    ) -> std::result::Result<Response<GeneralResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe("DeleteProduct", &ctx, self.delete_product_inner(req, &ctx))
            .await
    }

    async fn delete_product_by_admin(
        &self,
        request: Request<DeleteProductByAdminRequest>,
    ) -> std::result::Result<Response<GeneralResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe(
            "DeleteProductByAdmin",
            &ctx,
            self.delete_product_by_admin_inner(req, &ctx),
        )
        .await
    }

    async fn desc_inventory(
        &self,
        request: Request<InventoryAdjustmentRequest>,
    ) -> std::result::Result<Response<GeneralResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe("DescInventory", &ctx, self.desc_inventory_inner(req))
            .await
    }

    async fn inc_inventory(
        &self,
        request: Request<InventoryAdjustmentRequest>,
    ) -> std::result::Result<Response<GeneralResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe("IncInventory", &ctx, self.inc_inventory_inner(req))
            .await
    }

    async fn get_product_inventory(
        &self,
        request: Request<GetProductInventoryRequest>,
    ) -> std::result::Result<Response<GetProductInventoryResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe(
            "GetProductInventory",
            &ctx,
            self.get_product_inventory_inner(req),
        )
        .await
    }

    async fn create_category(
        &self,
        request: Request<CreateCategoryRequest>,
    ) -> std::result::Result<Response<GeneralResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        let req = request.into_inner();
        self.observe("CreateCategory", &ctx, self.create_category_inner(req, &ctx))
            .await
    }

    async fn get_list_category(
        &self,
        request: Request<()>,
    ) -> std::result::Result<Response<GetListCategoryResponse>, Status> {
        let ctx = CallContext::from_request(&request);
        self.observe("GetListCategory", &ctx, self.get_list_category_inner())
            .await
    }
}
