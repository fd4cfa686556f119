//! Mock peers for testing.
//!
//! Each mock records how it was called and can be told to fail or to
//! delay its response.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    AuthPeer, Claims, ImagePeer, OrderPeer, PeerError, Result, Review, ReviewPeer, UploadMessage,
    UploadStream,
};
use crate::context::CallContext;

fn unavailable(peer: &'static str) -> PeerError {
    PeerError::Connection {
        peer,
        message: "Mock connection failure".to_string(),
    }
}

/// Tracks concurrent calls and the high-water mark.
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    max: AtomicUsize,
    total: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock review service.
#[derive(Default)]
pub struct MockReviewPeer {
    reviews: RwLock<HashMap<i64, Vec<Review>>>,
    fail: RwLock<bool>,
    fail_for: RwLock<Vec<i64>>,
    delay: RwLock<Option<Duration>>,
    in_flight: InFlight,
}

impl MockReviewPeer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the star ratings returned for a product.
    pub async fn set_stars(&self, product_id: i64, stars: &[i32]) {
        let reviews = stars.iter().map(|&num_star| Review { num_star }).collect();
        self.reviews.write().await.insert(product_id, reviews);
    }

    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    /// Fail only calls for the given product.
    pub async fn fail_for(&self, product_id: i64) {
        self.fail_for.write().await.push(product_id);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub fn call_count(&self) -> usize {
        self.in_flight.total.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.in_flight.max.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewPeer for MockReviewPeer {
    async fn reviews_for_product(
        &self,
        product_id: i64,
        _ctx: &CallContext,
    ) -> Result<Vec<Review>> {
        self.in_flight.enter();
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failed =
            *self.fail.read().await || self.fail_for.read().await.contains(&product_id);
        let result = if failed {
            Err(unavailable("review"))
        } else {
            Ok(self
                .reviews
                .read()
                .await
                .get(&product_id)
                .cloned()
                .unwrap_or_default())
        };
        self.in_flight.exit();
        result
    }
}

/// Mock order service.
#[derive(Default)]
pub struct MockOrderPeer {
    sold: RwLock<HashMap<i64, i64>>,
    fail: RwLock<bool>,
    delay: RwLock<Option<Duration>>,
    in_flight: InFlight,
}

impl MockOrderPeer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_sold(&self, product_id: i64, count: i64) {
        self.sold.write().await.insert(product_id, count);
    }

    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub fn call_count(&self) -> usize {
        self.in_flight.total.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.in_flight.max.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderPeer for MockOrderPeer {
    async fn sold_count(&self, product_id: i64, _ctx: &CallContext) -> Result<i64> {
        self.in_flight.enter();
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = if *self.fail.read().await {
            Err(unavailable("order"))
        } else {
            Ok(self
                .sold
                .read()
                .await
                .get(&product_id)
                .copied()
                .unwrap_or_default())
        };
        self.in_flight.exit();
        result
    }
}

/// Upload phase a `MockImagePeer` should fail in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFailure {
    Open,
    Send,
    Close,
}

/// Mock image service.
pub struct MockImagePeer {
    url: String,
    failure: RwLock<Option<UploadFailure>>,
    opened: AtomicUsize,
    received: Arc<RwLock<Vec<UploadMessage>>>,
}

impl Default for MockImagePeer {
    fn default() -> Self {
        Self::new("https://images.example/mock.png")
    }
}

impl MockImagePeer {
    /// Mock that answers every upload with `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            failure: RwLock::new(None),
            opened: AtomicUsize::new(0),
            received: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_failure(&self, failure: Option<UploadFailure>) {
        *self.failure.write().await = failure;
    }

    /// Number of upload streams opened (including failed opens).
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Every message received across all streams, in order.
    pub async fn received(&self) -> Vec<UploadMessage> {
        self.received.read().await.clone()
    }
}

#[async_trait]
impl ImagePeer for MockImagePeer {
    async fn open_upload(&self, _ctx: &CallContext) -> Result<Box<dyn UploadStream>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let failure = *self.failure.read().await;
        if failure == Some(UploadFailure::Open) {
            return Err(unavailable("image"));
        }
        Ok(Box::new(MockUploadStream {
            url: self.url.clone(),
            failure,
            received: Arc::clone(&self.received),
        }))
    }
}

struct MockUploadStream {
    url: String,
    failure: Option<UploadFailure>,
    received: Arc<RwLock<Vec<UploadMessage>>>,
}

#[async_trait]
impl UploadStream for MockUploadStream {
    async fn send(&mut self, message: UploadMessage) -> Result<()> {
        if self.failure == Some(UploadFailure::Send) {
            return Err(PeerError::StreamClosed);
        }
        self.received.write().await.push(message);
        Ok(())
    }

    async fn close_and_recv(self: Box<Self>) -> Result<String> {
        if self.failure == Some(UploadFailure::Close) {
            return Err(PeerError::Grpc(Box::new(tonic::Status::internal(
                "Mock close failure",
            ))));
        }
        Ok(self.url)
    }
}

/// Mock auth service.
#[derive(Default)]
pub struct MockAuthPeer {
    tokens: RwLock<HashMap<String, Claims>>,
    unreachable: RwLock<bool>,
    calls: AtomicUsize,
}

impl MockAuthPeer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as a user with `role`.
    pub async fn grant(&self, token: &str, user_id: i64, role: &str) {
        self.tokens.write().await.insert(
            token.to_string(),
            Claims {
                user_id,
                role: role.to_string(),
            },
        );
    }

    pub async fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.write().await = unreachable;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthPeer for MockAuthPeer {
    async fn claims(&self, token: &str, _ctx: &CallContext) -> Result<Claims> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.unreachable.read().await {
            return Err(unavailable("auth"));
        }
        self.tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| {
                PeerError::Grpc(Box::new(tonic::Status::unauthenticated("unknown token")))
            })
    }
}
