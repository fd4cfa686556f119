//! Clients for the sibling services this one depends on.
//!
//! Each peer is a trait so the service can run against gRPC clients in
//! production and in-memory mocks in tests:
//! - `ReviewPeer`: star ratings per product
//! - `OrderPeer`: units sold per product
//! - `ImagePeer`: client-streaming thumbnail upload
//! - `AuthPeer`: token to claims resolution

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::Endpoint;
use tracing::info;

use crate::config::{PeerEndpoint, PeersConfig};
use crate::context::CallContext;

mod grpc;
mod image;
pub mod mock;

pub use grpc::{GrpcAuthPeer, GrpcOrderPeer, GrpcReviewPeer};
pub use image::GrpcImagePeer;

/// Result type for peer calls.
pub type Result<T> = std::result::Result<T, PeerError>;

/// Errors that can occur when calling a peer service.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("Connection failed to {peer}: {message}")]
    Connection { peer: &'static str, message: String },

    #[error("gRPC error: {0}")]
    Grpc(Box<tonic::Status>),

    #[error("Deadline exceeded calling {0}")]
    Timeout(String),

    #[error("Upload stream closed by peer")]
    StreamClosed,
}

impl From<tonic::Status> for PeerError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::DeadlineExceeded => PeerError::Timeout(status.message().to_string()),
            _ => PeerError::Grpc(Box::new(status)),
        }
    }
}

/// A single review as far as this service cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Review {
    pub num_star: i32,
}

/// Identity resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub role: String,
}

/// One message of an image upload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadMessage {
    /// Stream header naming the image type (e.g. `png`).
    Info { image_type: String },
    /// Raw image bytes.
    Chunk(Vec<u8>),
}

/// Review service client.
#[async_trait]
pub trait ReviewPeer: Send + Sync {
    /// All reviews recorded for a product.
    async fn reviews_for_product(&self, product_id: i64, ctx: &CallContext) -> Result<Vec<Review>>;
}

/// Order service client.
#[async_trait]
pub trait OrderPeer: Send + Sync {
    /// Units of a product sold so far.
    async fn sold_count(&self, product_id: i64, ctx: &CallContext) -> Result<i64>;
}

/// Image service client.
#[async_trait]
pub trait ImagePeer: Send + Sync {
    /// Open a client-streaming upload.
    async fn open_upload(&self, ctx: &CallContext) -> Result<Box<dyn UploadStream>>;
}

/// An open upload stream. Dropping it without closing abandons the upload.
#[async_trait]
pub trait UploadStream: Send {
    /// Send one message.
    async fn send(&mut self, message: UploadMessage) -> Result<()>;

    /// Half-close the stream and wait for the stored image URL.
    async fn close_and_recv(self: Box<Self>) -> Result<String>;
}

/// Auth service client.
#[async_trait]
pub trait AuthPeer: Send + Sync {
    /// Resolve a bearer token to claims.
    async fn claims(&self, token: &str, ctx: &CallContext) -> Result<Claims>;
}

/// The full set of peers the service talks to.
#[derive(Clone)]
pub struct Peers {
    pub review: Arc<dyn ReviewPeer>,
    pub order: Arc<dyn OrderPeer>,
    pub image: Arc<dyn ImagePeer>,
    pub auth: Option<Arc<dyn AuthPeer>>,
}

/// Build gRPC clients for every configured peer.
///
/// Review, order and auth channels connect lazily so the service can start
/// before its peers; the image channel connects on first upload.
pub fn connect_peers(config: &PeersConfig) -> Result<Peers> {
    let review = endpoint("review", &config.review)?.connect_lazy();
    let order = endpoint("order", &config.order)?.connect_lazy();
    let image = endpoint("image", &config.image)?;

    let auth: Option<Arc<dyn AuthPeer>> = match &config.auth {
        Some(auth) => {
            let channel = endpoint("auth", auth)?.connect_lazy();
            Some(Arc::new(GrpcAuthPeer::new(channel, auth.timeout())))
        }
        None => None,
    };

    info!(
        review = %config.review.address,
        order = %config.order.address,
        image = %config.image.address,
        auth = config.auth.as_ref().map(|a| a.address.as_str()).unwrap_or("disabled"),
        "Peers configured"
    );

    Ok(Peers {
        review: Arc::new(GrpcReviewPeer::new(review, config.review.timeout())),
        order: Arc::new(GrpcOrderPeer::new(order, config.order.timeout())),
        image: Arc::new(GrpcImagePeer::new(image, config.image.timeout())),
        auth,
    })
}

fn endpoint(peer: &'static str, config: &PeerEndpoint) -> Result<Endpoint> {
    Endpoint::from_shared(config.address.clone()).map_err(|e| PeerError::Connection {
        peer,
        message: e.to_string(),
    })
}

/// Run a unary peer call bounded by `budget`.
pub(crate) async fn call_with_deadline<T, F>(
    peer: &'static str,
    budget: Duration,
    call: F,
) -> Result<T>
where
    F: Future<Output = std::result::Result<tonic::Response<T>, tonic::Status>>,
{
    match tokio::time::timeout(budget, call).await {
        Ok(response) => Ok(response?.into_inner()),
        Err(_) => Err(PeerError::Timeout(peer.to_string())),
    }
}
