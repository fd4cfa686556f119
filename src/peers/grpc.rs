//! Unary gRPC peer clients.

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::Channel;

use super::{call_with_deadline, AuthPeer, Claims, OrderPeer, Result, Review, ReviewPeer};
use crate::context::CallContext;
use crate::proto::{
    auth_service_client::AuthServiceClient, order_service_client::OrderServiceClient,
    review_service_client::ReviewServiceClient, GetAllReviewByProductIdRequest,
    GetSoldProductRequest, GetUserClaimsRequest,
};

/// Review service over gRPC.
pub struct GrpcReviewPeer {
    client: ReviewServiceClient<Channel>,
    timeout: Duration,
}

impl GrpcReviewPeer {
    pub fn new(channel: Channel, timeout: Duration) -> Self {
        Self {
            client: ReviewServiceClient::new(channel),
            timeout,
        }
    }
}

#[async_trait]
impl ReviewPeer for GrpcReviewPeer {
    async fn reviews_for_product(&self, product_id: i64, ctx: &CallContext) -> Result<Vec<Review>> {
        let mut client = self.client.clone();
        let request = ctx.peer_request(GetAllReviewByProductIdRequest { product_id }, self.timeout);

        let response = call_with_deadline(
            "review",
            ctx.budget(self.timeout),
            client.get_all_review_by_product_id(request),
        )
        .await?;

        Ok(response
            .list_review
            .into_iter()
            .map(|review| Review {
                num_star: review.num_star,
            })
            .collect())
    }
}

/// Order service over gRPC.
pub struct GrpcOrderPeer {
    client: OrderServiceClient<Channel>,
    timeout: Duration,
}

impl GrpcOrderPeer {
    pub fn new(channel: Channel, timeout: Duration) -> Self {
        Self {
            client: OrderServiceClient::new(channel),
            timeout,
        }
    }
}

#[async_trait]
impl OrderPeer for GrpcOrderPeer {
    async fn sold_count(&self, product_id: i64, ctx: &CallContext) -> Result<i64> {
        let mut client = self.client.clone();
        let request = ctx.peer_request(GetSoldProductRequest { product_id }, self.timeout);

        let response =
            call_with_deadline("order", ctx.budget(self.timeout), client.get_sold_product(request))
                .await?;

        Ok(response.count)
    }
}

/// Auth service over gRPC.
pub struct GrpcAuthPeer {
    client: AuthServiceClient<Channel>,
    timeout: Duration,
}

impl GrpcAuthPeer {
    pub fn new(channel: Channel, timeout: Duration) -> Self {
        Self {
            client: AuthServiceClient::new(channel),
            timeout,
        }
    }
}

#[async_trait]
impl AuthPeer for GrpcAuthPeer {
    async fn claims(&self, token: &str, ctx: &CallContext) -> Result<Claims> {
        let mut client = self.client.clone();
        let request = ctx.peer_request(
            GetUserClaimsRequest {
                token: token.to_string(),
            },
            self.timeout,
        );

        let claims =
            call_with_deadline("auth", ctx.budget(self.timeout), client.get_user_claims(request))
                .await?;

        Ok(Claims {
            user_id: claims.user_id,
            role: claims.role,
        })
    }
}
