//! Read-time enrichment of products with review and order data.
//!
//! Each product gets its star average from the review service and its sold
//! count from the order service. A failing peer only zeroes the field it
//! feeds; the product itself is always returned.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::context::CallContext;
use crate::model::{EnrichedProduct, Product};
use crate::peers::{OrderPeer, Review, ReviewPeer};

/// Default number of products enriched at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Mean of the strictly positive star ratings, 0 when there are none.
pub fn star_average(reviews: &[Review]) -> f32 {
    let (sum, count) = reviews
        .iter()
        .filter(|review| review.num_star > 0)
        .fold((0_i64, 0_i64), |(sum, count), review| {
            (sum + i64::from(review.num_star), count + 1)
        });

    if count == 0 {
        return 0.0;
    }
    (sum as f64 / count as f64) as f32
}

/// Composes stored products with peer data.
#[derive(Clone)]
pub struct Enricher {
    reviews: Arc<dyn ReviewPeer>,
    orders: Arc<dyn OrderPeer>,
    concurrency: usize,
}

impl Enricher {
    /// A concurrency of 0 is treated as 1.
    pub fn with_concurrency(
        reviews: Arc<dyn ReviewPeer>,
        orders: Arc<dyn OrderPeer>,
        concurrency: usize,
    ) -> Self {
        Self {
            reviews,
            orders,
            concurrency: concurrency.max(1),
        }
    }

    /// Enrich one product. Never fails.
    pub async fn enrich(&self, product: Product, ctx: &CallContext) -> EnrichedProduct {
        let id = product.id;
        let (reviews, sold) = tokio::join!(
            self.reviews.reviews_for_product(id, ctx),
            self.orders.sold_count(id, ctx),
        );

        let mut enriched = EnrichedProduct::bare(product);

        match reviews {
            Ok(reviews) => enriched.star_average = star_average(&reviews),
            Err(e) => {
                warn!(product_id = id, error = %e, "Review lookup failed, star average set to 0")
            }
        }

        match sold {
            Ok(count) => enriched.total_sold = count,
            Err(e) => {
                warn!(product_id = id, error = %e, "Sold count lookup failed, total sold set to 0")
            }
        }

        enriched
    }

    /// Enrich a list, at most `concurrency` products at a time.
    ///
    /// Output order matches input order. Dropping the returned future
    /// abandons calls not yet completed.
    pub async fn enrich_all(
        &self,
        products: Vec<Product>,
        ctx: &CallContext,
    ) -> Vec<EnrichedProduct> {
        stream::iter(products)
            .map(|product| self.enrich(product, ctx))
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
