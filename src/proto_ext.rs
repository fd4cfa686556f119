//! Conversions between catalog records and wire types.

use chrono::{DateTime, Utc};

use crate::model::{Category, EnrichedProduct};
use crate::proto;

/// Convert a UTC datetime to a protobuf Timestamp.
pub fn to_timestamp(dt: &DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

impl From<EnrichedProduct> for proto::Product {
    fn from(enriched: EnrichedProduct) -> Self {
        let EnrichedProduct {
            product,
            star_average,
            total_sold,
        } = enriched;

        proto::Product {
            product_id: product.id,
            supplier_id: product.supplier_id,
            category_id: product.category_id,
            name: product.name,
            desc: product.description,
            price: product.price,
            thumbnail: product.thumbnail,
            inventory: product.inventory,
            created_at: Some(to_timestamp(&product.created_at)),
            brand: product.brand,
            star_average,
            total_sold,
        }
    }
}

impl From<Category> for proto::Category {
    fn from(category: Category) -> Self {
        proto::Category {
            category_id: category.id,
            name: category.name,
            thumbnail: category.thumbnail,
            created_at: Some(to_timestamp(&category.created_at)),
        }
    }
}
