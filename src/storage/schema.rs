//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.
//! The tables themselves are created by the files under `migrations/`.

use sea_query::Iden;

/// Product table schema.
#[derive(Iden, Clone, Copy)]
pub enum Products {
    #[iden = "product"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "description"]
    Description,
    #[iden = "price"]
    Price,
    #[iden = "thumbnail"]
    Thumbnail,
    #[iden = "inventory"]
    Inventory,
    #[iden = "supplier_id"]
    SupplierId,
    #[iden = "category_id"]
    CategoryId,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "brand"]
    Brand,
}

/// Columns selected for every product read, in row-decoding order.
pub const PRODUCT_COLUMNS: [Products; 10] = [
    Products::Id,
    Products::Name,
    Products::Description,
    Products::Price,
    Products::Thumbnail,
    Products::Inventory,
    Products::SupplierId,
    Products::CategoryId,
    Products::CreatedAt,
    Products::Brand,
];

/// Category table schema.
#[derive(Iden, Clone, Copy)]
pub enum Categories {
    #[iden = "category"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "thumbnail"]
    Thumbnail,
    #[iden = "created_at"]
    CreatedAt,
}

/// Columns selected for every category read.
pub const CATEGORY_COLUMNS: [Categories; 4] = [
    Categories::Id,
    Categories::Name,
    Categories::Thumbnail,
    Categories::CreatedAt,
];
