//! Shared storage integration tests.
//!
//! Tests the ProductStore and CategoryStore interfaces against all
//! implementations. Each backend test file runs these functions against its
//! own store. Tests share one store, so each uses its own category, supplier
//! and id ranges.

pub mod category_store_tests;
pub mod product_store_tests;
