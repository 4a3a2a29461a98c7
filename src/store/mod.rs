//! Persistence contract.
//!
//! Handlers and services only see [`Store`]; [`PgStore`] backs production and
//! [`MemoryStore`] backs tests and database-less development runs. Every
//! multi-row write (order header plus lines) is a single atomic unit in both.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use crate::domain::aggregates::{
    Brand, BrandInput, Category, CategoryInput, Order, OrderLine, OrderLineView, Product, ProductInput, Setting,
    SettingsUpdate, User,
};
use crate::Result;

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Query string of every list endpoint. Without `page`/`limit` the whole
/// collection is returned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    #[serde(alias = "limit")]
    pub per_page: Option<u32>,
}

impl ListParams {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// `(limit, offset)` when pagination was requested.
    pub fn window(&self) -> Option<(i64, i64)> {
        if self.page.is_none() && self.per_page.is_none() { return None; }
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        Some((per_page as i64, ((page - 1) as i64) * per_page as i64))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> { pub items: Vec<T>, pub total: i64 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts { pub categories: i64, pub brands: i64, pub products: i64, pub orders: i64 }

#[async_trait]
pub trait Store: Send + Sync {
    // --- categories ---
    async fn list_categories(&self, params: &ListParams) -> Result<Page<Category>>;
    async fn find_category(&self, id: Uuid) -> Result<Option<Category>>;
    async fn insert_category(&self, input: CategoryInput) -> Result<Category>;
    async fn update_category(&self, id: Uuid, input: CategoryInput) -> Result<Option<Category>>;
    async fn delete_category(&self, id: Uuid) -> Result<bool>;

    // --- brands ---
    async fn list_brands(&self, params: &ListParams) -> Result<Page<Brand>>;
    async fn find_brand(&self, id: Uuid) -> Result<Option<Brand>>;
    async fn insert_brand(&self, input: BrandInput) -> Result<Brand>;
    async fn update_brand(&self, id: Uuid, input: BrandInput) -> Result<Option<Brand>>;
    async fn delete_brand(&self, id: Uuid) -> Result<bool>;

    // --- products ---
    async fn list_products(&self, params: &ListParams) -> Result<Page<Product>>;
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>>;
    async fn insert_product(&self, input: ProductInput) -> Result<Product>;
    async fn update_product(&self, id: Uuid, input: ProductInput) -> Result<Option<Product>>;
    async fn delete_product(&self, id: Uuid) -> Result<bool>;
    /// Current unit amount of each product in `ids` that exists.
    async fn product_prices(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>>;

    // --- orders ---
    async fn list_orders(&self, params: &ListParams) -> Result<Page<Order>>;
    async fn find_order(&self, id: Uuid) -> Result<Option<Order>>;
    async fn order_lines(&self, order_id: Uuid) -> Result<Vec<OrderLineView>>;
    async fn insert_order(&self, order: &Order, lines: &[OrderLine]) -> Result<()>;
    /// Overwrites the header and swaps every line. `false` if the order is gone.
    async fn replace_order(&self, order: &Order, lines: &[OrderLine]) -> Result<bool>;
    async fn delete_order(&self, id: Uuid) -> Result<bool>;
    /// Orders created in `[from, until)`, newest first. Open bounds when `None`.
    async fn orders_between(&self, from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Result<Vec<Order>>;

    // --- dashboard ---
    async fn counts(&self) -> Result<Counts>;

    // --- settings ---
    /// Inserts `defaults` unless the settings row already exists; returns the stored row.
    async fn init_settings(&self, defaults: Setting) -> Result<Setting>;
    async fn settings(&self) -> Result<Setting>;
    async fn update_settings(&self, update: SettingsUpdate) -> Result<Setting>;

    // --- users ---
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window() {
        assert_eq!(ListParams::default().window(), None);
        let p = ListParams { page: Some(3), per_page: Some(10), search: None };
        assert_eq!(p.window(), Some((10, 20)));
        let p = ListParams { page: Some(0), per_page: Some(1000), search: None };
        assert_eq!(p.window(), Some((100, 0)));
        let p = ListParams { page: Some(2), per_page: None, search: None };
        assert_eq!(p.window(), Some((20, 20)));
    }

    #[test]
    fn test_search_term_ignores_blank() {
        let p = ListParams { search: Some("   ".into()), ..Default::default() };
        assert_eq!(p.search_term(), None);
        let p = ListParams { search: Some(" tea ".into()), ..Default::default() };
        assert_eq!(p.search_term(), Some("tea"));
    }
}
