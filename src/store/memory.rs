//! In-process store.
//!
//! Mirrors the PostgreSQL constraints: unique names and emails, restricted
//! deletes of referenced categories and brands, names joined on read. One
//! mutex guards all tables, so every method is atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;
use crate::domain::aggregates::{
    Brand, BrandInput, Category, CategoryInput, Order, OrderLine, OrderLineView, Product, ProductInput, Setting,
    SettingsUpdate, User,
};
use crate::store::{Counts, ListParams, Page, Store};
use crate::{BackofficeError, Result};

/// Rows are kept in insertion order; reads walk them newest first.
#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    brands: Vec<Brand>,
    products: Vec<Product>,
    orders: Vec<Order>,
    lines: Vec<OrderLine>,
    settings: Option<Setting>,
    users: Vec<User>,
}

#[derive(Default)]
pub struct MemoryStore { tables: Mutex<Tables> }

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| BackofficeError::Storage("memory store lock poisoned".into()))
    }
}

fn matches(haystack: &str, params: &ListParams) -> bool {
    params.search_term().map_or(true, |term| haystack.to_lowercase().contains(&term.to_lowercase()))
}

fn paginate<T>(rows: Vec<T>, params: &ListParams) -> Page<T> {
    let total = rows.len() as i64;
    let items = match params.window() {
        Some((limit, offset)) => rows.into_iter().skip(offset as usize).take(limit as usize).collect(),
        None => rows,
    };
    Page { items, total }
}

impl Tables {
    fn category_name(&self, id: Uuid) -> Option<&str> {
        self.categories.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }

    fn brand_name(&self, id: Uuid) -> Option<&str> {
        self.brands.iter().find(|b| b.id == id).map(|b| b.name.as_str())
    }

    fn joined_brand(&self, brand: &Brand) -> Brand {
        let mut brand = brand.clone();
        if let Some(name) = self.category_name(brand.category_id) { brand.category = name.to_string(); }
        brand
    }

    fn joined_product(&self, product: &Product) -> Product {
        let mut product = product.clone();
        if let Some(name) = self.category_name(product.category_id) { product.category = name.to_string(); }
        if let Some(name) = self.brand_name(product.brand_id) { product.brand = name.to_string(); }
        product
    }

    fn require_category(&self, id: Uuid, entity: &str) -> Result<String> {
        self.category_name(id).map(str::to_string)
            .ok_or_else(|| BackofficeError::validation(format!("{entity} references a category or brand that does not exist")))
    }

    fn require_brand(&self, id: Uuid, entity: &str) -> Result<String> {
        self.brand_name(id).map(str::to_string)
            .ok_or_else(|| BackofficeError::validation(format!("{entity} references a category or brand that does not exist")))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_categories(&self, params: &ListParams) -> Result<Page<Category>> {
        let t = self.lock()?;
        let rows = t.categories.iter().rev().filter(|c| matches(&c.name, params)).cloned().collect();
        Ok(paginate(rows, params))
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.lock()?.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_category(&self, input: CategoryInput) -> Result<Category> {
        let mut t = self.lock()?;
        if t.categories.iter().any(|c| c.name == input.name.as_str()) { return Err(BackofficeError::Duplicate("Category")); }
        let category = Category::create(input);
        t.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, input: CategoryInput) -> Result<Option<Category>> {
        let mut t = self.lock()?;
        if !t.categories.iter().any(|c| c.id == id) { return Ok(None); }
        if t.categories.iter().any(|c| c.id != id && c.name == input.name.as_str()) { return Err(BackofficeError::Duplicate("Category")); }
        Ok(t.categories.iter_mut().find(|c| c.id == id).map(|c| { c.apply(input); c.clone() }))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        let mut t = self.lock()?;
        if t.brands.iter().any(|b| b.category_id == id) || t.products.iter().any(|p| p.category_id == id) {
            return Err(BackofficeError::Conflict("Category is still referenced by other records".into()));
        }
        let before = t.categories.len();
        t.categories.retain(|c| c.id != id);
        Ok(t.categories.len() != before)
    }

    async fn list_brands(&self, params: &ListParams) -> Result<Page<Brand>> {
        let t = self.lock()?;
        let rows = t.brands.iter().rev().filter(|b| matches(&b.name, params)).map(|b| t.joined_brand(b)).collect();
        Ok(paginate(rows, params))
    }

    async fn find_brand(&self, id: Uuid) -> Result<Option<Brand>> {
        let t = self.lock()?;
        Ok(t.brands.iter().find(|b| b.id == id).map(|b| t.joined_brand(b)))
    }

    async fn insert_brand(&self, input: BrandInput) -> Result<Brand> {
        let mut t = self.lock()?;
        let category = t.require_category(input.category_id, "Brand")?;
        if t.brands.iter().any(|b| b.name == input.name.as_str()) { return Err(BackofficeError::Duplicate("Brand")); }
        let brand = Brand {
            id: Uuid::now_v7(), name: input.name.into_inner(), category_id: input.category_id, category,
            status: input.status, created_at: Utc::now(),
        };
        t.brands.push(brand.clone());
        Ok(brand)
    }

    async fn update_brand(&self, id: Uuid, input: BrandInput) -> Result<Option<Brand>> {
        let mut t = self.lock()?;
        if !t.brands.iter().any(|b| b.id == id) { return Ok(None); }
        let category = t.require_category(input.category_id, "Brand")?;
        if t.brands.iter().any(|b| b.id != id && b.name == input.name.as_str()) { return Err(BackofficeError::Duplicate("Brand")); }
        Ok(t.brands.iter_mut().find(|b| b.id == id).map(|b| {
            b.name = input.name.into_inner();
            b.category_id = input.category_id;
            b.category = category;
            b.status = input.status;
            b.clone()
        }))
    }

    async fn delete_brand(&self, id: Uuid) -> Result<bool> {
        let mut t = self.lock()?;
        if t.products.iter().any(|p| p.brand_id == id) {
            return Err(BackofficeError::Conflict("Brand is still referenced by other records".into()));
        }
        let before = t.brands.len();
        t.brands.retain(|b| b.id != id);
        Ok(t.brands.len() != before)
    }

    async fn list_products(&self, params: &ListParams) -> Result<Page<Product>> {
        let t = self.lock()?;
        let rows = t.products.iter().rev().filter(|p| matches(&p.name, params)).map(|p| t.joined_product(p)).collect();
        Ok(paginate(rows, params))
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
        let t = self.lock()?;
        Ok(t.products.iter().find(|p| p.id == id).map(|p| t.joined_product(p)))
    }

    async fn insert_product(&self, input: ProductInput) -> Result<Product> {
        let mut t = self.lock()?;
        let category = t.require_category(input.category_id, "Product")?;
        let brand = t.require_brand(input.brand_id, "Product")?;
        if t.products.iter().any(|p| p.name == input.name.as_str()) { return Err(BackofficeError::Duplicate("Product")); }
        let product = Product {
            id: Uuid::now_v7(), name: input.name.into_inner(), category_id: input.category_id, category,
            brand_id: input.brand_id, brand, description: input.description, amount: input.amount.value(),
            product_image: input.image, status: input.status, created_at: Utc::now(),
        };
        t.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, input: ProductInput) -> Result<Option<Product>> {
        let mut t = self.lock()?;
        if !t.products.iter().any(|p| p.id == id) { return Ok(None); }
        let category = t.require_category(input.category_id, "Product")?;
        let brand = t.require_brand(input.brand_id, "Product")?;
        if t.products.iter().any(|p| p.id != id && p.name == input.name.as_str()) { return Err(BackofficeError::Duplicate("Product")); }
        Ok(t.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.name = input.name.into_inner();
            p.category_id = input.category_id;
            p.category = category;
            p.brand_id = input.brand_id;
            p.brand = brand;
            p.description = input.description;
            p.amount = input.amount.value();
            if let Some(image) = input.image { p.product_image = Some(image); }
            p.status = input.status;
            p.clone()
        }))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let mut t = self.lock()?;
        let before = t.products.len();
        t.products.retain(|p| p.id != id);
        Ok(t.products.len() != before)
    }

    async fn product_prices(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        Ok(self.lock()?.products.iter().filter(|p| wanted.contains(&p.id)).map(|p| (p.id, p.amount)).collect())
    }

    async fn list_orders(&self, params: &ListParams) -> Result<Page<Order>> {
        let t = self.lock()?;
        let rows = t.orders.iter().rev()
            .filter(|o| matches(&o.customer_name, params) || matches(&o.customer_email, params))
            .cloned().collect();
        Ok(paginate(rows, params))
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.lock()?.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn order_lines(&self, order_id: Uuid) -> Result<Vec<OrderLineView>> {
        let t = self.lock()?;
        let mut lines: Vec<&OrderLine> = t.lines.iter().filter(|l| l.order_id == order_id).collect();
        lines.sort_by_key(|l| l.position);
        Ok(lines.into_iter().map(|l| OrderLineView {
            id: l.id,
            product_id: l.product_id,
            product_name: t.products.iter().find(|p| p.id == l.product_id).map(|p| p.name.clone()),
            quantity: l.quantity,
            unit_price: l.unit_price,
        }).collect())
    }

    async fn insert_order(&self, order: &Order, lines: &[OrderLine]) -> Result<()> {
        let mut t = self.lock()?;
        if t.orders.iter().any(|o| o.id == order.id) { return Err(BackofficeError::Duplicate("Order")); }
        t.orders.push(order.clone());
        t.lines.extend_from_slice(lines);
        Ok(())
    }

    async fn replace_order(&self, order: &Order, lines: &[OrderLine]) -> Result<bool> {
        let mut t = self.lock()?;
        let Some(existing) = t.orders.iter_mut().find(|o| o.id == order.id) else { return Ok(false) };
        let created_at = existing.created_at;
        *existing = Order { created_at, ..order.clone() };
        t.lines.retain(|l| l.order_id != order.id);
        t.lines.extend_from_slice(lines);
        Ok(true)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool> {
        let mut t = self.lock()?;
        let before = t.orders.len();
        t.orders.retain(|o| o.id != id);
        t.lines.retain(|l| l.order_id != id);
        Ok(t.orders.len() != before)
    }

    async fn orders_between(&self, from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Result<Vec<Order>> {
        Ok(self.lock()?.orders.iter().rev()
            .filter(|o| from.map_or(true, |f| o.created_at >= f) && until.map_or(true, |u| o.created_at < u))
            .cloned().collect())
    }

    async fn counts(&self) -> Result<Counts> {
        let t = self.lock()?;
        Ok(Counts {
            categories: t.categories.len() as i64,
            brands: t.brands.len() as i64,
            products: t.products.len() as i64,
            orders: t.orders.len() as i64,
        })
    }

    async fn init_settings(&self, defaults: Setting) -> Result<Setting> {
        let mut t = self.lock()?;
        Ok(t.settings.get_or_insert(defaults).clone())
    }

    async fn settings(&self) -> Result<Setting> {
        self.lock()?.settings.clone().ok_or(BackofficeError::NotFound("Settings"))
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Result<Setting> {
        let mut t = self.lock()?;
        let setting = t.settings.as_mut().ok_or(BackofficeError::NotFound("Settings"))?;
        setting.apply(update);
        Ok(setting.clone())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut t = self.lock()?;
        if t.users.iter().any(|u| u.email == user.email) { return Err(BackofficeError::Duplicate("User")); }
        t.users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }
}
