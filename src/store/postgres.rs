//! PostgreSQL store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;
use crate::domain::aggregates::{
    Brand, BrandInput, Category, CategoryInput, Order, OrderLine, OrderLineView, Product, ProductInput, Setting,
    SettingsUpdate, User,
};
use crate::store::{Counts, ListParams, Page, Store};
use crate::{BackofficeError, Result};

const CATEGORY_SELECT: &str = "SELECT id, name, status, created_at FROM categories";
const BRAND_SELECT: &str = "SELECT b.id, b.name, b.category_id, c.name AS category, b.status, b.created_at \
     FROM brands b JOIN categories c ON c.id = b.category_id";
const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.category_id, c.name AS category, p.brand_id, b.name AS brand, \
     p.description, p.amount, p.product_image, p.status, p.created_at \
     FROM products p JOIN categories c ON c.id = p.category_id JOIN brands b ON b.id = p.brand_id";
const ORDER_SELECT: &str = "SELECT id, customer_name, customer_email, customer_contact_number, customer_address, \
     discount_percentage, payment_mode, status, gross_amount, discount_amount, total_amount, total_products, \
     created_at, updated_at FROM orders";
const SETTING_SELECT: &str = "SELECT site_name, logo, currency, theme, updated_at FROM settings WHERE id = 1";

#[derive(Clone)]
pub struct PgStore { pool: PgPool }

impl PgStore {
    /// Connects and applies pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| BackofficeError::Storage(e.to_string()))?;
        Ok(Self { pool })
    }
}

/// `%term%` for ILIKE with the pattern metacharacters escaped.
fn like_pattern(params: &ListParams) -> Option<String> {
    params.search_term().map(|term| {
        let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        format!("%{escaped}%")
    })
}

fn limit_offset(params: &ListParams) -> (Option<i64>, i64) {
    match params.window() { Some((limit, offset)) => (Some(limit), offset), None => (None, 0) }
}

fn write_error(e: sqlx::Error, entity: &'static str) -> BackofficeError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() { return BackofficeError::Duplicate(entity); }
        if db.is_foreign_key_violation() {
            return BackofficeError::validation(format!("{entity} references a category or brand that does not exist"));
        }
    }
    e.into()
}

fn delete_error(e: sqlx::Error, entity: &'static str) -> BackofficeError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return BackofficeError::Conflict(format!("{entity} is still referenced by other records"));
        }
    }
    e.into()
}

async fn insert_lines(tx: &mut Transaction<'_, Postgres>, lines: &[OrderLine]) -> Result<()> {
    for line in lines {
        sqlx::query("INSERT INTO order_lines (id, order_id, product_id, quantity, unit_price, position) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(line.id).bind(line.order_id).bind(line.product_id).bind(line.quantity).bind(line.unit_price).bind(line.position)
            .execute(&mut **tx).await?;
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn list_categories(&self, params: &ListParams) -> Result<Page<Category>> {
        let search = like_pattern(params);
        let (limit, offset) = limit_offset(params);
        let items = sqlx::query_as::<_, Category>(&format!("{CATEGORY_SELECT} WHERE ($1::text IS NULL OR name ILIKE $1) ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"))
            .bind(&search).bind(limit).bind(offset).fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE ($1::text IS NULL OR name ILIKE $1)")
            .bind(&search).fetch_one(&self.pool).await?;
        Ok(Page { items, total: total.0 })
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(sqlx::query_as::<_, Category>(&format!("{CATEGORY_SELECT} WHERE id = $1")).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_category(&self, input: CategoryInput) -> Result<Category> {
        let category = Category::create(input);
        sqlx::query("INSERT INTO categories (id, name, status, created_at) VALUES ($1, $2, $3, $4)")
            .bind(category.id).bind(&category.name).bind(category.status.as_str()).bind(category.created_at)
            .execute(&self.pool).await.map_err(|e| write_error(e, "Category"))?;
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, input: CategoryInput) -> Result<Option<Category>> {
        Ok(sqlx::query_as::<_, Category>("UPDATE categories SET name = $2, status = $3 WHERE id = $1 RETURNING id, name, status, created_at")
            .bind(id).bind(input.name.as_str()).bind(input.status.as_str())
            .fetch_optional(&self.pool).await.map_err(|e| write_error(e, "Category"))?)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(&self.pool).await.map_err(|e| delete_error(e, "Category"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_brands(&self, params: &ListParams) -> Result<Page<Brand>> {
        let search = like_pattern(params);
        let (limit, offset) = limit_offset(params);
        let items = sqlx::query_as::<_, Brand>(&format!("{BRAND_SELECT} WHERE ($1::text IS NULL OR b.name ILIKE $1) ORDER BY b.created_at DESC, b.id DESC LIMIT $2 OFFSET $3"))
            .bind(&search).bind(limit).bind(offset).fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM brands WHERE ($1::text IS NULL OR name ILIKE $1)")
            .bind(&search).fetch_one(&self.pool).await?;
        Ok(Page { items, total: total.0 })
    }

    async fn find_brand(&self, id: Uuid) -> Result<Option<Brand>> {
        Ok(sqlx::query_as::<_, Brand>(&format!("{BRAND_SELECT} WHERE b.id = $1")).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_brand(&self, input: BrandInput) -> Result<Brand> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO brands (id, name, category_id, status, created_at) VALUES ($1, $2, $3, $4, NOW())")
            .bind(id).bind(input.name.as_str()).bind(input.category_id).bind(input.status.as_str())
            .execute(&self.pool).await.map_err(|e| write_error(e, "Brand"))?;
        self.find_brand(id).await?.ok_or(BackofficeError::NotFound("Brand"))
    }

    async fn update_brand(&self, id: Uuid, input: BrandInput) -> Result<Option<Brand>> {
        let res = sqlx::query("UPDATE brands SET name = $2, category_id = $3, status = $4 WHERE id = $1")
            .bind(id).bind(input.name.as_str()).bind(input.category_id).bind(input.status.as_str())
            .execute(&self.pool).await.map_err(|e| write_error(e, "Brand"))?;
        if res.rows_affected() == 0 { return Ok(None); }
        self.find_brand(id).await
    }

    async fn delete_brand(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM brands WHERE id = $1").bind(id).execute(&self.pool).await.map_err(|e| delete_error(e, "Brand"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_products(&self, params: &ListParams) -> Result<Page<Product>> {
        let search = like_pattern(params);
        let (limit, offset) = limit_offset(params);
        let items = sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE ($1::text IS NULL OR p.name ILIKE $1) ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3"))
            .bind(&search).bind(limit).bind(offset).fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE ($1::text IS NULL OR name ILIKE $1)")
            .bind(&search).fetch_one(&self.pool).await?;
        Ok(Page { items, total: total.0 })
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, Product>(&format!("{PRODUCT_SELECT} WHERE p.id = $1")).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_product(&self, input: ProductInput) -> Result<Product> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO products (id, name, category_id, brand_id, description, amount, product_image, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())")
            .bind(id).bind(input.name.as_str()).bind(input.category_id).bind(input.brand_id).bind(&input.description)
            .bind(input.amount.value()).bind(&input.image).bind(input.status.as_str())
            .execute(&self.pool).await.map_err(|e| write_error(e, "Product"))?;
        self.find_product(id).await?.ok_or(BackofficeError::NotFound("Product"))
    }

    async fn update_product(&self, id: Uuid, input: ProductInput) -> Result<Option<Product>> {
        let res = sqlx::query("UPDATE products SET name = $2, category_id = $3, brand_id = $4, description = $5, amount = $6, product_image = COALESCE($7, product_image), status = $8 WHERE id = $1")
            .bind(id).bind(input.name.as_str()).bind(input.category_id).bind(input.brand_id).bind(&input.description)
            .bind(input.amount.value()).bind(&input.image).bind(input.status.as_str())
            .execute(&self.pool).await.map_err(|e| write_error(e, "Product"))?;
        if res.rows_affected() == 0 { return Ok(None); }
        self.find_product(id).await
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await.map_err(|e| delete_error(e, "Product"))?;
        Ok(res.rows_affected() > 0)
    }

    async fn product_prices(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>> {
        let rows: Vec<(Uuid, Decimal)> = sqlx::query_as("SELECT id, amount FROM products WHERE id = ANY($1)")
            .bind(ids).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().collect())
    }

    async fn list_orders(&self, params: &ListParams) -> Result<Page<Order>> {
        let search = like_pattern(params);
        let (limit, offset) = limit_offset(params);
        let filter = "($1::text IS NULL OR customer_name ILIKE $1 OR customer_email ILIKE $1)";
        let items = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE {filter} ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"))
            .bind(&search).bind(limit).bind(offset).fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM orders WHERE {filter}"))
            .bind(&search).fetch_one(&self.pool).await?;
        Ok(Page { items, total: total.0 })
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE id = $1")).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn order_lines(&self, order_id: Uuid) -> Result<Vec<OrderLineView>> {
        Ok(sqlx::query_as::<_, OrderLineView>(
            "SELECT l.id, l.product_id, p.name AS product_name, l.quantity, l.unit_price \
             FROM order_lines l LEFT JOIN products p ON p.id = l.product_id WHERE l.order_id = $1 ORDER BY l.position",
        ).bind(order_id).fetch_all(&self.pool).await?)
    }

    async fn insert_order(&self, order: &Order, lines: &[OrderLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO orders (id, customer_name, customer_email, customer_contact_number, customer_address, discount_percentage, \
             payment_mode, status, gross_amount, discount_amount, total_amount, total_products, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(order.id).bind(&order.customer_name).bind(&order.customer_email).bind(&order.customer_contact_number)
        .bind(&order.customer_address).bind(order.discount_percentage).bind(order.payment_mode.as_str()).bind(order.status.as_str())
        .bind(order.gross_amount).bind(order.discount_amount).bind(order.total_amount).bind(order.total_products)
        .bind(order.created_at).bind(order.updated_at)
        .execute(&mut *tx).await?;
        insert_lines(&mut tx, lines).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace_order(&self, order: &Order, lines: &[OrderLine]) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let locked: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order.id).fetch_optional(&mut *tx).await?;
        if locked.is_none() { return Ok(false); }
        sqlx::query(
            "UPDATE orders SET customer_name = $2, customer_email = $3, customer_contact_number = $4, customer_address = $5, \
             discount_percentage = $6, payment_mode = $7, status = $8, gross_amount = $9, discount_amount = $10, \
             total_amount = $11, total_products = $12, updated_at = $13 WHERE id = $1",
        )
        .bind(order.id).bind(&order.customer_name).bind(&order.customer_email).bind(&order.customer_contact_number)
        .bind(&order.customer_address).bind(order.discount_percentage).bind(order.payment_mode.as_str()).bind(order.status.as_str())
        .bind(order.gross_amount).bind(order.discount_amount).bind(order.total_amount).bind(order.total_products)
        .bind(order.updated_at)
        .execute(&mut *tx).await?;
        sqlx::query("DELETE FROM order_lines WHERE order_id = $1").bind(order.id).execute(&mut *tx).await?;
        insert_lines(&mut tx, lines).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM order_lines WHERE order_id = $1").bind(id).execute(&mut *tx).await?;
        let res = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(res.rows_affected() > 0)
    }

    async fn orders_between(&self, from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Result<Vec<Order>> {
        Ok(sqlx::query_as::<_, Order>(&format!(
            "{ORDER_SELECT} WHERE ($1::timestamptz IS NULL OR created_at >= $1) AND ($2::timestamptz IS NULL OR created_at < $2) ORDER BY created_at DESC, id DESC"
        )).bind(from).bind(until).fetch_all(&self.pool).await?)
    }

    async fn counts(&self) -> Result<Counts> {
        let (categories, brands, products, orders): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM categories), (SELECT COUNT(*) FROM brands), (SELECT COUNT(*) FROM products), (SELECT COUNT(*) FROM orders)",
        ).fetch_one(&self.pool).await?;
        Ok(Counts { categories, brands, products, orders })
    }

    async fn init_settings(&self, defaults: Setting) -> Result<Setting> {
        sqlx::query("INSERT INTO settings (id, site_name, logo, currency, theme, updated_at) VALUES (1, $1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING")
            .bind(&defaults.site_name).bind(&defaults.logo).bind(&defaults.currency).bind(&defaults.theme).bind(defaults.updated_at)
            .execute(&self.pool).await?;
        self.settings().await
    }

    async fn settings(&self) -> Result<Setting> {
        sqlx::query_as::<_, Setting>(SETTING_SELECT).fetch_optional(&self.pool).await?.ok_or(BackofficeError::NotFound("Settings"))
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Result<Setting> {
        let mut tx = self.pool.begin().await?;
        let mut setting = sqlx::query_as::<_, Setting>(&format!("{SETTING_SELECT} FOR UPDATE"))
            .fetch_optional(&mut *tx).await?.ok_or(BackofficeError::NotFound("Settings"))?;
        setting.apply(update);
        sqlx::query("UPDATE settings SET site_name = $1, logo = $2, currency = $3, theme = $4, updated_at = $5 WHERE id = 1")
            .bind(&setting.site_name).bind(&setting.logo).bind(&setting.currency).bind(&setting.theme).bind(setting.updated_at)
            .execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(setting)
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, name, email, password_hash, created_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(user.id).bind(&user.name).bind(&user.email).bind(&user.password_hash).bind(user.created_at)
            .execute(&self.pool).await.map_err(|e| write_error(e, "User"))?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1")
            .bind(email.trim().to_lowercase()).fetch_optional(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        let p = ListParams { search: Some("50%_off\\".into()), ..Default::default() };
        assert_eq!(like_pattern(&p).as_deref(), Some("%50\\%\\_off\\\\%"));
        assert_eq!(like_pattern(&ListParams::default()), None);
    }

    #[test]
    fn test_limit_offset_defaults_to_everything() {
        assert_eq!(limit_offset(&ListParams::default()), (None, 0));
        let p = ListParams { page: Some(2), per_page: Some(5), search: None };
        assert_eq!(limit_offset(&p), (Some(5), 5));
    }
}
