//! Category, brand and product handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use super::{acknowledge, listing, FormInput, ValidJson};
use crate::domain::aggregates::{Brand, BrandInput, Category, CategoryInput, Product, ProductInput, RecordStatus};
use crate::domain::events::{CatalogEvent, DomainEvent};
use crate::domain::value_objects::{EntityName, UnitAmount};
use crate::services::catalog::{require_brand, require_category};
use crate::store::ListParams;
use crate::{uploads, AppState, BackofficeError, Result};

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(required(message = "Name and status are required"))]
    pub name: Option<String>,
    #[validate(required(message = "Name and status are required"))]
    pub status: Option<RecordStatus>,
}

impl CategoryRequest {
    fn into_input(self) -> Result<CategoryInput> {
        let (Some(name), Some(status)) = (self.name, self.status) else {
            return Err(BackofficeError::validation("Name and status are required"));
        };
        Ok(CategoryInput { name: EntityName::new(name)?, status })
    }
}

pub async fn list_categories(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Response> {
    Ok(listing(s.store.list_categories(&p).await?))
}

pub async fn get_category(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Category>> {
    s.store.find_category(id).await?.map(Json).ok_or(BackofficeError::NotFound("Category"))
}

pub async fn create_category(State(s): State<AppState>, ValidJson(r): ValidJson<CategoryRequest>) -> Result<(StatusCode, Json<Category>)> {
    let category = s.store.insert_category(r.into_input()?).await?;
    tracing::info!(category_id = %category.id, name = %category.name, "category created");
    s.events.publish(DomainEvent::Category(CatalogEvent::Created { id: category.id, name: category.name.clone() })).await;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(State(s): State<AppState>, Path(id): Path<Uuid>, ValidJson(r): ValidJson<CategoryRequest>) -> Result<Json<Category>> {
    let category = s.store.update_category(id, r.into_input()?).await?.ok_or(BackofficeError::NotFound("Category"))?;
    s.events.publish(DomainEvent::Category(CatalogEvent::Updated { id, name: category.name.clone() })).await;
    Ok(Json(category))
}

pub async fn delete_category(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    if !s.store.delete_category(id).await? {
        return Err(BackofficeError::NotFound("Category"));
    }
    tracing::info!(category_id = %id, "category deleted");
    s.events.publish(DomainEvent::Category(CatalogEvent::Deleted { id })).await;
    Ok(acknowledge("Category deleted successfully"))
}

// =============================================================================
// Brands
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct BrandRequest {
    #[validate(required(message = "Name, category and status are required"))]
    pub name: Option<String>,
    #[serde(alias = "categoryId")]
    #[validate(required(message = "Name, category and status are required"))]
    pub category: Option<Uuid>,
    #[validate(required(message = "Name, category and status are required"))]
    pub status: Option<RecordStatus>,
}

impl BrandRequest {
    fn into_input(self) -> Result<BrandInput> {
        let (Some(name), Some(category_id), Some(status)) = (self.name, self.category, self.status) else {
            return Err(BackofficeError::validation("Name, category and status are required"));
        };
        Ok(BrandInput { name: EntityName::new(name)?, category_id, status })
    }
}

pub async fn list_brands(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Response> {
    Ok(listing(s.store.list_brands(&p).await?))
}

pub async fn get_brand(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Brand>> {
    s.store.find_brand(id).await?.map(Json).ok_or(BackofficeError::NotFound("Brand"))
}

pub async fn create_brand(State(s): State<AppState>, ValidJson(r): ValidJson<BrandRequest>) -> Result<(StatusCode, Json<Brand>)> {
    let input = r.into_input()?;
    require_category(s.store.as_ref(), input.category_id).await?;
    let brand = s.store.insert_brand(input).await?;
    tracing::info!(brand_id = %brand.id, name = %brand.name, "brand created");
    s.events.publish(DomainEvent::Brand(CatalogEvent::Created { id: brand.id, name: brand.name.clone() })).await;
    Ok((StatusCode::CREATED, Json(brand)))
}

pub async fn update_brand(State(s): State<AppState>, Path(id): Path<Uuid>, ValidJson(r): ValidJson<BrandRequest>) -> Result<Json<Brand>> {
    let input = r.into_input()?;
    if s.store.find_brand(id).await?.is_none() {
        return Err(BackofficeError::NotFound("Brand"));
    }
    require_category(s.store.as_ref(), input.category_id).await?;
    let brand = s.store.update_brand(id, input).await?.ok_or(BackofficeError::NotFound("Brand"))?;
    s.events.publish(DomainEvent::Brand(CatalogEvent::Updated { id, name: brand.name.clone() })).await;
    Ok(Json(brand))
}

pub async fn delete_brand(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    if !s.store.delete_brand(id).await? {
        return Err(BackofficeError::NotFound("Brand"));
    }
    tracing::info!(brand_id = %id, "brand deleted");
    s.events.publish(DomainEvent::Brand(CatalogEvent::Deleted { id })).await;
    Ok(acknowledge("Brand deleted successfully"))
}

// =============================================================================
// Products
// =============================================================================

fn parse_reference(form: &FormInput, keys: [&str; 2], label: &str) -> Result<Uuid> {
    let raw = keys.iter().find_map(|k| form.text(k)).ok_or_else(|| BackofficeError::validation("Missing required fields"))?;
    Uuid::parse_str(raw).map_err(|_| BackofficeError::validation(format!("{label} must be a valid id")))
}

/// Reads the text fields of a product form. The image is attached afterwards,
/// once everything else has been checked.
fn product_input(form: &FormInput) -> Result<ProductInput> {
    let missing = || BackofficeError::validation("Missing required fields");
    Ok(ProductInput {
        name: EntityName::new(form.text("name").ok_or_else(missing)?)?,
        category_id: parse_reference(form, ["category", "categoryId"], "category")?,
        brand_id: parse_reference(form, ["brand", "brandId"], "brand")?,
        description: form.text("description").unwrap_or_default().to_string(),
        amount: UnitAmount::parse(form.text("amount").ok_or_else(missing)?)?,
        status: form.text("status").map(str::parse::<RecordStatus>).transpose()?.unwrap_or_default(),
        image: None,
    })
}

async fn check_references(s: &AppState, input: &ProductInput) -> Result<()> {
    require_category(s.store.as_ref(), input.category_id).await?;
    require_brand(s.store.as_ref(), input.brand_id).await
}

/// Stores the `image` part, if any, and records its path on `input`.
async fn attach_image(s: &AppState, form: &mut FormInput, input: &mut ProductInput) -> Result<()> {
    if let Some(file) = form.take_file("image") {
        input.image = Some(uploads::store(&s.config.upload_dir, &file).await?);
    }
    Ok(())
}

async fn discard_on_error<T>(s: &AppState, image: Option<&str>, result: Result<T>) -> Result<T> {
    if let (Err(_), Some(path)) = (&result, image) {
        uploads::discard(&s.config.upload_dir, path).await;
    }
    result
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Response> {
    Ok(listing(s.store.list_products(&p).await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Product>> {
    s.store.find_product(id).await?.map(Json).ok_or(BackofficeError::NotFound("Product"))
}

pub async fn create_product(State(s): State<AppState>, mut form: FormInput) -> Result<(StatusCode, Json<Product>)> {
    let mut input = product_input(&form)?;
    check_references(&s, &input).await?;
    attach_image(&s, &mut form, &mut input).await?;
    let image = input.image.clone();
    let product = discard_on_error(&s, image.as_deref(), s.store.insert_product(input).await).await?;
    tracing::info!(product_id = %product.id, name = %product.name, amount = %product.amount, "product created");
    s.events.publish(DomainEvent::Product(CatalogEvent::Created { id: product.id, name: product.name.clone() })).await;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(State(s): State<AppState>, Path(id): Path<Uuid>, mut form: FormInput) -> Result<Json<Product>> {
    let mut input = product_input(&form)?;
    if s.store.find_product(id).await?.is_none() {
        return Err(BackofficeError::NotFound("Product"));
    }
    check_references(&s, &input).await?;
    attach_image(&s, &mut form, &mut input).await?;
    let image = input.image.clone();
    let updated = s.store.update_product(id, input).await.and_then(|p| p.ok_or(BackofficeError::NotFound("Product")));
    let product = discard_on_error(&s, image.as_deref(), updated).await?;
    s.events.publish(DomainEvent::Product(CatalogEvent::Updated { id, name: product.name.clone() })).await;
    Ok(Json(product))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    if !s.store.delete_product(id).await? {
        return Err(BackofficeError::NotFound("Product"));
    }
    tracing::info!(product_id = %id, "product deleted");
    s.events.publish(DomainEvent::Product(CatalogEvent::Deleted { id })).await;
    Ok(acknowledge("Product deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_request_accepts_either_category_key() {
        let id = Uuid::now_v7();
        let a: BrandRequest = serde_json::from_value(serde_json::json!({"name": "Acme", "category": id, "status": "Active"})).unwrap();
        let b: BrandRequest = serde_json::from_value(serde_json::json!({"name": "Acme", "categoryId": id, "status": "Active"})).unwrap();
        assert_eq!(a.into_input().unwrap().category_id, id);
        assert_eq!(b.into_input().unwrap().category_id, id);
    }

    #[test]
    fn test_category_request_requires_fields() {
        let r = CategoryRequest { name: Some("Tea".into()), status: None };
        assert!(r.validate().is_err());
        let r = CategoryRequest { name: Some("   ".into()), status: Some(RecordStatus::Active) };
        assert!(matches!(r.into_input(), Err(BackofficeError::Validation(_))));
    }
}
