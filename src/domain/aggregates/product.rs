//! Product record

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::RecordStatus;
use crate::domain::value_objects::{EntityName, UnitAmount};

/// Catalog product. `category` and `brand` are the referenced records'
/// current names, joined at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub category: String,
    pub brand_id: Uuid,
    pub brand: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub product_image: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: EntityName,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub description: String,
    pub amount: UnitAmount,
    pub status: RecordStatus,
    /// `None` on update keeps the stored image.
    pub image: Option<String>,
}
