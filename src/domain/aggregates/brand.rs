//! Brand record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::RecordStatus;
use crate::domain::value_objects::EntityName;

/// A brand belongs to one category; `category` carries the category's current
/// name, joined at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BrandInput { pub name: EntityName, pub category_id: Uuid, pub status: RecordStatus }
