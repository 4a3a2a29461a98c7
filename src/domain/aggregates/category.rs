//! Category record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::RecordStatus;
use crate::domain::value_objects::EntityName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated fields of a create or full-replace update.
#[derive(Debug, Clone)]
pub struct CategoryInput { pub name: EntityName, pub status: RecordStatus }

impl Category {
    pub fn create(input: CategoryInput) -> Self {
        Self { id: Uuid::now_v7(), name: input.name.into_inner(), status: input.status, created_at: Utc::now() }
    }

    pub fn apply(&mut self, input: CategoryInput) {
        self.name = input.name.into_inner();
        self.status = input.status;
    }
}
