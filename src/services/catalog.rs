//! Reference lookups for catalog writes.
//!
//! Brands and products point at categories and brands by id; the referenced
//! rows are looked up before writing so a stale id is reported as a 400.

use uuid::Uuid;
use crate::store::Store;
use crate::{BackofficeError, Result};

pub async fn require_category(store: &dyn Store, id: Uuid) -> Result<()> {
    match store.find_category(id).await? {
        Some(_) => Ok(()),
        None => Err(BackofficeError::validation(format!("Category {id} does not exist"))),
    }
}

pub async fn require_brand(store: &dyn Store, id: Uuid) -> Result<()> {
    match store.find_brand(id).await? {
        Some(_) => Ok(()),
        None => Err(BackofficeError::validation(format!("Brand {id} does not exist"))),
    }
}
