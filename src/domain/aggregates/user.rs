//! Back-office user account

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored lower-cased.
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// What the API reveals about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser { pub id: Uuid, pub name: String, pub email: String }

impl User {
    pub fn create(name: String, email: &str, password_hash: String) -> Self {
        Self { id: Uuid::now_v7(), name, email: email.trim().to_lowercase(), password_hash, created_at: Utc::now() }
    }

    pub fn public(&self) -> PublicUser {
        PublicUser { id: self.id, name: self.name.clone(), email: self.email.clone() }
    }
}
