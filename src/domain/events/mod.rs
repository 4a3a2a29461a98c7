//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum DomainEvent {
    Category(CatalogEvent),
    Brand(CatalogEvent),
    Product(CatalogEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CatalogEvent {
    Created { id: Uuid, name: String },
    Updated { id: Uuid, name: String },
    Deleted { id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OrderEvent {
    Created { order_id: Uuid, #[serde(with = "rust_decimal::serde::float")] total: Decimal, lines: i32 },
    Updated { order_id: Uuid, #[serde(with = "rust_decimal::serde::float")] total: Decimal, lines: i32 },
    Deleted { order_id: Uuid },
}

impl CatalogEvent {
    pub fn action(&self) -> &'static str {
        match self { Self::Created { .. } => "created", Self::Updated { .. } => "updated", Self::Deleted { .. } => "deleted" }
    }
}

impl OrderEvent {
    pub fn action(&self) -> &'static str {
        match self { Self::Created { .. } => "created", Self::Updated { .. } => "updated", Self::Deleted { .. } => "deleted" }
    }
}

impl DomainEvent {
    /// Messaging subject, `backoffice.<entity>.<action>`.
    pub fn subject(&self) -> String {
        let (entity, action) = match self {
            Self::Category(e) => ("category", e.action()),
            Self::Brand(e) => ("brand", e.action()),
            Self::Product(e) => ("product", e.action()),
            Self::Order(e) => ("order", e.action()),
        };
        format!("backoffice.{entity}.{action}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_and_payload() {
        let id = Uuid::now_v7();
        let event = DomainEvent::Order(OrderEvent::Created { order_id: id, total: Decimal::new(18000, 2), lines: 1 });
        assert_eq!(event.subject(), "backoffice.order.created");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["entity"], "order");
        assert_eq!(json["action"], "created");
        assert_eq!(json["total"].as_f64(), Some(180.0));
        assert_eq!(DomainEvent::Brand(CatalogEvent::Deleted { id }).subject(), "backoffice.brand.deleted");
    }
}
