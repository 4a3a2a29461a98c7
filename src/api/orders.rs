//! Order handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;
use super::{acknowledge, listing, ValidJson};
use crate::domain::aggregates::{Customer, OrderDetail, OrderDraft, OrderItem, OrderStatus, PaymentMode};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{DiscountPercentage, Quantity};
use crate::services::orders::{self as service, MaterializedOrder};
use crate::store::ListParams;
use crate::{AppState, BackofficeError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest { pub product_id: Uuid, pub quantity: i64 }

/// Body of both create and edit.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[validate(required(message = "customerName is required"))]
    pub customer_name: Option<String>,
    #[validate(required(message = "customerEmail is required"), email(message = "customerEmail must be a valid email"))]
    pub customer_email: Option<String>,
    #[validate(required(message = "customerContactNumber is required"))]
    pub customer_contact_number: Option<String>,
    #[validate(required(message = "customerAddress is required"))]
    pub customer_address: Option<String>,
    pub discount_percentage: Option<Decimal>,
    pub payment_mode: Option<PaymentMode>,
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        .ok_or_else(|| BackofficeError::validation(format!("{field} is required")))
}

impl OrderRequest {
    fn into_draft(self) -> Result<OrderDraft> {
        let customer = Customer {
            name: required(self.customer_name, "customerName")?,
            email: required(self.customer_email, "customerEmail")?,
            contact_number: required(self.customer_contact_number, "customerContactNumber")?,
            address: required(self.customer_address, "customerAddress")?,
        };
        let items = self.items.into_iter()
            .map(|i| Ok(OrderItem { product_id: i.product_id, quantity: Quantity::new(i.quantity)? }))
            .collect::<Result<Vec<_>>>()?;
        let discount = DiscountPercentage::new(self.discount_percentage.unwrap_or(Decimal::ZERO))?;
        Ok(OrderDraft::new(customer, discount, self.payment_mode.unwrap_or_default(), self.status.unwrap_or_default(), items)?)
    }
}

fn order_event(created: bool, m: &MaterializedOrder) -> DomainEvent {
    let (order_id, total, lines) = (m.order.id, m.order.total_amount, m.order.total_products);
    DomainEvent::Order(if created {
        OrderEvent::Created { order_id, total, lines }
    } else {
        OrderEvent::Updated { order_id, total, lines }
    })
}

pub async fn list_orders(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Response> {
    Ok(listing(s.store.list_orders(&p).await?))
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<OrderDetail>> {
    Ok(Json(service::order_detail(s.store.as_ref(), id).await?))
}

pub async fn create_order(State(s): State<AppState>, ValidJson(r): ValidJson<OrderRequest>) -> Result<impl IntoResponse> {
    let created = service::create_order(s.store.as_ref(), r.into_draft()?).await?;
    s.events.publish(order_event(true, &created)).await;
    Ok((StatusCode::CREATED, Json(json!({
        "message": "Order created successfully",
        "orderId": created.order.id,
        "skippedProductIds": created.skipped,
    }))))
}

pub async fn update_order(State(s): State<AppState>, Path(id): Path<Uuid>, ValidJson(r): ValidJson<OrderRequest>) -> Result<impl IntoResponse> {
    let updated = service::update_order(s.store.as_ref(), id, r.into_draft()?).await?;
    s.events.publish(order_event(false, &updated)).await;
    Ok(Json(json!({
        "message": "Order updated successfully",
        "updatedOrder": updated.order,
        "skippedProductIds": updated.skipped,
    })))
}

pub async fn delete_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    service::delete_order(s.store.as_ref(), id).await?;
    s.events.publish(DomainEvent::Order(OrderEvent::Deleted { order_id: id })).await;
    Ok(acknowledge("Order deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(body: serde_json::Value) -> OrderRequest { serde_json::from_value(body).unwrap() }

    #[test]
    fn test_defaults_apply() {
        let draft = request(json!({
            "customerName": " Ada ", "customerEmail": "ada@example.com", "customerContactNumber": "555",
            "customerAddress": "1 Main St", "items": [{"productId": Uuid::now_v7(), "quantity": 2}]
        })).into_draft().unwrap();
        assert_eq!(draft.customer.name, "Ada");
        assert_eq!(draft.discount.value(), Decimal::ZERO);
        assert_eq!(draft.payment_mode, PaymentMode::Cash);
        assert_eq!(draft.status, OrderStatus::Active);
    }

    #[test]
    fn test_rejects_bad_lines() {
        let base = json!({"customerName": "A", "customerEmail": "a@b.co", "customerContactNumber": "1", "customerAddress": "X"});
        let mut empty = base.clone();
        empty["items"] = json!([]);
        assert!(matches!(request(empty).into_draft(), Err(BackofficeError::Validation(m)) if m.contains("at least one")));

        let mut zero = base.clone();
        zero["items"] = json!([{"productId": Uuid::now_v7(), "quantity": 0}]);
        assert!(request(zero).into_draft().is_err());

        let mut discount = base;
        discount["discountPercentage"] = json!(120);
        discount["items"] = json!([{"productId": Uuid::now_v7(), "quantity": 1}]);
        assert!(request(discount).into_draft().is_err());
    }

    #[test]
    fn test_email_is_validated() {
        let r = request(json!({"customerName": "A", "customerEmail": "nope", "customerContactNumber": "1", "customerAddress": "X"}));
        assert!(r.validate().is_err());
    }
}
