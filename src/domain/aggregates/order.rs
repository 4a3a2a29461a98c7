//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::aggregates::StatusParseError;
use crate::domain::pricing::PricedOrder;
use crate::domain::value_objects::{DiscountPercentage, Quantity};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus { #[default] Active, Completed, Canceled, Inactive }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode { #[default] Cash, Card, Pending }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Active => "Active", Self::Completed => "Completed", Self::Canceled => "Canceled", Self::Inactive => "Inactive" }
    }
}

impl FromStr for OrderStatus {
    type Err = StatusParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Completed" => Ok(Self::Completed),
            "Canceled" => Ok(Self::Canceled),
            "Inactive" => Ok(Self::Inactive),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = StatusParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Cash => "Cash", Self::Card => "Card", Self::Pending => "Pending" }
    }
}

impl FromStr for PaymentMode {
    type Err = StatusParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(Self::Cash),
            "Card" => Ok(Self::Card),
            "Pending" => Ok(Self::Pending),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for PaymentMode {
    type Error = StatusParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

/// Persisted order header. Totals are computed once at write time and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_contact_number: String,
    pub customer_address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percentage: Decimal,
    #[sqlx(try_from = "String")]
    pub payment_mode: PaymentMode,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    /// Pre-discount subtotal.
    #[serde(with = "rust_decimal::serde::float")]
    pub gross_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub total_products: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line snapshot. `unit_price` is the product amount at the moment the
/// line was written and is never touched afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub position: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Customer { pub name: String, pub email: String, pub contact_number: String, pub address: String }

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderItem { pub product_id: Uuid, pub quantity: Quantity }

/// Validated order submission, used for both create and edit.
#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub customer: Customer,
    pub discount: DiscountPercentage,
    pub payment_mode: PaymentMode,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

impl OrderDraft {
    pub fn new(
        customer: Customer,
        discount: DiscountPercentage,
        payment_mode: PaymentMode,
        status: OrderStatus,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        if items.is_empty() { return Err(OrderError::NoItems); }
        Ok(Self { customer, discount, payment_mode, status, items })
    }

    pub fn product_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.items.iter().map(|i| i.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl Order {
    /// Builds the header and line snapshots for `id` from a priced draft.
    /// `created_at` is kept from the existing header on edit.
    pub fn materialize(
        id: Uuid,
        draft: &OrderDraft,
        priced: &PricedOrder,
        created_at: DateTime<Utc>,
    ) -> Result<(Order, Vec<OrderLine>), OrderError> {
        if priced.lines.is_empty() { return Err(OrderError::NoKnownProducts); }
        let total_products = i32::try_from(priced.lines.len()).map_err(|_| OrderError::TooManyLines)?;
        let lines = priced.lines.iter().enumerate().map(|(position, line)| {
            Ok(OrderLine {
                id: Uuid::now_v7(),
                order_id: id,
                product_id: line.product_id,
                quantity: line.quantity.value(),
                unit_price: line.unit_price,
                position: i32::try_from(position).map_err(|_| OrderError::TooManyLines)?,
            })
        }).collect::<Result<Vec<_>, OrderError>>()?;
        let order = Order {
            id,
            customer_name: draft.customer.name.clone(),
            customer_email: draft.customer.email.clone(),
            customer_contact_number: draft.customer.contact_number.clone(),
            customer_address: draft.customer.address.clone(),
            discount_percentage: draft.discount.value(),
            payment_mode: draft.payment_mode,
            status: draft.status,
            gross_amount: priced.gross,
            discount_amount: priced.discount,
            total_amount: priced.total,
            total_products,
            created_at,
            updated_at: Utc::now(),
        };
        Ok((order, lines))
    }
}

/// Line joined with the product's current display name. `product_name` is
/// `None` when the product has since been deleted.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}

impl From<OrderLineView> for OrderItemView {
    fn from(line: OrderLineView) -> Self {
        let line_total = line.unit_price * Decimal::from(line.quantity);
        Self { id: line.id, product_id: line.product_id, product_name: line.product_name, unit_price: line.unit_price, quantity: line.quantity, line_total }
    }
}

/// Header plus the subtotal recomputed from its lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub header: Order,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail { pub order: OrderView, pub items: Vec<OrderItemView> }

impl OrderDetail {
    pub fn assemble(header: Order, lines: Vec<OrderLineView>) -> Self {
        let items: Vec<OrderItemView> = lines.into_iter().map(OrderItemView::from).collect();
        let subtotal_amount = items.iter().map(|i| i.line_total).sum();
        Self { order: OrderView { header, subtotal_amount }, items }
    }

    /// True when the read-time subtotal agrees with the stored gross amount.
    pub fn is_consistent(&self) -> bool { self.order.subtotal_amount == self.order.header.gross_amount }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NoItems, NoKnownProducts, TooManyLines, TotalTooLarge }
impl std::error::Error for OrderError {}
impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoItems => write!(f, "Order must have at least one product item."),
            Self::NoKnownProducts => write!(f, "None of the ordered products exist"),
            Self::TooManyLines => write!(f, "Order has too many line items"),
            Self::TotalTooLarge => write!(f, "Order total is too large"),
        }
    }
}
