//! Order pricing.
//!
//! Pure computation over current catalog prices: nothing here touches storage.
//! All arithmetic is decimal; only the discount is rounded (to two places), so
//! `total = gross - discount` holds exactly.

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;
use crate::domain::aggregates::{OrderError, OrderItem};
use crate::domain::value_objects::{DiscountPercentage, Quantity};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: Quantity,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    /// Requested product ids with no catalog price, in request order.
    pub skipped: Vec<Uuid>,
    pub gross: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Exclusive upper bound on an order's gross amount; the order amount
/// columns are `NUMERIC(14, 2)`.
pub const GROSS_LIMIT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Prices `items` against `prices`. Items naming an unknown product are left
/// out of the totals and reported in [`PricedOrder::skipped`].
pub fn price_order(
    items: &[OrderItem],
    prices: &HashMap<Uuid, Decimal>,
    discount: DiscountPercentage,
) -> Result<PricedOrder, OrderError> {
    let mut lines = Vec::with_capacity(items.len());
    let mut skipped = Vec::new();
    let mut gross = Decimal::ZERO;
    for item in items {
        let Some(&unit_price) = prices.get(&item.product_id) else {
            skipped.push(item.product_id);
            continue;
        };
        let line_total = unit_price.checked_mul(item.quantity.as_decimal()).ok_or(OrderError::TotalTooLarge)?;
        gross = gross.checked_add(line_total).filter(|g| *g < GROSS_LIMIT).ok_or(OrderError::TotalTooLarge)?;
        lines.push(PricedLine { product_id: item.product_id, quantity: item.quantity, unit_price, line_total });
    }
    let discount_amount = discount.apply_to(gross);
    Ok(PricedOrder { lines, skipped, gross, discount: discount_amount, total: gross - discount_amount })
}
