//! Order materialization: turns a priced draft into a persisted header and
//! line snapshots, and keeps them in step on edit and delete.

use chrono::Utc;
use uuid::Uuid;
use crate::domain::aggregates::{Order, OrderDetail, OrderDraft};
use crate::domain::pricing::{price_order, PricedOrder};
use crate::store::Store;
use crate::{BackofficeError, Result};

#[derive(Debug, Clone)]
pub struct MaterializedOrder {
    pub order: Order,
    /// Requested product ids that were not found and left out.
    pub skipped: Vec<Uuid>,
}

async fn price(store: &dyn Store, draft: &OrderDraft) -> Result<PricedOrder> {
    let prices = store.product_prices(&draft.product_ids()).await?;
    let priced = price_order(&draft.items, &prices, draft.discount)?;
    if !priced.skipped.is_empty() {
        tracing::warn!(skipped = ?priced.skipped, "order items reference unknown products and were left out");
    }
    Ok(priced)
}

pub async fn create_order(store: &dyn Store, draft: OrderDraft) -> Result<MaterializedOrder> {
    let priced = price(store, &draft).await?;
    let (order, lines) = Order::materialize(Uuid::now_v7(), &draft, &priced, Utc::now())?;
    store.insert_order(&order, &lines).await?;
    tracing::info!(order_id = %order.id, total = %order.total_amount, lines = lines.len(), "order created");
    Ok(MaterializedOrder { order, skipped: priced.skipped })
}

/// Reprices the whole order against current product amounts and replaces
/// every line.
pub async fn update_order(store: &dyn Store, id: Uuid, draft: OrderDraft) -> Result<MaterializedOrder> {
    let existing = store.find_order(id).await?.ok_or(BackofficeError::NotFound("Order"))?;
    let priced = price(store, &draft).await?;
    let (order, lines) = Order::materialize(id, &draft, &priced, existing.created_at)?;
    if !store.replace_order(&order, &lines).await? {
        return Err(BackofficeError::NotFound("Order"));
    }
    tracing::info!(order_id = %id, total = %order.total_amount, lines = lines.len(), "order updated");
    Ok(MaterializedOrder { order, skipped: priced.skipped })
}

pub async fn delete_order(store: &dyn Store, id: Uuid) -> Result<()> {
    if !store.delete_order(id).await? {
        return Err(BackofficeError::NotFound("Order"));
    }
    tracing::info!(order_id = %id, "order deleted");
    Ok(())
}

pub async fn order_detail(store: &dyn Store, id: Uuid) -> Result<OrderDetail> {
    let header = store.find_order(id).await?.ok_or(BackofficeError::NotFound("Order"))?;
    let lines = store.order_lines(id).await?;
    let detail = OrderDetail::assemble(header, lines);
    if !detail.is_consistent() {
        tracing::warn!(
            order_id = %id,
            stored = %detail.order.header.gross_amount,
            computed = %detail.order.subtotal_amount,
            "order subtotal differs from its lines"
        );
    }
    Ok(detail)
}
