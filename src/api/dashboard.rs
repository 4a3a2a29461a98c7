//! Health, dashboard counts and sales reports.

use axum::{extract::{Query, State}, Json};
use serde::Deserialize;
use serde_json::json;
use crate::services::reports::{sales_report, DateRange, Report};
use crate::store::Counts;
use crate::{AppState, Result};

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": "shop-backoffice" }))
}

pub async fn counts(State(s): State<AppState>) -> Result<Json<Counts>> {
    Ok(Json(s.store.counts().await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery { pub start_date: Option<String>, pub end_date: Option<String> }

pub async fn reports(State(s): State<AppState>, Query(q): Query<ReportQuery>) -> Result<Json<Report>> {
    let range = DateRange::parse(q.start_date.as_deref(), q.end_date.as_deref())?;
    Ok(Json(sales_report(s.store.as_ref(), range).await?))
}
