//! Sales report over a date range.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use crate::domain::aggregates::Order;
use crate::store::Store;
use crate::{BackofficeError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_orders: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub total_products: i64,
    pub total_customers: usize,
}

impl ReportSummary {
    pub fn from_orders(orders: &[Order]) -> Self {
        let customers: HashSet<String> = orders.iter().map(|o| o.customer_email.trim().to_lowercase()).collect();
        Self {
            total_orders: orders.len(),
            total_revenue: orders.iter().map(|o| o.total_amount).sum(),
            total_products: orders.iter().map(|o| i64::from(o.total_products)).sum(),
            total_customers: customers.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report { pub summary: ReportSummary, pub orders: Vec<Order> }

/// Inclusive calendar-day range, in UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange { pub start: Option<NaiveDate>, pub end: Option<NaiveDate> }

impl DateRange {
    /// Parses `YYYY-MM-DD` bounds; blank strings mean "open".
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let parse = |raw: Option<&str>, field: &str| -> Result<Option<NaiveDate>> {
            match raw.map(str::trim).filter(|s| !s.is_empty()) {
                None => Ok(None),
                Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|_| BackofficeError::validation(format!("{field} must be a date in YYYY-MM-DD form"))),
            }
        };
        let range = Self { start: parse(start, "startDate")?, end: parse(end, "endDate")? };
        if let (Some(s), Some(e)) = (range.start, range.end) {
            if s > e { return Err(BackofficeError::validation("startDate must not be after endDate")); }
        }
        Ok(range)
    }

    /// Half-open timestamp bounds `[from, until)`.
    pub fn bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let from = self.start.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc());
        let until = self.end
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc());
        (from, until)
    }
}

pub async fn sales_report(store: &dyn Store, range: DateRange) -> Result<Report> {
    let (from, until) = range.bounds();
    let orders = store.orders_between(from, until).await?;
    Ok(Report { summary: ReportSummary::from_orders(&orders), orders })
}
