//! Dashboard and product-report reductions.
//!
//! Thin compositions over `shopdesk_shared::aggregate`: filtering out empty
//! groups, ranking and truncating is display policy and lives here.

use shopdesk_shared::aggregate::{self, GroupTotal, average, round_to};
use shopdesk_shared::protocol::{
    CategoryPerformanceRequest, CustomerInsightsRequest, DailySalesRequest,
    ProductPerformanceRequest,
};
use shopdesk_shared::{DateRange, Record};

use crate::api::{AdminApi, ApiError, HttpTransport};

pub const TOP_PRODUCTS: usize = 5;
pub const TOP_CUSTOMERS: usize = 10;

/// One fetch cycle of the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub daily_sales: Vec<Record>,
    pub product_performance: Vec<Record>,
    pub category_performance: Vec<Record>,
    pub customer_insights: Vec<Record>,
}

/// Fetch the four dashboard feeds concurrently. Any failure fails the whole
/// cycle and nothing partial is returned.
pub async fn load_dashboard<T: HttpTransport>(
    api: &AdminApi<T>,
    range: DateRange,
) -> Result<DashboardData, ApiError> {
    let daily = DailySalesRequest { range };
    let products = ProductPerformanceRequest { range };
    let categories = CategoryPerformanceRequest { range };

    let (daily_sales, product_performance, category_performance, customer_insights) = futures::try_join!(
        api.call(&daily),
        api.call(&products),
        api.call(&categories),
        api.call(&CustomerInsightsRequest),
    )?;

    Ok(DashboardData {
        daily_sales,
        product_performance,
        category_performance,
        customer_insights,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardMetrics {
    pub total_sales: f64,
    pub total_orders: i64,
    pub unique_customers: i64,
    pub avg_order_value: f64,
}

impl DashboardMetrics {
    pub fn from_daily_sales(daily: &[Record]) -> Self {
        let total_sales = aggregate::sum(daily, "total_sales");
        let total_orders = aggregate::sum_int(daily, "order_count");
        let unique_customers = aggregate::sum_int(daily, "unique_customers");
        let avg_order_value = round_to(
            average(total_sales, total_orders as f64),
            aggregate::DEFAULT_DECIMALS,
        );
        Self {
            total_sales,
            total_orders,
            unique_customers,
            avg_order_value,
        }
    }
}

/// Keep groups whose `metric` is positive, highest first, at most `limit`.
/// Ties keep first-appearance order.
pub fn ranked(mut groups: Vec<GroupTotal>, metric: &str, limit: Option<usize>) -> Vec<GroupTotal> {
    groups.retain(|g| g.metric(metric) > 0.0);
    groups.sort_by(|a, b| b.metric(metric).total_cmp(&a.metric(metric)));
    if let Some(limit) = limit {
        groups.truncate(limit);
    }
    groups
}

pub fn top_products(product_performance: &[Record]) -> Vec<GroupTotal> {
    let groups = aggregate::group_sum(
        product_performance,
        "product",
        "product_name",
        &["revenue", "units_sold"],
    );
    ranked(groups, "revenue", Some(TOP_PRODUCTS))
}

pub fn category_breakdown(category_performance: &[Record]) -> Vec<GroupTotal> {
    let groups = aggregate::group_sum(
        category_performance,
        "category",
        "category_name",
        &["revenue", "products_sold"],
    );
    ranked(groups, "revenue", None)
}

/// Share of `value` in `total` as a percentage, 0 when there is no total.
pub fn percent_of(value: f64, total: f64) -> f64 {
    average(value * 100.0, total)
}

pub fn top_customers(customer_insights: &[Record]) -> &[Record] {
    &customer_insights[..customer_insights.len().min(TOP_CUSTOMERS)]
}

/// Revenue per product for the report pie, keyed by display name
/// (`product_name`, or `Product ID <id>` when the name is missing).
pub fn revenue_by_product_name(rows: &[Record]) -> Vec<GroupTotal> {
    let named: Vec<Record> = rows
        .iter()
        .map(|row| {
            let name = row.text_field("product_name").unwrap_or_else(|| {
                format!(
                    "Product ID {}",
                    row.text_field("product").unwrap_or_default()
                )
            });
            row.clone().with("display_name", name)
        })
        .collect();
    let groups = aggregate::group_sum(&named, "display_name", "display_name", &["revenue", "units_sold"]);
    ranked(groups, "revenue", Some(TOP_PRODUCTS))
}

// =========================================================
// Formatting
// =========================================================

/// `1234567.5` → `"1,234,567.50"`.
pub fn format_amount(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed.trim_start_matches(['0', '.']).len() > 0 {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn format_currency(value: f64) -> String {
    format!("KES {}", format_amount(value, 2))
}

/// Rating to one decimal, `"N/A"` when absent.
pub fn format_rating(row: &Record, field: &str) -> String {
    row.numeric_field(field)
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::ScriptedTransport;
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    fn rows(raw: Value) -> Vec<Record> {
        serde_json::from_value(raw).unwrap()
    }

    fn range() -> DateRange {
        DateRange::last_days(NaiveDate::from_ymd_opt(2024, 6, 8).unwrap(), 7)
    }

    #[test]
    fn test_metrics() {
        let daily = rows(json!([
            {"date": "2024-06-01", "total_sales": "1000.50", "order_count": "3", "unique_customers": 2},
            {"date": "2024-06-02", "total_sales": "1200.25", "order_count": 4, "unique_customers": "bad"},
        ]));
        let m = DashboardMetrics::from_daily_sales(&daily);
        assert_eq!(m.total_sales, 2200.75);
        assert_eq!(m.total_orders, 7);
        assert_eq!(m.unique_customers, 2);
        assert_eq!(m.avg_order_value, 314.39);
    }

    #[test]
    fn test_metrics_empty() {
        assert_eq!(DashboardMetrics::from_daily_sales(&[]), DashboardMetrics::default());
    }

    #[test]
    fn test_top_products_filters_and_ranks() {
        let perf = rows(json!([
            {"product": 1, "product_name": "Chair", "revenue": "50", "units_sold": "1"},
            {"product": 2, "product_name": "Table", "revenue": "0", "units_sold": "0"},
            {"product": 3, "product_name": "Lamp", "revenue": "80", "units_sold": "2"},
            {"product": 1, "product_name": "Chair", "revenue": "40", "units_sold": "1"},
            {"product": 4, "product_name": "Rug", "revenue": "10"},
            {"product": 5, "product_name": "Sofa", "revenue": "5"},
            {"product": 6, "product_name": "Shelf", "revenue": "1"},
            {"product": 7, "product_name": "Stool", "revenue": "0.5"},
        ]));
        let top = top_products(&perf);
        let names: Vec<_> = top.iter().filter_map(|g| g.label.clone()).collect();
        assert_eq!(names, vec!["Chair", "Lamp", "Rug", "Sofa", "Shelf"]);
        assert_eq!(top[0].metric("revenue"), 90.0);
        assert_eq!(top[0].metric("units_sold"), 2.0);
    }

    #[test]
    fn test_category_breakdown_keeps_all_positive() {
        let perf = rows(json!([
            {"category": "a", "category_name": "Seating", "revenue": 10, "products_sold": 1},
            {"category": "b", "category_name": "Storage", "revenue": 30, "products_sold": 2},
            {"category": "c", "category_name": "Returns", "revenue": -4, "products_sold": 1},
        ]));
        let cats = category_breakdown(&perf);
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].label.as_deref(), Some("Storage"));
        assert_eq!(percent_of(cats[0].metric("revenue"), 40.0), 75.0);
        assert_eq!(percent_of(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_revenue_by_name_fallback() {
        let perf = rows(json!([
            {"product": 9, "revenue": 3, "units_sold": 1},
            {"product": 9, "product_name": null, "revenue": 4, "units_sold": 1},
            {"product": 2, "product_name": "Desk", "revenue": 1},
        ]));
        let groups = revenue_by_product_name(&perf);
        assert_eq!(groups[0].label.as_deref(), Some("Product ID 9"));
        assert_eq!(groups[0].metric("revenue"), 7.0);
        assert_eq!(groups[1].label.as_deref(), Some("Desk"));
    }

    #[test]
    fn test_top_customers_truncates() {
        let many: Vec<Record> = (0..15).map(|i| Record::new().with("id", i)).collect();
        assert_eq!(top_customers(&many).len(), 10);
        assert_eq!(top_customers(&many[..3]).len(), 3);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2200.75, 2), "2,200.75");
        assert_eq!(format_amount(1234567.5, 2), "1,234,567.50");
        assert_eq!(format_amount(999.999, 2), "1,000.00");
        assert_eq!(format_amount(0.0, 2), "0.00");
        assert_eq!(format_amount(-1500.0, 0), "-1,500");
        assert_eq!(format_amount(-0.001, 2), "0.00");
        assert_eq!(format_amount(f64::NAN, 2), "0.00");
        assert_eq!(format_currency(12.5), "KES 12.50");
    }

    #[test]
    fn test_format_rating() {
        let row = Record::new().with("average_rating", "4.25").with("bad", "x");
        assert_eq!(format_rating(&row, "average_rating"), "4.2");
        assert_eq!(format_rating(&row, "bad"), "N/A");
    }

    #[tokio::test]
    async fn test_load_dashboard_joins_all_feeds() {
        let transport = ScriptedTransport::default()
            .on("/api/salesanalysis/daily-sales/", 200, r#"[{"total_sales":"5"}]"#)
            .on("/api/salesanalysis/product-performance/", 200, "[]")
            .on("/api/salesanalysis/category-performance/", 200, "[]")
            .on("/api/salesanalysis/customer-insights/", 200, r#"[{"email":"a@b.c"}]"#);
        let api = AdminApi::new("", transport).with_token(Some("tok".into()));

        let data = load_dashboard(&api, range()).await.unwrap();

        assert_eq!(data.daily_sales.len(), 1);
        assert_eq!(data.customer_insights.len(), 1);
    }

    #[tokio::test]
    async fn test_load_dashboard_fails_fast() {
        let transport = ScriptedTransport::default()
            .on("/api/salesanalysis/daily-sales/", 200, "[]")
            .on("/api/salesanalysis/product-performance/", 500, "")
            .on("/api/salesanalysis/category-performance/", 200, "[]")
            .on("/api/salesanalysis/customer-insights/", 200, "[]");
        let api = AdminApi::new("", transport).with_token(Some("tok".into()));

        let err = load_dashboard(&api, range()).await.unwrap_err();

        assert_eq!(
            err,
            ApiError::Status {
                endpoint: "/api/salesanalysis/product-performance/".into(),
                status: 500
            }
        );
    }

    #[tokio::test]
    async fn test_load_dashboard_without_token() {
        let api = AdminApi::new("", ScriptedTransport::default());
        assert_eq!(
            load_dashboard(&api, range()).await.unwrap_err(),
            ApiError::MissingToken
        );
    }
}
