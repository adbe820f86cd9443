//! Presentation-side reductions over record lists.
//!
//! Nothing here fails: a field that is missing or does not parse simply
//! contributes zero. Rounding happens once, on the final total.

use crate::record::Record;
use serde_json::Value;
use std::collections::HashMap;

/// Decimal places kept by [`sum`] and [`group_sum`].
pub const DEFAULT_DECIMALS: u32 = 2;

/// Float sum of `field`, rounded to [`DEFAULT_DECIMALS`].
pub fn sum(records: &[Record], field: &str) -> f64 {
    sum_with(records, field, Record::numeric_field, DEFAULT_DECIMALS)
}

/// Sum with a custom parser and precision. `parse` returning `None` adds 0.
pub fn sum_with<P>(records: &[Record], field: &str, parse: P, decimals: u32) -> f64
where
    P: Fn(&Record, &str) -> Option<f64>,
{
    let total = records
        .iter()
        .map(|record| parse(record, field).unwrap_or(0.0))
        .sum::<f64>();
    round_to(total, decimals)
}

/// Integer sum of `field` using `parseInt`-style parsing.
pub fn sum_int(records: &[Record], field: &str) -> i64 {
    records
        .iter()
        .map(|record| record.integer_field(field).unwrap_or(0))
        .fold(0i64, i64::saturating_add)
}

/// `total / count`, or 0 when `count` is zero or the result is not finite.
pub fn average(total: f64, count: f64) -> f64 {
    if count == 0.0 {
        return 0.0;
    }
    let avg = total / count;
    if avg.is_finite() { avg } else { 0.0 }
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // avoid handing out -0.0 to the views
    if rounded == 0.0 { 0.0 } else { rounded }
}

// =========================================================
// Grouping
// =========================================================

/// One partition produced by [`group_sum`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    /// Group key as sent by the backend; `Null` when the field was absent.
    pub key: Value,
    /// Label taken from the first record seen for this key.
    pub label: Option<String>,
    /// `(metric field, rounded sum)` in the order the metrics were requested.
    pub metrics: Vec<(String, f64)>,
}

impl GroupTotal {
    /// Summed value of `field`, 0 if it was not one of the requested metrics.
    pub fn metric(&self, field: &str) -> f64 {
        self.metrics
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    pub fn key_text(&self) -> String {
        match &self.key {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Flatten back into a record so the group can be sorted or rendered
    /// like any other row.
    pub fn to_record(&self, key_field: &str, label_field: &str) -> Record {
        let mut record = Record::new().with(key_field, self.key.clone());
        record.set(
            label_field,
            self.label.clone().map(Value::String).unwrap_or(Value::Null),
        );
        for (name, value) in &self.metrics {
            record.set(name.clone(), *value);
        }
        record
    }
}

/// Partition `records` by `key_field` and sum each of `metric_fields` per
/// partition. Groups come out in order of first appearance.
///
/// Keys compare by JSON identity: `1` and `"1"` are different groups.
/// Records missing the key and records with a `null` key share one group.
pub fn group_sum(
    records: &[Record],
    key_field: &str,
    label_field: &str,
    metric_fields: &[&str],
) -> Vec<GroupTotal> {
    let mut index: HashMap<Option<String>, usize> = HashMap::new();
    let mut raw: Vec<(Value, Option<String>, Vec<f64>)> = Vec::new();

    for record in records {
        let key = record.get(key_field);
        let identity = key.filter(|v| !v.is_null()).map(Value::to_string);
        let slot = *index.entry(identity).or_insert_with(|| {
            raw.push((
                key.cloned().unwrap_or(Value::Null),
                record.text_field(label_field),
                vec![0.0; metric_fields.len()],
            ));
            raw.len() - 1
        });

        let sums = &mut raw[slot].2;
        for (sum, field) in sums.iter_mut().zip(metric_fields) {
            *sum += record.numeric_field(field).unwrap_or(0.0);
        }
    }

    raw.into_iter()
        .map(|(key, label, sums)| GroupTotal {
            key,
            label,
            metrics: metric_fields
                .iter()
                .zip(sums)
                .map(|(field, sum)| (field.to_string(), round_to(sum, DEFAULT_DECIMALS)))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(raw: Value) -> Vec<Record> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_sum_strings() {
        let data = rows(json!([{"total_sales": "1000.50"}, {"total_sales": "1200.25"}]));
        assert_eq!(sum(&data, "total_sales"), 2200.75);
    }

    #[test]
    fn test_sum_ignores_malformed() {
        let data = rows(json!([
            {"total_sales": null, "order_count": "not-a-number"},
            {"total_sales": "1200.25", "order_count": "7"}
        ]));
        assert_eq!(sum(&data, "total_sales"), 1200.25);
        assert_eq!(sum_int(&data, "order_count"), 7);
        assert_eq!(sum(&data, "missing"), 0.0);
    }

    #[test]
    fn test_sum_empty() {
        assert_eq!(sum(&[], "total_sales"), 0.0);
        assert_eq!(sum_int(&[], "order_count"), 0);
    }

    #[test]
    fn test_sum_int_saturates_huge_counts() {
        let data = rows(json!([
            {"order_count": "1"},
            {"order_count": "1"},
            {"order_count": "9999999999999999999999"}
        ]));
        assert_eq!(sum_int(&data, "order_count"), i64::MAX);
    }

    #[test]
    fn test_sum_rounds_once() {
        // 0.1 + 0.2 drifts to 0.30000000000000004 before rounding
        let data = rows(json!([{"v": 0.1}, {"v": 0.2}, {"v": "0.004"}, {"v": "0.004"}]));
        assert_eq!(sum(&data, "v"), 0.31);
        assert_eq!(sum_with(&data, "v", Record::numeric_field, 0), 0.0);
    }

    #[test]
    fn test_average_zero_count() {
        assert_eq!(average(1234.5, 0.0), 0.0);
        assert_eq!(average(0.0, 0.0), 0.0);
        assert_eq!(average(10.0, 4.0), 2.5);
        assert_eq!(average(f64::NAN, 1.0), 0.0);
    }

    #[test]
    fn test_group_sum_insertion_order() {
        let data = rows(json!([
            {"product": 2, "product_name": "Lamp", "revenue": "10.10", "units_sold": "1"},
            {"product": 1, "product_name": "Desk", "revenue": "200", "units_sold": 2},
            {"product": 2, "product_name": "Lamp (old name)", "revenue": 5.05, "units_sold": "x"},
        ]));
        let groups = group_sum(&data, "product", "product_name", &["revenue", "units_sold"]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, json!(2));
        assert_eq!(groups[0].label.as_deref(), Some("Lamp"));
        assert_eq!(groups[0].metric("revenue"), 15.15);
        assert_eq!(groups[0].metric("units_sold"), 1.0);
        assert_eq!(groups[1].label.as_deref(), Some("Desk"));
        assert_eq!(groups[1].metric("revenue"), 200.0);
        assert_eq!(groups[1].metric("not-requested"), 0.0);
    }

    #[test]
    fn test_group_keys_are_opaque() {
        let data = rows(json!([
            {"category": 1, "revenue": 1},
            {"category": "1", "revenue": 2},
            {"revenue": 3},
            {"category": null, "revenue": 4},
            {"revenue": 5},
        ]));
        let groups = group_sum(&data, "category", "category_name", &["revenue"]);
        let totals: Vec<f64> = groups.iter().map(|g| g.metric("revenue")).collect();
        assert_eq!(totals, vec![1.0, 2.0, 12.0]);
        assert_eq!(groups[2].key, Value::Null);
        assert_eq!(groups[2].label, None);
        assert_eq!(groups.iter().filter(|g| g.key.is_null()).count(), 1);
    }

    #[test]
    fn test_group_to_record() {
        let data = rows(json!([{"category": 3, "category_name": "Chairs", "revenue": "9.99"}]));
        let group = &group_sum(&data, "category", "category_name", &["revenue"])[0];
        let record = group.to_record("category_id", "name");
        assert_eq!(record.integer_field("category_id"), Some(3));
        assert_eq!(record.text_field("name").as_deref(), Some("Chairs"));
        assert_eq!(record.numeric_field("revenue"), Some(9.99));
        assert_eq!(group.key_text(), "3");
    }
}
