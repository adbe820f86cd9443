//! Turning form input into record fields.
//!
//! Inputs arrive as strings. Numeric fields are sent as JSON numbers, an
//! integer when the text is one, and an unparseable field becomes `0`.

use serde_json::Value;
use shopdesk_shared::Record;

pub fn number_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::from(0);
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    match raw.parse::<f64>() {
        Ok(float) if float.is_finite() => Value::from(float),
        _ => Value::from(0),
    }
}

/// Text for an input bound to `field`; numbers render without quotes and
/// missing values as empty.
pub fn input_text(record: &Record, field: &str) -> String {
    record.text_field(field).unwrap_or_default()
}

/// Apply one edited input. Fields listed in `text_fields` keep the raw
/// string; everything else goes through [`number_value`].
pub fn apply_input(record: &mut Record, field: &str, raw: &str, text_fields: &[&str]) {
    if text_fields.contains(&field) {
        record.set(field, raw.to_string());
    } else {
        record.set(field, number_value(raw));
    }
}

/// Apply a `<select>` bound to a numeric id. The empty placeholder option
/// clears the field to `null`.
pub fn apply_choice(record: &mut Record, field: &str, raw: &str) {
    if raw.trim().is_empty() {
        record.set(field, Value::Null);
    } else {
        record.set(field, number_value(raw));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_value() {
        assert_eq!(number_value("12"), json!(12));
        assert_eq!(number_value(" 4.5 "), json!(4.5));
        assert_eq!(number_value(""), json!(0));
        assert_eq!(number_value("abc"), json!(0));
        assert_eq!(number_value("1e999"), json!(0));
    }

    #[test]
    fn test_apply_input() {
        let mut entry = Record::new().with("date", "2024-06-01").with("revenue", "10.00");
        apply_input(&mut entry, "revenue", "99.5", &["date"]);
        apply_input(&mut entry, "date", "2024-06-02", &["date"]);

        assert_eq!(entry.get("revenue"), Some(&json!(99.5)));
        assert_eq!(input_text(&entry, "date"), "2024-06-02");
        assert_eq!(input_text(&entry, "missing"), "");
    }

    #[test]
    fn test_empty_choice_is_null() {
        let mut product = Record::new().with("category", 2);
        apply_choice(&mut product, "category", "5");
        assert_eq!(product.get("category"), Some(&json!(5)));

        apply_choice(&mut product, "category", "");
        assert_eq!(product.get("category"), Some(&Value::Null));
        assert!(product.form_fields(&[]).iter().all(|(name, _)| name != "category"));
    }
}
