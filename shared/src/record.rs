//! Loosely-typed rows returned by the admin REST API.
//!
//! A `Record` keeps every field the backend sent, whatever its JSON type.
//! Numeric reads go through [`Record::numeric_field`] / [`Record::integer_field`],
//! which yield `None` for missing, `null`, empty, or non-numeric values.
//! Callers decide what `None` means; the aggregator counts it as zero.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert, handy for fixtures and form payloads.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Raw field access. `None` means the field is absent, which is not the
    /// same as `Some(Value::Null)`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field parsed the way `parseFloat` would: leading numeric prefix of a
    /// string, or the number itself.
    pub fn numeric_field(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(parse_float)
    }

    /// Field parsed the way `parseInt` would: leading integer prefix of a
    /// string, or the number truncated toward zero.
    pub fn integer_field(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(parse_int)
    }

    /// Display text for a field. `null` and missing both yield `None`.
    pub fn text_field(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Text form of every field for a `multipart/form-data` body. `null`
    /// fields and the ones named in `skip` are left out; arrays and objects
    /// go as compact JSON.
    pub fn form_fields(&self, skip: &[&str]) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(name, value)| !value.is_null() && !skip.contains(&name.as_str()))
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), text)
            })
            .collect()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Compact JSON.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// =========================================================
// Lenient number parsing
// =========================================================

pub fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => float_prefix(s),
        _ => None,
    }
}

pub fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
        }),
        Value::String(s) => int_prefix(s),
        _ => None,
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn sign_len(bytes: &[u8]) -> usize {
    usize::from(matches!(bytes.first(), Some(b'+' | b'-')))
}

/// Longest prefix of `raw` (after leading whitespace) that reads as a decimal
/// number, e.g. `"12.5kg"` → `12.5`, `"abc"` → `None`.
fn float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();

    let mut end = sign_len(bytes);
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_start = end + 1;
        let exp_sign = sign_len(&bytes[exp_start..]);
        let exp_digits = count_digits(&bytes[exp_start + exp_sign..]);
        if exp_digits > 0 {
            end = exp_start + exp_sign + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Longest prefix that reads as a base-10 integer, e.g. `"7.9"` → `7`.
/// Out-of-range digits saturate at the `i64` bounds.
fn int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    let digits = count_digits(&bytes[sign..]);
    if digits == 0 {
        return None;
    }
    match s[..sign + digits].parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if bytes[0] == b'-' => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}
