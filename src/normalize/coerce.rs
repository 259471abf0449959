//! Lenient scalar coercion for values that may arrive as numbers or strings.

use serde_json::Value;

/// Integer from a JSON number (integral) or a numeric string.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strictly positive integer that fits in `u32`.
pub fn as_positive_u32(value: &Value) -> Option<u32> {
    as_i64(value)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

/// Non-negative count; tier winner counts may legitimately be zero.
pub fn as_count(value: &Value) -> Option<u32> {
    as_i64(value)
        .filter(|n| *n >= 0)
        .and_then(|n| u32::try_from(n).ok())
}

/// Decimal amount. Strings may use Brazilian formatting ("1.234.567,89").
pub fn as_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_brazilian_decimal(s),
        _ => None,
    }
}

fn parse_brazilian_decimal(s: &str) -> Option<f64> {
    let cleaned = s.trim().trim_start_matches("R$").trim();
    if cleaned.is_empty() {
        return None;
    }
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    normalized.parse().ok().filter(|f: &f64| f.is_finite())
}

/// Non-empty trimmed string content.
pub fn as_text(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
