use serde_json::Value;

use super::render_scalar;

/// Key answer fields, checked in priority order against the result object.
const PRIORITY_KEYS: [&str; 10] = [
    "time_weighted_return",
    "money_weighted_return",
    "modified_dietz_return",
    "composite_return",
    "min_holding_years",
    "cagr",
    "sharpe_ratio",
    "max_drawdown",
    "active_return",
    "compliance_level",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    // Unwrap the computation envelope when present.
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", render_scalar(val));
                    return;
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, render_scalar(val));
            return;
        }
    }

    println!("{}", render_scalar(result));
}
