/// Placeholder rendered for an absent value.
pub const MISSING: &str = "N/A";

/// `12.3%`, or [`MISSING`].
pub fn format_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v))
        .unwrap_or_else(|| MISSING.to_string())
}

/// `12.3`, or [`MISSING`].
pub fn format_score(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Shortest exact form with at least one decimal: `1.0`, `0.2`, `0.25`.
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.1}", weight)
    } else {
        weight.to_string()
    }
}
