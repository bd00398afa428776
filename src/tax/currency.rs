pub const CURRENCY_PREFIX: &str = "Rs. ";
pub const DEFAULT_CURRENCY_PLACEHOLDER: &str = "0.00";
pub const DEFAULT_TEXT_PLACEHOLDER: &str = "N/A";

/// `Rs. 1,234,567.50`; absent or non-finite values render as `placeholder`.
pub fn format_currency(value: Option<f64>, placeholder: &str) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{CURRENCY_PREFIX}{}", group_thousands(value)),
        _ => placeholder.to_string(),
    }
}

pub fn safe_str(value: Option<&str>, placeholder: &str) -> String {
    value.unwrap_or(placeholder).to_string()
}

fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let negative = value < 0.0 && fixed.chars().any(|ch| ch.is_ascii_digit() && ch != '0');
    format!("{}{grouped}.{fraction}", if negative { "-" } else { "" })
}
