//! Unit formatting for dashboard cards.

/// Fraction as a percentage with one decimal: `0.124` -> `"12.4%"`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Two-decimal ratio, used for Sharpe.
pub fn format_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

/// Whole US dollars with thousands separators: `-1234.6` -> `"-$1,235"`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(rounded.abs() as u64))
}

pub fn format_count(value: u64) -> String {
    group_thousands(value)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
