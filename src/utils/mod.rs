pub mod de;
pub mod generation;
pub mod page;
pub mod table;
pub mod time;

pub use de::null_as_default;
pub use generation::{Generation, Ticket};
pub use page::Page;
pub use table::Table;
pub use time::{format_day, format_minute, parse_timestamp};

/// Compact, locale-independent number formatting for labels
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    if value.abs() >= 1000.0 {
        let whole = value.round() as i64;
        let digits = whole.unsigned_abs().to_string();
        let mut grouped = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if whole < 0 {
            format!("-{}", grouped)
        } else {
            grouped
        }
    } else {
        format!("{:.2}", value)
    }
}
