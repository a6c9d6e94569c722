/// Number formatting for summaries and tables.
pub mod numbers {
    /// `1234567` -> `"1,234,567"`
    pub fn group_thousands(value: u64) -> String {
        let digits = value.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        grouped
    }

    /// Whole-dollar amount with grouping, e.g. `"$2,100"`. Cents are rounded
    /// half away from zero.
    pub fn format_currency(amount: f64) -> String {
        if !amount.is_finite() {
            return "$0".to_string();
        }
        let rounded = amount.abs().round();
        let sign = if amount < 0.0 && rounded > 0.0 { "-" } else { "" };
        format!("{}${}", sign, group_thousands(rounded as u64))
    }

    /// Two-decimal amount for table cells, e.g. `"1,250.50"`.
    pub fn format_amount(amount: f64) -> String {
        if !amount.is_finite() {
            return "0.00".to_string();
        }
        let cents = (amount.abs() * 100.0).round() as u64;
        let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, group_thousands(cents / 100), cents % 100)
    }
}

/// Date formatting for article cards.
pub mod dates {
    use chrono::{DateTime, Utc};

    /// `2024-10-01T08:30:00Z` -> `"October 1, 2024"`
    pub fn long_date(date: &DateTime<Utc>) -> String {
        date.format("%B %-d, %Y").to_string()
    }
}

/// Text helpers.
pub mod text {
    /// Truncate to at most `max_chars` characters, adding an ellipsis.
    pub fn truncate(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept.trim_end())
    }
}
