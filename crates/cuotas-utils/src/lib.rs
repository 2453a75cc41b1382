//! Utility functions and helpers

/// Insert a separator every three digits of an unsigned integer string
pub fn group_thousands(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format a money amount, e.g. `1234.5` -> `1,234.50`
pub fn format_amount(value: f64, decimals: usize, thousands: &str, decimal: &str) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    // -0.00 is shown as 0.00
    let negative = value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.');

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part, thousands));
    if let Some(frac) = frac_part {
        out.push_str(decimal);
        out.push_str(frac);
    }
    out
}

/// Escape text for safe interpolation into HTML bodies and attributes
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Generate a unique record ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
