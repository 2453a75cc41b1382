//! `application/x-www-form-urlencoded` bodies as sent by HTMX forms

use chrono::NaiveDate;
use cuotas_core::codec::parse_date;
use std::collections::HashMap;

/// Decoded form fields; repeated keys keep the last value
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
}

impl FormData {
    pub fn parse(body: &str) -> Self {
        let mut fields = HashMap::new();
        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            fields.insert(decode(key), decode(value));
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Trimmed text, empty when missing
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    /// Decimal number; thousands commas are ignored
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = self.get(key)?.trim().replace(',', "");
        value.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Non-negative whole number
    pub fn count(&self, key: &str) -> Option<u32> {
        self.get(key)?.trim().parse::<u32>().ok()
    }

    /// Date from a `type=date` input (`yyyy-mm-dd`) or typed as `dd/mm/yyyy`
    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        let value = self.get(key)?.trim();
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .or_else(|| parse_date(value))
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes_plus_and_percent() {
        let form = FormData::parse("merchant=Caf%C3%A9+Tortoni&notes=&total_amount=1%2C000.50&confirm=yes");
        assert_eq!(form.text("merchant"), "Café Tortoni");
        assert_eq!(form.text("notes"), "");
        assert_eq!(form.number("total_amount"), Some(1000.5));
        assert_eq!(form.get("confirm"), Some("yes"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn test_numbers_and_dates() {
        let form = FormData::parse("a=4&b=-1&c=abc&d=2024-03-01&e=1/3/2024&f=ayer");
        assert_eq!(form.count("a"), Some(4));
        assert_eq!(form.count("b"), None);
        assert_eq!(form.number("c"), None);
        assert_eq!(form.date("d"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(form.date("e"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(form.date("f"), None);
    }
}
