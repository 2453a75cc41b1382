//! Route modules for the API server
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON endpoints, HTMX fragments and actions
//! - page.rs: HTMX page rendering

pub mod delete;
pub mod edit;
pub mod payments;
pub mod purchases;
pub mod settings;
pub mod summary;

use cuotas_core::{Card, RecordId, SelectionOption};
use cuotas_utils::escape_html;

/// Path segment for a record ID
pub(crate) fn id_segment(id: &RecordId) -> String {
    urlencoding::encode(id.as_str()).into_owned()
}

/// Whether `card` is one of the configured card names
pub(crate) fn is_known_card(known: &[String], card: &Card) -> bool {
    known.iter().any(|n| Card::from_name(n) == *card)
}

/// `<option>` list for card selects; `selected` is marked, and added if unknown
pub(crate) fn card_options(known: &[String], selected: Option<&Card>) -> String {
    let mut names: Vec<String> = known.to_vec();
    if let Some(card) = selected {
        if !is_known_card(known, card) {
            names.push(card.name().to_string());
        }
    }
    names
        .iter()
        .map(|name| {
            let is_selected = selected.map(|c| Card::from_name(name) == *c).unwrap_or(false);
            format!(
                "<option value='{}'{}>{}</option>",
                escape_html(name),
                if is_selected { " selected" } else { "" },
                escape_html(name)
            )
        })
        .collect()
}

/// Record selector that loads `/purchases/{id}/{action}` into `target`.
///
/// With `oob` the markup is meant to ride along another response and
/// replace the selector already on the page.
pub(crate) fn record_selector(
    element_id: &str,
    options: &[SelectionOption],
    selected: Option<&RecordId>,
    action: &str,
    target: &str,
    oob: bool,
) -> String {
    let items: String = options
        .iter()
        .map(|o| {
            format!(
                "<option value='{}'{}>{}</option>",
                escape_html(o.id.as_str()),
                if selected == Some(&o.id) { " selected" } else { "" },
                escape_html(&o.label)
            )
        })
        .collect();
    format!(
        r#"<select id='{id}'{oob} class='w-full px-3 py-2 border rounded-lg bg-white' onchange="if (this.value) htmx.ajax('GET', '/purchases/' + encodeURIComponent(this.value) + '/{action}', '{target}')"><option value=''>Elegí una compra</option>{items}</select>"#,
        id = element_id,
        oob = if oob { " hx-swap-oob='true'" } else { "" },
        action = action,
        target = target,
        items = items
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_selector_marks_selection() {
        let options = vec![
            SelectionOption { id: RecordId::new("a"), label: "1. 01/03/2024 - Store A ($1000.00)".to_string() },
            SelectionOption { id: RecordId::new("b"), label: "2. 15/04/2024 - Store B ($600.00)".to_string() },
        ];
        let html = record_selector("edit-selector", &options, Some(&RecordId::new("b")), "edit", "#edit-form", true);
        assert!(html.contains("<option value='b' selected>2. 15/04/2024 - Store B ($600.00)</option>"));
        assert!(html.contains("<option value='a'>"));
        assert!(html.contains("hx-swap-oob='true'"));
        assert!(html.contains("'/edit', '#edit-form'"));
    }

    #[test]
    fn test_card_options_add_unknown_selection() {
        let known = vec!["Naranja".to_string(), "Macro".to_string()];
        let html = card_options(&known, Some(&Card::Other("Visa".to_string())));
        assert!(html.contains("<option value='Naranja'>"));
        assert!(html.contains("<option value='Visa' selected>"));

        let html = card_options(&known, Some(&Card::Macro));
        assert!(html.contains("<option value='Macro' selected>"));
        assert!(!html.contains("Visa"));
    }
}
