//! Deleting purchases

use serde::Serialize;

use crate::model::{Purchase, PurchaseView};

/// Confirmation step shown before a purchase is removed
#[derive(Debug, Clone, Serialize)]
pub struct DeletionNotice {
    pub purchase: PurchaseView,
    pub warning: String,
}

impl DeletionNotice {
    pub fn for_purchase(purchase: &Purchase) -> Self {
        Self {
            purchase: purchase.view(),
            warning: format!(
                "¿Seguro que querés eliminar la compra del {} en {}? Esta acción no se puede deshacer.",
                purchase.display_date(),
                purchase.merchant
            ),
        }
    }
}

/// Whether a form value confirms a deletion
pub fn is_confirmed(value: Option<&str>) -> bool {
    matches!(value.map(|v| v.trim().to_ascii_lowercase()).as_deref(), Some("yes" | "si" | "sí" | "true"))
}
