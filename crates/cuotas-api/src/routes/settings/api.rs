//! Settings API endpoints - JSON API

use axum::extract::State;
use axum::Json;
use cuotas_config::Config;

use crate::AppState;

/// Effective configuration; the Sheets access token is never serialized
pub async fn api_settings(state: State<AppState>) -> Json<Config> {
    Json(state.config.clone())
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::{create_router, AppState};
    use axum::http::StatusCode;
    use cuotas_config::{Config, SheetsConfig};
    use cuotas_core::{Ledger, LedgerPolicy};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[tokio::test]
    async fn test_settings_hide_access_token() {
        let mut config = Config::default();
        config.store.sheets = Some(SheetsConfig {
            spreadsheet_id: "sheet-123".to_string(),
            access_token: Some("secret-token".to_string()),
            ..SheetsConfig::default()
        });
        let ledger = Ledger::with_policy(seeded_store(), LedgerPolicy::default());
        let router = create_router(AppState {
            ledger: Arc::new(RwLock::new(ledger)),
            config,
        });

        let (status, body) = get(router.clone(), "/api/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("sheet-123"));
        assert!(!body.contains("secret-token"));

        let (status, body) = get(router, "/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("sheet-123"));
        assert!(!body.contains("secret-token"));
        assert!(body.contains("Configurado"));
    }
}
