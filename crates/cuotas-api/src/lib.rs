//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::purchases: Entry form, live preview, browse and filter
//! - routes::payments: Installment payments per card
//! - routes::edit: Record selector and edit form
//! - routes::delete: Record selector and confirmed deletion
//! - routes::summary: Monthly summary and charts
//! - routes::settings: Configuration display

pub mod error;
pub mod form;
pub mod routes;

use axum::http::Method;
use axum::{routing::get, routing::post, Router};
use cuotas_config::Config;
use cuotas_core::{DataWarning, ErrorDetails, Ledger, RecordFilter};
use cuotas_utils::{escape_html, format_amount};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

pub use error::{ApiError, HtmlError};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::delete::{htmx_purchase_destroy, page_delete_select, page_purchase_delete};
    use routes::edit::{htmx_purchase_update, page_edit_select, page_purchase_edit};
    use routes::payments::{htmx_payment_store, htmx_payments_list, page_payments};
    use routes::purchases::{
        api_purchases, htmx_purchase_preview, htmx_purchase_store, htmx_purchases_list, page_purchase_new,
        page_purchases,
    };
    use routes::settings::{api_settings, page_settings};
    use routes::summary::{api_summary, page_summary};

    // JSON endpoints are read-only and may be polled from other origins
    let api = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/purchases", get(api_purchases))
        .route("/api/summary", get(api_summary))
        .route("/api/settings", get(api_settings))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]));

    Router::new()
        .merge(api)
        // Pages
        .route("/", get(index_page))
        .route("/purchases", get(page_purchases).post(htmx_purchase_store))
        .route("/purchases/new", get(page_purchase_new))
        .route("/payments", get(page_payments))
        .route("/edit", get(page_edit_select))
        .route("/delete", get(page_delete_select))
        .route("/summary", get(page_summary))
        .route("/settings", get(page_settings))
        // HTMX partials and actions
        .route("/purchases/list", get(htmx_purchases_list))
        .route("/purchases/preview", post(htmx_purchase_preview))
        .route("/purchases/:id", post(htmx_purchase_update))
        .route("/purchases/:id/edit", get(page_purchase_edit))
        .route("/purchases/:id/delete", get(page_purchase_delete).post(htmx_purchase_destroy))
        .route("/payments/list", get(htmx_payments_list))
        .route("/payments/:id", post(htmx_payment_store))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Cuotas</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
    <script>
    // Error responses carry a banner meant to be shown in place
    document.addEventListener('htmx:beforeSwap', function(e) {{
        if (e.detail.xhr.status >= 400) {{
            e.detail.shouldSwap = true;
            e.detail.isError = false;
        }}
    }});
    </script>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Inicio", "🏠"),
        ("/purchases/new", "Nueva compra", "➕"),
        ("/purchases", "Compras", "📋"),
        ("/payments", "Pagar cuotas", "💳"),
        ("/edit", "Editar", "✏️"),
        ("/delete", "Eliminar", "🗑️"),
        ("/summary", "Resumen mensual", "📈"),
        ("/settings", "Configuración", "⚙️"),
    ];

    // Longest matching prefix wins, so /purchases/new does not also light up /purchases
    let active = links
        .iter()
        .filter(|(path, _, _)| {
            if *path == "/" {
                current_path == "/"
            } else {
                current_path == *path || current_path.starts_with(&format!("{}/", path))
            }
        })
        .max_by_key(|(path, _, _)| path.len())
        .map(|(path, _, _)| *path);

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Cuotas</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, icon) in &links {
        let active_class = if active == Some(*path) {
            "bg-indigo-50 text-indigo-600"
        } else {
            "text-gray-600 hover:bg-gray-50"
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for a full page, or return it bare for HTMX swaps
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(
            title,
            &format!(
                r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
                nav_sidebar(current_path),
                inner_content
            ),
        )
    }
}

/// Money amount with the configured symbol and separators
pub fn money(config: &Config, value: f64) -> String {
    let currency = &config.currency;
    format!(
        "{}{}",
        currency.symbol,
        format_amount(
            value,
            currency.decimal_places as usize,
            &currency.thousands_separator,
            &currency.decimal_separator
        )
    )
}

/// Red banner for a failed action
pub fn error_banner(details: &ErrorDetails) -> String {
    let issues: String = details
        .issues
        .iter()
        .map(|i| format!("<li>{}</li>", escape_html(i)))
        .collect();
    let issues = if issues.is_empty() {
        String::new()
    } else {
        format!("<ul class='list-disc ml-6 mt-2 text-sm text-red-700'>{}</ul>", issues)
    };
    let suggestions: String = details
        .suggestions
        .iter()
        .map(|s| format!("<p class='text-xs text-red-500 mt-1'>{}</p>", escape_html(s)))
        .collect();
    format!(
        r#"<div class='bg-red-50 border border-red-200 rounded-lg p-4' data-error-code='{}'><div class='flex items-center gap-2'><span class='text-red-600'>✗</span><span class='font-medium text-red-800'>{}</span></div>{}{}</div>"#,
        details.code,
        escape_html(&details.message),
        issues,
        suggestions
    )
}

/// Green banner for a completed action
pub fn success_banner(title: &str, body: &str) -> String {
    format!(
        r#"<div class='bg-green-50 border border-green-200 rounded-lg p-4'><div class='flex items-center gap-2'><span class='text-green-600'>✓</span><span class='font-medium text-green-800'>{}</span></div><p class='text-sm text-green-700 mt-1'>{}</p></div>"#,
        escape_html(title),
        body
    )
}

/// Blue box for informational messages such as an empty ledger
pub fn info_box(message: &str) -> String {
    format!(
        r#"<div class='bg-blue-50 border border-blue-200 rounded-lg p-4 text-blue-800'>{}</div>"#,
        escape_html(message)
    )
}

/// Yellow notice listing values that were replaced while reading the ledger
pub fn warnings_notice(config: &Config, warnings: &[DataWarning]) -> String {
    if !config.validation.warn_on_coercion || warnings.is_empty() {
        return String::new();
    }
    let items: String = warnings
        .iter()
        .take(10)
        .map(|w| format!("<li>{}</li>", escape_html(&w.to_string())))
        .collect();
    let more = if warnings.len() > 10 {
        format!("<li>... y {} más</li>", warnings.len() - 10)
    } else {
        String::new()
    };
    format!(
        r#"<div class='bg-yellow-50 border border-yellow-200 rounded-lg p-4 mb-4'><p class='font-medium text-yellow-800'>Algunos valores de la planilla no se pudieron leer</p><ul class='list-disc ml-6 mt-2 text-sm text-yellow-700'>{}{}</ul></div>"#,
        items, more
    )
}

/// Dashboard with totals and shortcuts
async fn index_page(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<axum::response::Html<String>, HtmlError> {
    let ledger = state.ledger.read().await;
    let view = ledger.browse(RecordFilter::default()).await?;
    let config = &state.config;

    let open = view.records.iter().filter(|r| !r.fully_paid).count();
    let paid_off = view.records.len() - open;

    let per_card: String = if view.pending_by_card.is_empty() {
        "<p class='text-gray-500'>Todavía no hay compras registradas.</p>".to_string()
    } else {
        view.pending_by_card
            .iter()
            .map(|t| {
                format!(
                    "<div class='flex justify-between py-2 border-b'><span>{}</span><span class='font-medium'>{}</span></div>",
                    escape_html(t.card.name()),
                    money(config, t.pending)
                )
            })
            .collect()
    };

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Inicio</h2></div>
        {}
        <div class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4 mb-6'>
            <div class='bg-indigo-50 p-4 rounded-lg border border-indigo-200'><p class='text-sm text-indigo-600'>Saldo pendiente</p><p class='text-2xl font-bold text-indigo-700'>{}</p></div>
            <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Compras registradas</p><p class='text-2xl font-bold text-blue-700'>{}</p></div>
            <div class='bg-yellow-50 p-4 rounded-lg border border-yellow-200'><p class='text-sm text-yellow-600'>Con cuotas pendientes</p><p class='text-2xl font-bold text-yellow-700'>{}</p></div>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Pagadas</p><p class='text-2xl font-bold text-green-700'>{}</p></div>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Saldo por tarjeta</h3>
                <div class='space-y-1'>{}</div>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Accesos rápidos</h3>
                <div class='flex flex-col gap-2'>
                    <a href='/purchases/new' class='text-indigo-600 hover:underline'>Registrar una compra</a>
                    <a href='/payments' class='text-indigo-600 hover:underline'>Marcar una cuota como pagada</a>
                    <a href='/summary' class='text-indigo-600 hover:underline'>Ver el resumen mensual</a>
                </div>
            </div>
        </div>"#,
        warnings_notice(config, &view.warnings),
        money(config, view.total_pending),
        view.records.len(),
        open,
        paid_off,
        per_card
    );

    Ok(axum::response::Html(page_response(&headers, "Inicio", "/", &inner_content)))
}

/// Bind and serve until the process is stopped
pub async fn start_server(config: Config, ledger: Arc<RwLock<Ledger>>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { ledger, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting cuotas server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /purchases (Browse and filter)");
    log::info!("  - /purchases/new (New purchase)");
    log::info!("  - /payments (Pay installments)");
    log::info!("  - /summary (Monthly summary)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cuotas_core::LedgerPolicy;
    use cuotas_sheet::{CellValue, MemoryStore};
    use tower::ServiceExt;

    pub fn row(date: &str, merchant: &str, total: &str, count: u32, card: &str, paid: u32, id: &str) -> Vec<CellValue> {
        vec![
            CellValue::text(date),
            CellValue::text(merchant),
            CellValue::Empty,
            CellValue::text(total),
            CellValue::from(count),
            CellValue::text(card),
            CellValue::from(paid),
            CellValue::Empty,
            CellValue::text(id),
        ]
    }

    pub fn seeded_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_rows(vec![
            row("01/03/2024", "Store A", "1000.00", 4, "Naranja", 1, "a"),
            row("15/04/2024", "Store B", "600.00", 3, "Macro", 1, "b"),
            row("20/03/2024", "Store C", "300.00", 3, "Naranja", 3, "c"),
        ]))
    }

    pub fn app(store: Arc<MemoryStore>) -> Router {
        let ledger = Ledger::with_policy(store, LedgerPolicy::default());
        create_router(AppState {
            ledger: Arc::new(RwLock::new(ledger)),
            config: Config::default(),
        })
    }

    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(app: Router, uri: &str, body: &str) -> (StatusCode, String) {
        send(
            app,
            Request::post(uri)
                .header("content-type", "application/x-www-form-urlencoded")
                .header("hx-request", "true")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::test_support::get;
    use super::*;
    use axum::http::StatusCode;
    use cuotas_sheet::MemoryStore;

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(app(seeded_store()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_api_allows_cross_origin_reads() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let request = Request::get("/api/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app(seeded_store()).oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    }

    #[tokio::test]
    async fn test_dashboard_shows_totals() {
        let (status, body) = get(app(seeded_store()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("$1,150.00"));
        assert!(body.contains("Naranja"));
    }

    #[tokio::test]
    async fn test_dashboard_on_empty_ledger() {
        let (status, body) = get(app(Arc::new(MemoryStore::new())), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Todavía no hay compras"));
    }

    #[test]
    fn test_nav_marks_longest_match() {
        let nav = nav_sidebar("/purchases/new");
        assert!(nav.contains("href='/purchases/new' class='flex items-center gap-2 px-3 py-2 rounded-lg bg-indigo-50"));
        assert!(nav.contains("href='/purchases' class='flex items-center gap-2 px-3 py-2 rounded-lg text-gray-600"));
    }

    #[test]
    fn test_money_uses_currency_config() {
        let mut config = Config::default();
        assert_eq!(money(&config, 1234.5), "$1,234.50");
        config.currency.thousands_separator = ".".to_string();
        config.currency.decimal_separator = ",".to_string();
        assert_eq!(money(&config, 1234.5), "$1.234,50");
    }

    #[test]
    fn test_htmx_requests_get_bare_content() {
        let mut headers = axum::http::HeaderMap::new();
        assert!(page_response(&headers, "T", "/", "<p>x</p>").starts_with("<!DOCTYPE html>"));
        headers.insert("hx-request", "true".parse().unwrap());
        assert_eq!(page_response(&headers, "T", "/", "<p>x</p>"), "<p>x</p>");
    }
}
