//! Settings page rendering - Full page endpoints

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use cuotas_utils::escape_html;

use crate::{page_response, AppState};

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sí"
    } else {
        "No"
    }
}

pub async fn page_settings(state: State<AppState>, headers: HeaderMap) -> Html<String> {
    let config = &state.config;
    let store_description = state.ledger.read().await.store_description();

    let sheets = match &config.store.sheets {
        Some(sheets) => format!(
            r#"<div><p class='text-sm text-gray-500'>Planilla</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Hoja</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Token de acceso</p><p class='font-medium'>{}</p></div>"#,
            escape_html(&sheets.spreadsheet_id),
            escape_html(&sheets.sheet_name),
            if sheets.resolve_token().is_some() { "Configurado" } else { "No configurado" }
        ),
        None => String::new(),
    };

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Configuración</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Servidor</h3>
            <div class='grid grid-cols-2 gap-4'>
                <div><p class='text-sm text-gray-500'>Host</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Puerto</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Almacenamiento</h3>
            <div class='grid grid-cols-2 gap-4'>
                <div><p class='text-sm text-gray-500'>Tipo</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Origen</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Completar IDs al iniciar</p><p class='font-medium'>{}</p></div>
                {}
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Tarjetas y validación</h3>
            <div class='grid grid-cols-2 gap-4'>
                <div><p class='text-sm text-gray-500'>Tarjetas</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Validar compras nuevas</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Avisar valores corregidos</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Formato y registro</h3>
            <div class='grid grid-cols-2 gap-4'>
                <div><p class='text-sm text-gray-500'>Moneda</p><p class='font-medium'>{} ({} decimales)</p></div>
                <div><p class='text-sm text-gray-500'>Separadores</p><p class='font-medium'>miles '{}', decimales '{}'</p></div>
                <div><p class='text-sm text-gray-500'>Leyenda en gráficos</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Nivel de log</p><p class='font-medium'>{}</p></div>
            </div>
        </div>"#,
        escape_html(&config.server.host),
        config.server.port,
        config.store.backend,
        escape_html(&store_description),
        yes_no(config.store.backfill_ids),
        sheets,
        escape_html(&config.cards.known.join(", ")),
        yes_no(config.validation.enforce_on_create),
        yes_no(config.validation.warn_on_coercion),
        escape_html(&config.currency.symbol),
        config.currency.decimal_places,
        escape_html(&config.currency.thousands_separator),
        escape_html(&config.currency.decimal_separator),
        yes_no(config.charts.show_legend),
        escape_html(&config.logging.level)
    );

    Html(page_response(&headers, "Configuración", "/settings", &inner_content))
}
