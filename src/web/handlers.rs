//! HTTP handlers for the dashboard.

use crate::web::state::{DashboardState, FieldFrame};
use axum::{
    extract::State,
    response::{Html, Json},
};
use serde_json::json;

/// Latest field frame as JSON.
pub async fn get_fields(State(state): State<DashboardState>) -> Json<FieldFrame> {
    Json(state.latest())
}

/// Health check endpoint.
pub async fn health_check(State(state): State<DashboardState>) -> Json<serde_json::Value> {
    let frame = state.latest();
    Json(json!({
        "status": "ok",
        "service": "latte-sense",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "last_update": frame.updated_at.to_rfc3339(),
        "websocket_clients": state.client_count(),
    }))
}

/// The dashboard page.
pub async fn index(State(state): State<DashboardState>) -> Html<String> {
    Html(INDEX_HTML.replace("{{title}}", &escape_html(state.title())))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{title}}</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f4f4f4;
            color: #333;
            padding: 20px;
        }
        h1 { font-size: 1.6rem; }
        table { border-collapse: collapse; background: white; }
        td { padding: 6px 16px; border-bottom: 1px solid #ddd; }
        td.value { font-family: monospace; text-align: right; min-width: 10em; }
        td.unknown { color: #999; font-style: italic; }
        #status { margin-top: 12px; font-size: 0.85rem; color: #666; }
    </style>
</head>
<body>
    <h1>{{title}}</h1>
    <table id="fields"></table>
    <div id="status">connecting...</div>
    <script>
        const table = document.getElementById('fields');
        const status = document.getElementById('status');

        function render(frame) {
            table.innerHTML = '';
            for (const field of frame.fields) {
                const row = table.insertRow();
                row.insertCell().textContent = field.label;
                const value = row.insertCell();
                value.textContent = field.text;
                value.className = field.text === 'unknown' ? 'value unknown' : 'value';
            }
            status.textContent = 'updated ' + new Date(frame.updated_at).toLocaleTimeString();
        }

        fetch('/api/fields').then(r => r.json()).then(render);

        function connect() {
            const proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
            const ws = new WebSocket(proto + location.host + '/ws');
            ws.onmessage = event => render(JSON.parse(event.data));
            ws.onclose = () => {
                status.textContent = 'disconnected, retrying...';
                setTimeout(connect, 2000);
            };
        }
        connect();
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FieldTable;
    use crate::sensors::SensorLayout;

    fn state() -> DashboardState {
        DashboardState::new(&FieldTable::for_layout(&SensorLayout::default()), "Panda <demo>")
    }

    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = health_check(State(state())).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["websocket_clients"], 0);
    }

    #[tokio::test]
    async fn test_get_fields() {
        let Json(frame) = get_fields(State(state())).await;
        assert_eq!(frame.fields[0].key, "T0");
    }

    #[tokio::test]
    async fn test_index_escapes_title() {
        let Html(page) = index(State(state())).await;
        assert!(page.contains("Panda &lt;demo&gt;"));
        assert!(!page.contains("{{title}}"));
    }
}
