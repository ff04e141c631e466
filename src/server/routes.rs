//! API route handlers.
//!
//! Forecast and log-viewer endpoints. State is shared via
//! `Arc<ServiceState>`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::aggregator::ForecastAggregator;
use crate::logbuf::{LogBuffer, LogEntry};
use crate::types::TargetDay;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServiceState {
    pub aggregator: ForecastAggregator,
    pub log: LogBuffer,
}

pub type AppState = Arc<ServiceState>;

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    day: Option<u8>,
}

/// GET /api/forecast?day=5|6
///
/// The day selector is validated before any upstream call happens;
/// anything but 5 (Friday) or 6 (Saturday) is a client error.
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Response {
    let day = query.day.unwrap_or(TargetDay::Friday.as_u8());
    let day = match TargetDay::try_from(day) {
        Ok(day) => day,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response();
        }
    };

    Json(state.aggregator.aggregate(day).await).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    format: Option<String>,
}

/// GET /api/logs (HTML view by default, `?format=json` for JSON).
pub async fn get_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Response {
    let entries = state.log.snapshot().await;

    if query.format.as_deref() == Some("json") {
        return Json(json!({ "logs": entries, "total": entries.len() })).into_response();
    }

    Html(render_logs_page(&entries)).into_response()
}

/// DELETE /api/logs
pub async fn clear_logs(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.log.clear().await;
    Json(json!({ "message": "logs cleared" }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Log viewer HTML
// ---------------------------------------------------------------------------

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render the self-refreshing log table served to a browser.
fn render_logs_page(entries: &[LogEntry]) -> String {
    let rows: String = if entries.is_empty() {
        r#"<tr><td colspan="3" class="empty">No log entries yet</td></tr>"#.to_string()
    } else {
        entries
            .iter()
            .map(|entry| {
                let details = entry
                    .details
                    .as_ref()
                    .map(|d| {
                        format!(
                            "<pre>{}</pre>",
                            escape_html(&serde_json::to_string_pretty(d).unwrap_or_default())
                        )
                    })
                    .unwrap_or_default();
                format!(
                    "<tr><td class=\"ts\">{}</td><td><span class=\"level {}\">{}</span></td>\
                     <td>{}{}</td></tr>",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                    entry.level,
                    entry.level,
                    escape_html(&entry.message),
                    details,
                )
            })
            .collect()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta http-equiv="refresh" content="5">
<title>CEEFGuru Logs</title>
<style>
  body {{ font-family: sans-serif; margin: 2rem; background: #f3f4f6; }}
  table {{ width: 100%; border-collapse: collapse; background: white; }}
  th, td {{ padding: 8px 12px; border-bottom: 1px solid #e5e7eb; text-align: left; vertical-align: top; }}
  .ts {{ font-family: monospace; white-space: nowrap; color: #6b7280; }}
  .level {{ font-size: 11px; text-transform: uppercase; padding: 2px 8px; border-radius: 10px; }}
  .level.info {{ background: #dbeafe; color: #1e40af; }}
  .level.success {{ background: #d1fae5; color: #065f46; }}
  .level.warning {{ background: #fef3c7; color: #92400e; }}
  .level.error {{ background: #fee2e2; color: #991b1b; }}
  pre {{ background: #f3f4f6; padding: 6px; font-size: 12px; margin: 6px 0 0 0; }}
  .empty {{ text-align: center; color: #9ca3af; padding: 3rem; }}
</style>
</head>
<body>
<h1>CEEFGuru logs ({count})</h1>
<table>
<tr><th>Timestamp</th><th>Level</th><th>Message</th></tr>
{rows}
</table>
</body>
</html>"#,
        count = entries.len(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
