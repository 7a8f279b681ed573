//! REST API endpoint handlers for the chart server.
//!
//! Reads are served from the published [`ChartView`](crate::state::ChartView);
//! writes go to the document store and come back to the chart through its
//! change stream; interactions are forwarded to the chart driver.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Chart page with the expense form |
//! | `GET` | `/chart.svg` | Latest frame as SVG |
//! | `GET` | `/api/expenses` | Current snapshot |
//! | `POST` | `/api/expenses` | Submit the expense form |
//! | `PUT` | `/api/expenses/{id}` | Change name and cost |
//! | `DELETE` | `/api/expenses/{id}` | Delete an expense |
//! | `GET` | `/api/frame` | Latest frame as JSON |
//! | `POST` | `/api/arcs/{id}/hover` | Pointer entered an arc |
//! | `DELETE` | `/api/arcs/{id}/hover` | Pointer left an arc |
//! | `POST` | `/api/arcs/{id}/click` | Arc clicked (delete request) |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use tally_core::ExpenseStore;
use tally_core::driver::ChartCommand;
use tally_core::form::{ExpenseForm, submit};
use tally_types::RecordId;
use tokio::sync::oneshot;

use crate::error::ApiError;
use crate::state::AppState;

/// Chart page. `{{chart}}` is replaced with the current SVG.
const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Tally</title>
    <style>
        body { font-family: system-ui, sans-serif; margin: 2rem; color: #333; }
        form { display: flex; gap: 0.5rem; align-items: end; }
        label { display: flex; flex-direction: column; font-size: 0.9rem; }
        #error { color: #c62828; min-height: 1.2em; }
        #tooltip { min-height: 1.2em; font-weight: bold; }
        path.arc { cursor: pointer; }
    </style>
</head>
<body>
    <h1>Tally</h1>
    <form id="expense-form">
        <label>Item <input id="name" name="name" autocomplete="off"></label>
        <label>Cost <input id="cost" name="cost" inputmode="decimal" autocomplete="off"></label>
        <button type="submit">Add expense</button>
    </form>
    <p id="error"></p>
    <p id="tooltip"></p>
    <div id="chart">{{chart}}</div>
    <script>
    const chart = document.getElementById('chart');
    const errorLine = document.getElementById('error');
    const tooltip = document.getElementById('tooltip');

    async function arc(method, id, action) {
        return fetch(`/api/arcs/${encodeURIComponent(id)}/${action}`, { method });
    }

    chart.addEventListener('mouseover', async (e) => {
        const id = e.target.dataset && e.target.dataset.id;
        if (!id) return;
        const res = await arc('POST', id, 'hover');
        if (res.ok) tooltip.textContent = (await res.json()).label;
    });
    chart.addEventListener('mouseout', async (e) => {
        const id = e.target.dataset && e.target.dataset.id;
        if (!id) return;
        tooltip.textContent = '';
        await arc('DELETE', id, 'hover');
    });
    chart.addEventListener('click', async (e) => {
        const id = e.target.dataset && e.target.dataset.id;
        if (id) await arc('POST', id, 'click');
    });

    document.getElementById('expense-form').addEventListener('submit', async (e) => {
        e.preventDefault();
        const name = document.getElementById('name');
        const cost = document.getElementById('cost');
        const res = await fetch('/api/expenses', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ name: name.value, cost: cost.value }),
        });
        if (res.ok) {
            name.value = '';
            cost.value = '';
            errorLine.textContent = '';
        } else {
            errorLine.textContent = (await res.json()).error;
        }
    });

    function connect() {
        const ws = new WebSocket(`${location.protocol === 'https:' ? 'wss' : 'ws'}://${location.host}/ws/frames`);
        ws.onmessage = async () => {
            const res = await fetch('/chart.svg');
            if (res.ok) chart.innerHTML = await res.text();
        };
        ws.onclose = () => setTimeout(connect, 1000);
    }
    connect();
    </script>
</body>
</html>
"#;

// ---------------------------------------------------------------------------
// GET / -- chart page
// ---------------------------------------------------------------------------

/// Serve the chart page with the current chart inlined.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let svg = state.view.borrow().svg.clone();
    Html(INDEX_TEMPLATE.replace("{{chart}}", &svg))
}

// ---------------------------------------------------------------------------
// GET /chart.svg -- latest frame as SVG
// ---------------------------------------------------------------------------

/// Serve the latest frame as an SVG document.
pub async fn chart_svg(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let svg = state.view.borrow().svg.clone();
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg)
}

// ---------------------------------------------------------------------------
// /api/expenses
// ---------------------------------------------------------------------------

/// List the records the chart is currently drawn from, in chart order.
pub async fn list_expenses(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let records = state.view.borrow().records.clone();
    Json(serde_json::json!({
        "count": records.len(),
        "expenses": records,
    }))
}

/// Validate the expense form and create the expense.
///
/// The chart picks the new record up from the store's change stream.
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ExpenseForm>,
) -> Result<impl IntoResponse, ApiError> {
    let id = submit(state.store.as_ref(), &form).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Replace an expense's name and cost.
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<ExpenseForm>,
) -> Result<impl IntoResponse, ApiError> {
    let update = form.validate()?;
    let record = state.store.modify(&RecordId::from(id), update)?;
    Ok(Json(record))
}

/// Delete an expense. Deleting an unknown id succeeds.
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete_by_id(&RecordId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /api/frame -- latest frame as JSON
// ---------------------------------------------------------------------------

/// Serve the latest frame.
pub async fn get_frame(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let frame = state.view.borrow().frame.clone();
    Json(frame)
}

// ---------------------------------------------------------------------------
// /api/arcs/{id} -- pointer interaction
// ---------------------------------------------------------------------------

async fn send(state: &AppState, command: ChartCommand) -> Result<(), ApiError> {
    state
        .commands
        .send(command)
        .await
        .map_err(|_| ApiError::DriverUnavailable)
}

/// Highlight an arc and return its tooltip.
pub async fn hover_enter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (reply, rx) = oneshot::channel();
    let record_id = RecordId::from(id);
    send(
        &state,
        ChartCommand::HoverEnter {
            record_id: record_id.clone(),
            reply,
        },
    )
    .await?;
    let tooltip = rx
        .await
        .map_err(|_| ApiError::DriverUnavailable)?
        .ok_or_else(|| ApiError::NotFound(format!("arc {record_id}")))?;

    Ok(Json(serde_json::json!({
        "label": tooltip.to_string(),
        "tooltip": tooltip,
    })))
}

/// Restore an arc's fill.
pub async fn hover_exit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    send(
        &state,
        ChartCommand::HoverExit {
            record_id: RecordId::from(id),
        },
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request deletion of the clicked arc's record.
///
/// Accepted, not done: the arc exits when the store confirms the delete.
pub async fn click(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    send(
        &state,
        ChartCommand::Click {
            record_id: RecordId::from(id),
        },
    )
    .await?;
    Ok(StatusCode::ACCEPTED)
}
