use crate::consts::{API_RUNNING, CALL_LOGGED, DEFAULT_LIST_LIMIT, MAX_LISTED_COLLECTIONS};
use crate::db_types::{collection_name, CallLog, CallLogCreate};
use crate::error::AppError;
use crate::store::{create_document, get_documents};
use crate::types::{AppState, ConnectionStatus, DatabaseStatus, DiagnosticReport};
use crate::utils::{document_to_json, panic_text};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use bson::{doc, Document};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": API_RUNNING }))
}

/// Fill in the store-related fields of `report`.
async fn probe_store(app_state: &AppState, report: &mut DiagnosticReport) {
    let store = match app_state.store() {
        Ok(store) => store,
        Err(_) => {
            report.database = DatabaseStatus::NotInitialized;
            return;
        }
    };
    report.connection_status = ConnectionStatus::Connected;
    debug!(database = store.database_name(), "probing document store");
    match store.list_collection_names().await {
        Ok(mut names) => {
            names.truncate(MAX_LISTED_COLLECTIONS);
            report.collections = names;
            report.database = DatabaseStatus::Working;
        }
        Err(e) => {
            warn!(error=%e, "diagnostic store probe failed");
            report.database = DatabaseStatus::degraded(&e.to_string());
        }
    }
}

/// Diagnostic report. Always answers 200; failures end up in the body.
pub async fn test_database(State(app_state): State<Arc<AppState>>) -> Json<DiagnosticReport> {
    let mut report = DiagnosticReport::new(&app_state.config);
    let probe = AssertUnwindSafe(probe_store(&app_state, &mut report))
        .catch_unwind()
        .await;
    if let Err(payload) = probe {
        let text = panic_text(payload.as_ref());
        warn!(panic=%text, "diagnostic store probe panicked");
        report.database = DatabaseStatus::error(&text);
    }
    debug!(report=?report, "diagnostic report");
    Json(report)
}

#[derive(Debug, Serialize)]
pub struct CallCreated {
    pub id: String,
    pub message: &'static str,
}

pub async fn create_call(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CallLogCreate>, JsonRejection>,
) -> Result<Json<CallCreated>, AppError> {
    let Json(raw) = payload?;
    let call = CallLog::try_from(raw)?;
    let store = app_state.store()?;
    let id = create_document(store, &collection_name::<CallLog>(), &call).await?;
    info!(id=%id, category=%call.category, "call logged");
    Ok(Json(CallCreated {
        id,
        message: CALL_LOGGED,
    }))
}

fn default_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct ListCallsParams {
    pub category: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl ListCallsParams {
    fn filter(&self) -> Document {
        match self.category.as_deref() {
            Some(category) if !category.is_empty() => doc! { "category": category },
            _ => Document::new(),
        }
    }
}

pub async fn list_calls(
    State(app_state): State<Arc<AppState>>,
    params: Result<Query<ListCallsParams>, QueryRejection>,
) -> Result<Json<Vec<Value>>, AppError> {
    let Query(params) = params?;
    let store = app_state.store()?;
    let docs = get_documents(
        store,
        &collection_name::<CallLog>(),
        params.filter(),
        params.limit,
    )
    .await?;
    debug!(count = docs.len(), params=?params, "listed calls");
    Ok(Json(docs.into_iter().map(document_to_json).collect()))
}
