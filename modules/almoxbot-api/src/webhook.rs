use std::sync::Arc;

use axum::{extract::State, response::Json};
use tracing::{debug, info, warn};

use crate::pipeline::{Outcome, Pipeline, Update};

pub struct AppState {
    pub pipeline: Pipeline,
}

/// Telegram webhook endpoint. Always acknowledges with `{"status":"ok"}` —
/// any non-success response would make the platform retransmit the update.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    match serde_json::from_value::<Update>(body) {
        Ok(update) => match state.pipeline.handle_update(&update).await {
            Outcome::Ignored(reason) => debug!(?reason, "Update ignored"),
            Outcome::Processed {
                items,
                reply,
                notification,
            } => {
                info!(items, ?notification, "Update processed");
                debug!(reply = %reply, "Confirmation composed");
            }
            Outcome::Failed {
                error,
                notification,
            } => warn!(error = %error, ?notification, "Update failed"),
        },
        Err(e) => {
            debug!(error = %e, "Discarding unparseable webhook body");
        }
    }

    Json(serde_json::json!({ "status": "ok" }))
}

/// Liveness probe for the hosting platform.
pub async fn health() -> &'static str {
    "Bot está vivo!"
}
