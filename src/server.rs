use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::feedback::{FeedbackError, FeedbackRequest, Submission, SuccessBody};
use crate::platform::ChannelSender;

/// Shared state for the HTTP side of the relay.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sender: Arc<dyn ChannelSender>,
}

/// `POST /api/feedback` plus the mini app files served from `static_dir`.
pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/api/feedback", post(submit_feedback))
        .fallback_service(assets)
        .with_state(state)
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app).await.context("HTTP server error")?;
    Ok(())
}

async fn submit_feedback(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SuccessBody>, FeedbackError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("feedback", %request_id);

    async move {
        let request = match body {
            Ok(Json(body)) => FeedbackRequest::from_json(&body),
            Err(rejection) => {
                debug!("Unreadable feedback body: {}", rejection);
                FeedbackRequest::default()
            }
        };

        // Validation first, so a bad request never reveals configuration state.
        let submission = Submission::from_request(request)?;
        let channel = state
            .config
            .channel_id
            .as_deref()
            .ok_or(FeedbackError::Configuration)?;

        let report = submission.report(Utc::now());
        state
            .sender
            .send_markdown(channel, &report)
            .await
            .map_err(FeedbackError::Upstream)?;

        info!(
            "Relayed {} from {} to {}",
            submission.kind.label().to_lowercase(),
            submission.author,
            channel
        );
        Ok(Json(SuccessBody::sent()))
    }
    .instrument(span)
    .await
}
