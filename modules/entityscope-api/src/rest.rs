use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::warn;

use entityscope_common::{AnalysisHint, EntityScopeError};
use entityscope_engine::analyze_single;

use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub query: Option<String>,
    /// Display label of the engine being simulated, echoed into the prompt.
    #[serde(default)]
    pub llm_name: String,
    pub analysis_type: Option<AnalysisHint>,
}

/// One-shot persona analysis. The response body is the normalized result
/// record; parse failures inside the model reply never surface as errors.
pub async fn api_analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let query = body.query.as_deref().map(str::trim).unwrap_or("");
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Query is required"})),
        )
            .into_response();
    }

    let hint = body.analysis_type.unwrap_or(AnalysisHint::Entity);
    match analyze_single(state.client.as_ref(), query, &body.llm_name, hint).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            warn!(error = %e, "Analysis request failed");
            let message = match e {
                EntityScopeError::Upstream(message) => message,
                other => other.to_string(),
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Analysis failed", "message": message})),
            )
                .into_response()
        }
    }
}
