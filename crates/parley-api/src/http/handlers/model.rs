//! Model discovery HTTP handler.
//!
//! - GET /models - Models visible to the configured API key

use axum::Json;
use axum::extract::State;

use parley_types::llm::ModelInfo;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /models
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelInfo>>, AppError> {
    Ok(Json(state.chat_service.list_models().await?))
}
