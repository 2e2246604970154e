use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use log::{error, info};
use serde_json::json;

use crate::db;
use crate::models::{NewVisitRequest, VisitRequest};
use crate::schema::visits::dsl as v;
use crate::AppState;

/// Stores a "schedule a visit" lead. Notification delivery is handled
/// by a separate service; this endpoint only captures the request.
pub async fn schedule_visit(
    State(state): State<AppState>,
    Json(request): Json<NewVisitRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, String)> {
    let record = request
        .into_record()
        .map_err(|message| (StatusCode::UNPROCESSABLE_ENTITY, message))?;

    let mut conn = db::establish_connection(&state.config.database_url).map_err(|e| {
        error!("Failed to connect to database: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database connection failed".to_string(),
        )
    })?;

    let created: VisitRequest = diesel::insert_into(v::visits)
        .values(&record)
        .get_result(&mut conn)
        .map_err(|e| {
            error!("Failed to store visit request: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to store visit request: {}", e),
            )
        })?;

    info!(
        "Stored visit request {} for property {}",
        created.id, created.property_id
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Visit request received", "visit": created })),
    ))
}
