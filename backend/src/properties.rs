use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use diesel::prelude::*;
use log::{error, info};
use uuid::Uuid;

use crate::db;
use crate::filter::{CountFilter, Filter, RawFilter};
use crate::models::{NewPropertyRequest, Property};
use crate::schema::properties::dsl as p;
use crate::AppState;

/// Translates an escaped substring into a case-insensitive LIKE pattern.
pub fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn db_unavailable(e: diesel::ConnectionError) -> (StatusCode, String) {
    error!("Failed to connect to database: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database connection failed".to_string(),
    )
}

/// Creates a new listing from a full payload; the id and creation
/// timestamp are assigned here.
pub async fn create_property(
    State(state): State<AppState>,
    Json(request): Json<NewPropertyRequest>,
) -> Result<(StatusCode, Json<Property>), (StatusCode, String)> {
    let record = request
        .into_record()
        .map_err(|message| (StatusCode::UNPROCESSABLE_ENTITY, message))?;

    let mut conn = db::establish_connection(&state.config.database_url).map_err(db_unavailable)?;

    let created: Property = diesel::insert_into(p::properties)
        .values(&record)
        .get_result(&mut conn)
        .map_err(|e| {
            error!("Failed to insert property: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to insert property: {}", e),
            )
        })?;

    info!("Created property {} (code {})", created.id, created.code);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Lists properties matching the raw query-string filters.
pub async fn get_properties(
    State(state): State<AppState>,
    Query(raw): Query<RawFilter>,
) -> Result<Json<Vec<Property>>, (StatusCode, String)> {
    let filter = Filter::from_raw(&raw);
    info!("Fetching properties with filter: {:?}", filter);

    let mut conn = db::establish_connection(&state.config.database_url).map_err(db_unavailable)?;

    let mut query = p::properties.order_by(p::created_at.desc()).into_boxed();
    if let Some(deal_type) = filter.deal_type {
        query = query.filter(p::deal_type.eq(deal_type));
    }
    if let Some(fragment) = &filter.location_substring {
        query = query.filter(p::location.ilike(like_pattern(fragment)));
    }
    match filter.bedrooms {
        Some(CountFilter::Exactly(n)) => query = query.filter(p::bedrooms.eq(n)),
        Some(CountFilter::AtLeast(n)) => query = query.filter(p::bedrooms.ge(n)),
        None => {}
    }
    match filter.bathrooms {
        Some(CountFilter::Exactly(n)) => query = query.filter(p::bathrooms.eq(n)),
        Some(CountFilter::AtLeast(n)) => query = query.filter(p::bathrooms.ge(n)),
        None => {}
    }
    if let Some(min) = filter.min_price {
        query = query.filter(p::price.ge(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(p::price.le(max));
    }

    let rows = query.load::<Property>(&mut conn).map_err(|e| {
        error!("Failed to fetch properties: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to fetch properties: {}", e),
        )
    })?;

    // The SQL translation above and Filter::matches must agree; the
    // in-memory pass is idempotent over an already-filtered set.
    let matches = filter.evaluate(rows);
    info!("Successfully fetched {} properties", matches.len());
    Ok(Json(matches))
}

/// Fetches a single listing by id.
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Property>, (StatusCode, String)> {
    let not_found = || (StatusCode::NOT_FOUND, "Property not found".to_string());

    // An id that is not a valid Uuid cannot name a record.
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let mut conn = db::establish_connection(&state.config.database_url).map_err(db_unavailable)?;

    let found = p::properties
        .find(id)
        .first::<Property>(&mut conn)
        .optional()
        .map_err(|e| {
            error!("Failed to fetch property: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch property: {}", e),
            )
        })?;

    match found {
        Some(property) => Ok(Json(property)),
        None => {
            info!("Property not found: {}", id);
            Err(not_found())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("ipiranga"), "%ipiranga%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
