use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{middleware, Router};
use diesel::prelude::*;
use std::net::SocketAddr;

use imoveis_backend::{config, db, properties, visits, AppState};

async fn require_admin(
    headers: HeaderMap,
    axum::extract::State(state): axum::extract::State<AppState>,
    request: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> Result<axum::response::Response, (StatusCode, String)> {
    let token = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing or malformed Authorization header".to_string(),
        ))?;
    if token != state.config.admin_token {
        return Err((StatusCode::UNAUTHORIZED, "Invalid admin token".to_string()));
    }
    Ok(next.run(request).await)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = config::AppConfig::load()?;
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    let mut conn = db::establish_connection(&config.database_url)
        .map_err(|e| format!("Failed to connect to database: {}", e))?;
    let test_query: i32 = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("1"))
        .get_result(&mut conn)?;
    log::info!("Database test query result: {}", test_query);
    drop(conn);

    log::info!("Starting server on {}", addr);

    let state = AppState { config };
    let protected_routes = Router::new()
        .route("/api/properties", post(properties::create_property))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let app = Router::new()
        .route("/", get(|| async { "Edvar Imóveis API" }))
        .route("/api/properties", get(properties::get_properties))
        .route("/api/properties/:id", get(properties::get_property))
        .route("/api/schedule-visit", post(visits::schedule_visit))
        .merge(protected_routes)
        .with_state(state);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app.into_make_service()).await?;

    Ok(())
}
