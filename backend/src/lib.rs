pub mod config;
pub mod db;
pub mod filter;
pub mod models;
pub mod properties;
pub mod schema;
pub mod visits;

#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
}
