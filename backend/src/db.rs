use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::error;

/// Opens a connection for the current request. The service holds no
/// pool; each handler connects, works and drops.
pub fn establish_connection(database_url: &str) -> Result<PgConnection, ConnectionError> {
    PgConnection::establish(database_url).map_err(|e| {
        error!("Failed to establish database connection: {}", e);
        e
    })
}
