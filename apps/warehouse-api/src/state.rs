use sea_orm::DatabaseConnection;

use crate::config::Config;

/// Shared application state
///
/// Cloning is cheap: the connection is a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
}
