use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::repository::Repository;
use crate::services::weather::WeatherProvider;

pub struct AppState {
    /// Session store.
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub repo: Box<dyn Repository>,
    pub weather: Box<dyn WeatherProvider>,
}
