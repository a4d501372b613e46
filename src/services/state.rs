use std::sync::{Arc, Mutex};

use crate::api::ApiClient;
use crate::db::Database;
use crate::services::auth::AuthStore;
use crate::services::catalog::CatalogCache;
use crate::services::quotes::QuoteStore;

/// Service objects built once at startup and handed to every command.
pub struct AppState {
    pub auth: Mutex<AuthStore>,
    pub catalog: tokio::sync::Mutex<CatalogCache>,
    pub quotes: tokio::sync::Mutex<QuoteStore>,
}

impl AppState {
    pub fn new(api: ApiClient, db: Database) -> Self {
        let store = Arc::new(Mutex::new(db));
        AppState {
            auth: Mutex::new(AuthStore::new(store.clone())),
            catalog: tokio::sync::Mutex::new(CatalogCache::new(api.clone(), store)),
            quotes: tokio::sync::Mutex::new(QuoteStore::new(api)),
        }
    }
}
