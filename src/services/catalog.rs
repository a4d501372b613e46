use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::{ApiClient, CatalogApi};
use crate::db::Database;
use crate::models::{CachedCatalog, CatalogData, CatalogEntry, CatalogSnapshot, ColorEntry};

const CATALOG_CACHE_KEY: &str = "catalog_cache";
const CATALOG_MAX_AGE_HOURS: i64 = 24;

/// Pick-lists a quotation form offers, restricted to active entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    pub categories: Vec<CatalogEntry>,
    pub products: Vec<CatalogEntry>,
    pub materials: Vec<CatalogEntry>,
    pub finishes: Vec<CatalogEntry>,
    pub units: Vec<CatalogEntry>,
    pub payment_methods: Vec<CatalogEntry>,
}

/// Reference data mirror. The remote catalog changes rarely, so a durable
/// copy is trusted for 24 hours and re-served when a refresh fails.
pub struct CatalogCache<A = ApiClient> {
    api: A,
    store: Arc<Mutex<Database>>,
    data: CatalogData,
    error: Option<String>,
}

impl<A: CatalogApi> CatalogCache<A> {
    pub fn new(api: A, store: Arc<Mutex<Database>>) -> Self {
        CatalogCache {
            api,
            store,
            data: CatalogData::default(),
            error: None,
        }
    }

    pub async fn load(&mut self, force_refresh: bool) -> CatalogSnapshot {
        self.error = None;

        if !force_refresh {
            if let Some(cached) = self.read_durable() {
                if Utc::now() - cached.timestamp < Duration::hours(CATALOG_MAX_AGE_HOURS) {
                    self.data = cached.data;
                    return self.snapshot();
                }
            }
        }

        match self.api.fetch_catalog().await {
            Ok(data) => {
                self.write_durable(&data);
                self.data = data;
                info!("catalog refreshed from remote");
            }
            Err(err) => {
                warn!(error = %err, "catalog fetch failed, serving durable copy");
                if let Some(cached) = self.read_durable() {
                    self.data = cached.data;
                }
                self.error = Some(err.to_string());
            }
        }

        self.snapshot()
    }

    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }

    fn read_durable(&self) -> Option<CachedCatalog> {
        let store = self.store.lock().ok()?;
        let raw = store.get_value(CATALOG_CACHE_KEY).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(cached) => Some(cached),
            Err(err) => {
                // Stored shape predates the current schema; treat as a miss.
                warn!(error = %err, "stored catalog record no longer parses, ignoring it");
                None
            }
        }
    }

    fn write_durable(&self, data: &CatalogData) {
        let record = CachedCatalog {
            data: data.clone(),
            timestamp: Utc::now(),
        };
        let serialized = match serde_json::to_string(&record) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(error = %err, "could not serialize catalog record");
                return;
            }
        };
        match self.store.lock() {
            Ok(store) => {
                if let Err(err) = store.set_value(CATALOG_CACHE_KEY, &serialized) {
                    warn!(error = %err, "could not persist catalog record");
                }
            }
            Err(_) => warn!("local store lock poisoned, catalog record not persisted"),
        }
    }

    /// Resolves a category id to its display name. Never fails: an id with
    /// no catalog entry is returned verbatim.
    pub fn category_name(&self, id: &str) -> String {
        name_in(&self.data.categories, id)
    }

    pub fn material_name(&self, id: &str) -> String {
        name_in(&self.data.materials, id)
    }

    pub fn finish_name(&self, id: &str) -> String {
        name_in(&self.data.finishes, id)
    }

    pub fn payment_method_name(&self, id: &str) -> String {
        name_in(&self.data.payment_methods, id)
    }

    pub fn color_name(&self, id: &str) -> String {
        self.data
            .colors
            .iter()
            .find(|color| color.id == id)
            .map(|color| color.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn form_options(&self) -> FormOptions {
        FormOptions {
            categories: active_entries(&self.data.categories),
            products: active_entries(&self.data.products),
            materials: active_entries(&self.data.materials),
            finishes: active_entries(&self.data.finishes),
            units: active_entries(&self.data.units),
            payment_methods: active_entries(&self.data.payment_methods),
        }
    }

    /// Active colors scoped to a material. When the scoped list comes back
    /// empty (miscatalogued data), the full active list is returned instead
    /// so the picker is never empty.
    pub fn colors_for_material(&self, material_id: &str) -> Vec<ColorEntry> {
        let active: Vec<&ColorEntry> = self
            .data
            .colors
            .iter()
            .filter(|color| color.is_active())
            .collect();

        let scoped: Vec<ColorEntry> = active
            .iter()
            .filter(|color| color.material_id.as_deref() == Some(material_id))
            .map(|color| (*color).clone())
            .collect();

        if scoped.is_empty() {
            active.into_iter().cloned().collect()
        } else {
            scoped
        }
    }
}

fn name_in(entries: &[CatalogEntry], id: &str) -> String {
    entries
        .iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn active_entries(entries: &[CatalogEntry]) -> Vec<CatalogEntry> {
    entries
        .iter()
        .filter(|entry| entry.is_active())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct FakeCatalogApi {
        data: CatalogData,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl CatalogApi for FakeCatalogApi {
        async fn fetch_catalog(&self) -> ApiResult<CatalogData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ApiError::Api {
                    message: "backend unreachable".to_string(),
                })
            } else {
                Ok(self.data.clone())
            }
        }
    }

    fn entry(id: &str, name: &str, active: Option<i64>) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            active,
        }
    }

    fn color(id: &str, name: &str, active: Option<i64>, material_id: Option<&str>) -> ColorEntry {
        ColorEntry {
            id: id.to_string(),
            name: name.to_string(),
            active,
            material_id: material_id.map(|m| m.to_string()),
        }
    }

    fn sample_catalog() -> CatalogData {
        CatalogData {
            categories: vec![entry("cat-1", "Cocinas", None)],
            materials: vec![
                entry("mat-1", "Pino", Some(1)),
                entry("mat-2", "Encino", None),
                entry("mat-3", "Triplay", Some(0)),
            ],
            colors: vec![
                color("col-1", "Nogal claro", Some(1), Some("mat-1")),
                color("col-2", "Chocolate", None, Some("mat-2")),
                color("col-3", "Blanco mate", Some(0), Some("mat-1")),
            ],
            finishes: vec![entry("fin-1", "Laca satinada", None)],
            ..CatalogData::default()
        }
    }

    fn new_store() -> Arc<Mutex<Database>> {
        Arc::new(Mutex::new(Database::open_in_memory().unwrap()))
    }

    fn seed_record(store: &Arc<Mutex<Database>>, data: CatalogData, age_hours: i64) {
        let record = CachedCatalog {
            data,
            timestamp: Utc::now() - Duration::hours(age_hours),
        };
        store
            .lock()
            .unwrap()
            .set_value(CATALOG_CACHE_KEY, &serde_json::to_string(&record).unwrap())
            .unwrap();
    }

    fn cache_with(
        store: Arc<Mutex<Database>>,
        data: CatalogData,
        fail: bool,
    ) -> (CatalogCache<FakeCatalogApi>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let api = FakeCatalogApi {
            data,
            fail,
            calls: calls.clone(),
        };
        (CatalogCache::new(api, store), calls)
    }

    #[tokio::test]
    async fn fresh_record_skips_the_network() {
        let store = new_store();
        seed_record(&store, sample_catalog(), 1);
        let (mut cache, calls) = cache_with(store, CatalogData::default(), false);

        let snapshot = cache.load(false).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(snapshot.data.materials.len(), 3);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn stale_record_fetches_once_and_rewrites_the_timestamp() {
        let store = new_store();
        seed_record(&store, CatalogData::default(), 25);
        let before = Utc::now();
        let (mut cache, calls) = cache_with(store.clone(), sample_catalog(), false);

        let snapshot = cache.load(false).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.data.materials.len(), 3);

        let raw = store
            .lock()
            .unwrap()
            .get_value(CATALOG_CACHE_KEY)
            .unwrap()
            .unwrap();
        let record: CachedCatalog = serde_json::from_str(&raw).unwrap();
        assert!(record.timestamp >= before);
        assert_eq!(record.data.materials.len(), 3);
    }

    #[tokio::test]
    async fn forced_refresh_ignores_a_fresh_record() {
        let store = new_store();
        seed_record(&store, CatalogData::default(), 1);
        let (mut cache, calls) = cache_with(store, sample_catalog(), false);

        let snapshot = cache.load(true).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.data.materials.len(), 3);
    }

    #[tokio::test]
    async fn fetch_failure_serves_the_durable_copy_with_an_error() {
        let store = new_store();
        seed_record(&store, sample_catalog(), 40);
        let (mut cache, calls) = cache_with(store, CatalogData::default(), true);

        let snapshot = cache.load(false).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.data.materials.len(), 3);
        let error = snapshot.error.expect("error should surface");
        assert!(!error.is_empty());
    }

    #[tokio::test]
    async fn unparseable_record_counts_as_a_miss() {
        let store = new_store();
        store
            .lock()
            .unwrap()
            .set_value(CATALOG_CACHE_KEY, "{\"legacy\":true}")
            .unwrap();
        let (mut cache, calls) = cache_with(store, sample_catalog(), false);

        let snapshot = cache.load(false).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.data.materials.len(), 3);
    }

    #[tokio::test]
    async fn lookups_fall_back_to_the_id() {
        let (mut cache, _calls) = cache_with(new_store(), sample_catalog(), false);
        cache.load(true).await;

        assert_eq!(cache.material_name("mat-1"), "Pino");
        assert_eq!(cache.material_name("mat-404"), "mat-404");
        assert_eq!(cache.color_name("col-2"), "Chocolate");
        assert_eq!(cache.color_name("desconocido"), "desconocido");
    }

    #[tokio::test]
    async fn form_options_exclude_only_explicitly_inactive_entries() {
        let (mut cache, _calls) = cache_with(new_store(), sample_catalog(), false);
        cache.load(true).await;

        let options = cache.form_options();
        let ids: Vec<&str> = options.materials.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["mat-1", "mat-2"]);
    }

    #[tokio::test]
    async fn colors_scope_to_material_and_relax_when_empty() {
        let (mut cache, _calls) = cache_with(new_store(), sample_catalog(), false);
        cache.load(true).await;

        let scoped = cache.colors_for_material("mat-1");
        let ids: Vec<&str> = scoped.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["col-1"]);

        // No active colors reference this material; the full active list
        // comes back instead of an empty picker.
        let relaxed = cache.colors_for_material("mat-999");
        let ids: Vec<&str> = relaxed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["col-1", "col-2"]);
    }
}
