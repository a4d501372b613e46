use tauri::State;

use crate::models::{CatalogSnapshot, ColorEntry};
use crate::services::catalog::FormOptions;
use crate::services::state::AppState;

#[tauri::command]
pub async fn load_catalog(
    force_refresh: Option<bool>,
    state: State<'_, AppState>,
) -> Result<CatalogSnapshot, String> {
    let mut catalog = state.catalog.lock().await;
    Ok(catalog.load(force_refresh.unwrap_or(false)).await)
}

#[tauri::command]
pub async fn get_form_options(state: State<'_, AppState>) -> Result<FormOptions, String> {
    let catalog = state.catalog.lock().await;
    Ok(catalog.form_options())
}

#[tauri::command]
pub async fn get_material_colors(
    material_id: String,
    state: State<'_, AppState>,
) -> Result<Vec<ColorEntry>, String> {
    let catalog = state.catalog.lock().await;
    Ok(catalog.colors_for_material(&material_id))
}
