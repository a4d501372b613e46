use tauri::State;

use crate::models::BusinessProfile;
use crate::services::state::AppState;

#[tauri::command]
pub async fn get_business_profile(
    state: State<'_, AppState>,
) -> Result<BusinessProfile, String> {
    let mut quotes = state.quotes.lock().await;
    quotes.load_profile().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn save_business_profile(
    payload: BusinessProfile,
    state: State<'_, AppState>,
) -> Result<BusinessProfile, String> {
    let mut quotes = state.quotes.lock().await;
    quotes.save_profile(payload).await.map_err(|e| e.to_string())
}
