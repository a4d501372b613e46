use tauri::State;

use crate::models::User;
use crate::services::state::AppState;

#[tauri::command]
pub async fn login(
    email: String,
    password: String,
    state: State<'_, AppState>,
) -> Result<User, String> {
    let mut auth = state.auth.lock().map_err(|_| "Auth lock".to_string())?;
    auth.login(&email, &password).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn current_user(state: State<'_, AppState>) -> Result<Option<User>, String> {
    let auth = state.auth.lock().map_err(|_| "Auth lock".to_string())?;
    Ok(auth.current_user().cloned())
}

#[tauri::command]
pub async fn logout(state: State<'_, AppState>) -> Result<(), String> {
    let mut auth = state.auth.lock().map_err(|_| "Auth lock".to_string())?;
    auth.logout();
    Ok(())
}
