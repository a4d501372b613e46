use tauri::State;

use crate::models::{Client, ClientInput};
use crate::services::state::AppState;

#[tauri::command]
pub async fn get_clients(state: State<'_, AppState>) -> Result<Vec<Client>, String> {
    let mut quotes = state.quotes.lock().await;
    quotes.load_clients().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn save_client(
    payload: ClientInput,
    state: State<'_, AppState>,
) -> Result<Client, String> {
    let mut quotes = state.quotes.lock().await;
    quotes.save_client(payload).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_client(client_id: String, state: State<'_, AppState>) -> Result<(), String> {
    let mut quotes = state.quotes.lock().await;
    quotes.delete_client(&client_id).await.map_err(|e| e.to_string())
}
