use tauri::State;

use crate::models::{Quote, QuoteInput, QuoteStatus, SaveQuoteOutcome};
use crate::services::export::{self, QuoteDocument};
use crate::services::state::AppState;

#[tauri::command]
pub async fn get_quotes(
    force_refresh: Option<bool>,
    state: State<'_, AppState>,
) -> Result<Vec<Quote>, String> {
    let mut quotes = state.quotes.lock().await;
    if quotes.clients().is_empty() {
        quotes.load_clients().await.map_err(|e| e.to_string())?;
    }
    quotes
        .refresh(force_refresh.unwrap_or(false))
        .await
        .map_err(|e| e.to_string())?;
    Ok(quotes.quotes().to_vec())
}

#[tauri::command]
pub async fn create_quote(
    payload: QuoteInput,
    state: State<'_, AppState>,
) -> Result<SaveQuoteOutcome, String> {
    let mut quotes = state.quotes.lock().await;
    quotes.create(payload).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_quote(
    payload: QuoteInput,
    state: State<'_, AppState>,
) -> Result<SaveQuoteOutcome, String> {
    let mut quotes = state.quotes.lock().await;
    quotes.update(payload).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_quote_status(
    quote_id: String,
    status: QuoteStatus,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let mut quotes = state.quotes.lock().await;
    quotes
        .set_status(&quote_id, status)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_quote(quote_id: String, state: State<'_, AppState>) -> Result<(), String> {
    let mut quotes = state.quotes.lock().await;
    quotes.delete(&quote_id).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn build_quote_document(
    quote_id: String,
    state: State<'_, AppState>,
) -> Result<QuoteDocument, String> {
    let quotes = state.quotes.lock().await;
    let quote = quotes
        .find_quote(&quote_id)
        .ok_or_else(|| "Quotation not found".to_string())?;
    let catalog = state.catalog.lock().await;
    Ok(export::build_document(quote, quotes.profile(), &*catalog))
}

#[tauri::command]
pub async fn get_share_message(
    quote_id: String,
    state: State<'_, AppState>,
) -> Result<String, String> {
    let quotes = state.quotes.lock().await;
    let quote = quotes
        .find_quote(&quote_id)
        .ok_or_else(|| "Quotation not found".to_string())?;
    Ok(export::share_message(quote, quotes.profile()))
}
