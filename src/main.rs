#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod api;
mod commands;
mod db;
mod models;
mod services;
mod utils;

use anyhow::anyhow;
use tauri::Manager;

use crate::api::ApiClient;
use crate::services::state::AppState;

fn main() {
    tracing_subscriber::fmt().init();

    tauri::Builder::default()
        .setup(|app| {
            let app_data_dir = app
                .path()
                .app_data_dir()
                .map_err(|e| anyhow!("App data dir: {}", e))?;
            std::fs::create_dir_all(&app_data_dir)?;

            let db = db::Database::new(app_data_dir.join("cotizador.sqlite"))?;
            let state = AppState::new(ApiClient::new(), db);

            if let Ok(mut auth) = state.auth.lock() {
                auth.restore_session();
            }

            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::auth::login,
            commands::auth::current_user,
            commands::auth::logout,
            commands::catalog::load_catalog,
            commands::catalog::get_form_options,
            commands::catalog::get_material_colors,
            commands::clients::get_clients,
            commands::clients::save_client,
            commands::clients::delete_client,
            commands::profile::get_business_profile,
            commands::profile::save_business_profile,
            commands::quotes::get_quotes,
            commands::quotes::create_quote,
            commands::quotes::update_quote,
            commands::quotes::update_quote_status,
            commands::quotes::delete_quote,
            commands::quotes::build_quote_document,
            commands::quotes::get_share_message,
            commands::dashboard::get_dashboard_stats,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
