// Public Tauri commands exposed to the frontend.
use super::*;

#[tauri::command]
pub async fn run_batch(app: AppHandle, url: String) -> Result<(), String> {
    tauri::async_runtime::spawn_blocking(move || run_batch_sync(app, url))
        .await
        .map_err(|error| format!("Batch background task failed: {error}"))
}

#[tauri::command]
pub fn show_save_dialog(app: AppHandle, path: String) -> Result<Option<String>, String> {
    show_save_dialog_sync(&app, &path)
}

#[tauri::command]
pub fn get_batch_tools_settings(app: AppHandle) -> Result<BatchToolsSettings, String> {
    load_settings(&app)
}

#[tauri::command]
pub fn save_batch_tools_settings(
    app: AppHandle,
    settings: BatchToolsSettings,
) -> Result<BatchToolsSettings, String> {
    save_settings_internal(&app, settings)
}

#[tauri::command]
pub fn get_batch_tools_status(app: AppHandle) -> Result<BatchToolsStatus, String> {
    let settings = load_settings(&app)?;
    Ok(build_tools_status(&app, settings))
}
