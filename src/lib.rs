mod tooling;

use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            if let Some(window) = app.get_webview_window("main") {
                let _ = window.center();
                #[cfg(debug_assertions)]
                window.open_devtools();
            }

            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .level_for("tao", log::LevelFilter::Error)
                        .level_for("winit", log::LevelFilter::Error)
                        .build(),
                )?;
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            tooling::run_batch,
            tooling::show_save_dialog,
            tooling::get_batch_tools_settings,
            tooling::save_batch_tools_settings,
            tooling::get_batch_tools_status
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
