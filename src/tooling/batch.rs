// Batch script execution, stdout result parsing and the save prompt.
use super::*;

pub(super) const SUCCESS_MARKER: &str = "File has been downloaded successfully to: ";
pub(super) const DOWNLOADED_FILE_EXTENSION: &str = ".mp4";

// The path must follow the marker on the same line and ends at the first
// `.mp4` occurrence.
pub(super) fn extract_downloaded_file_path(output: &str) -> Option<String> {
    let start = output.find(SUCCESS_MARKER)? + SUCCESS_MARKER.len();
    let line = output[start..].split(['\r', '\n']).next()?;
    let end = line.find(DOWNLOADED_FILE_EXTENSION)? + DOWNLOADED_FILE_EXTENSION.len();
    Some(line[..end].to_string())
}

pub(super) fn batch_command(script_path: &Path) -> std::process::Command {
    #[cfg(target_os = "windows")]
    let command = {
        let mut command = hidden_command("cmd");
        command.arg("/C").arg(script_path);
        command
    };

    #[cfg(not(target_os = "windows"))]
    let command = hidden_command(script_path);

    command
}

// Completion is delivered only via the batch-complete event; spawn and exit
// failures are logged and intentionally produce no event at all.
pub(super) fn run_batch_sync(app: AppHandle, raw_url: String) {
    let url = raw_url.trim().to_string();
    if url.is_empty() {
        log::warn!("Batch request received an empty URL.");
    } else if Url::parse(&url).is_err() {
        log::warn!("Batch request URL does not parse as a URL: {url}");
    }

    let settings = match load_settings(&app) {
        Ok(settings) => settings,
        Err(error) => {
            log::error!("Failed to load batch tool settings: {error}");
            return;
        }
    };
    let Some((script_path, source)) = resolve_batch_script(&app, &settings) else {
        log::error!("Batch script was not found. Configure it in settings.");
        return;
    };
    log::info!("Running {source} batch script: {}", script_path.display());

    let output = match batch_command(&script_path).arg(&url).output() {
        Ok(output) => output,
        Err(error) => {
            log::error!("Failed to execute batch script: {error}");
            return;
        }
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("Batch script failed.");
        log::error!("Batch script exited with {}: {message}", output.status);
        return;
    }

    let response = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let file = extract_downloaded_file_path(&response);
    if let Some(path) = file.as_deref() {
        log::info!("Downloaded file path: {path}");
    } else {
        log::error!("Unable to extract downloaded file path from script output.");
    }

    let _ = app.emit(BATCH_COMPLETE_EVENT, BatchResult { response, file });
}

pub(super) fn show_save_dialog_sync(
    app: &AppHandle,
    file_path: &str,
) -> Result<Option<String>, String> {
    let trimmed = file_path.trim();
    if trimmed.is_empty() {
        return Err("Downloaded file path is missing.".to_string());
    }

    let source = PathBuf::from(trimmed);
    let file_name = source
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("download.mp4")
        .to_string();

    let mut dialog = rfd::FileDialog::new()
        .add_filter("MP4 Video", &["mp4"])
        .set_file_name(file_name);
    if let Some(directory) = source.parent().filter(|parent| parent.is_dir()) {
        dialog = dialog.set_directory(directory);
    } else if let Some(directory) = default_save_dir(app) {
        dialog = dialog.set_directory(directory);
    }

    let Some(selected) = dialog.save_file() else {
        return Ok(None);
    };
    let selected = selected.to_string_lossy().to_string();
    log::info!("Selected save path: {selected}");
    Ok(Some(selected))
}
