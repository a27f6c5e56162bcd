// Batch tool settings/status and common process primitives.
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tauri::{AppHandle, Manager};
use which::which;

pub(super) const SETTINGS_FILE_NAME: &str = "batch-tools.json";
pub(super) const BATCH_COMPLETE_EVENT: &str = "batch-runner://batch-complete";
#[cfg(target_os = "windows")]
pub(super) const CREATE_NO_WINDOW: u32 = 0x0800_0000;

pub(super) fn hidden_command(program: impl AsRef<OsStr>) -> Command {
    let mut command = Command::new(program);
    #[cfg(target_os = "windows")]
    {
        command.creation_flags(CREATE_NO_WINDOW);
    }
    command
}

/// Payload of the batch completion event. `file` is present only when the
/// script output carried the success phrase with a usable path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub response: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchToolsSettings {
    pub script_custom_path: Option<String>,
    pub default_save_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStatus {
    pub available: bool,
    pub source: String,
    pub path: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchToolsStatus {
    pub settings: BatchToolsSettings,
    pub script: ScriptStatus,
    pub save_dir: Option<String>,
}

pub(super) fn app_config_dir(app: &AppHandle) -> Result<PathBuf, String> {
    let path = app
        .path()
        .app_config_dir()
        .map_err(|error| format!("Failed to resolve app config dir: {error}"))?;
    fs::create_dir_all(&path).map_err(|error| format!("Failed to create config dir: {error}"))?;
    Ok(path)
}

pub(super) fn app_data_dir(app: &AppHandle) -> Result<PathBuf, String> {
    let path = app
        .path()
        .app_data_dir()
        .map_err(|error| format!("Failed to resolve app data dir: {error}"))?;
    fs::create_dir_all(&path).map_err(|error| format!("Failed to create data dir: {error}"))?;
    Ok(path)
}

pub(super) fn settings_file_path(app: &AppHandle) -> Result<PathBuf, String> {
    Ok(app_config_dir(app)?.join(SETTINGS_FILE_NAME))
}

pub(super) fn sanitize_optional_path(value: Option<String>) -> Result<Option<String>, String> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.len() > 512 {
                return Err("Path is too long.".to_string());
            }
            if trimmed.chars().any(|ch| ch.is_control()) {
                return Err("Path contains invalid control characters.".to_string());
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

pub(super) fn normalize_settings(
    mut settings: BatchToolsSettings,
) -> Result<BatchToolsSettings, String> {
    settings.script_custom_path = sanitize_optional_path(settings.script_custom_path)?;
    settings.default_save_dir = sanitize_optional_path(settings.default_save_dir)?;
    Ok(settings)
}

pub(super) fn load_settings(app: &AppHandle) -> Result<BatchToolsSettings, String> {
    let path = settings_file_path(app)?;
    if !path.exists() {
        return Ok(BatchToolsSettings::default());
    }

    let raw =
        fs::read_to_string(&path).map_err(|error| format!("Failed to read settings: {error}"))?;
    let parsed: BatchToolsSettings =
        serde_json::from_str(&raw).map_err(|error| format!("Failed to parse settings: {error}"))?;
    normalize_settings(parsed)
}

pub(super) fn save_settings_internal(
    app: &AppHandle,
    settings: BatchToolsSettings,
) -> Result<BatchToolsSettings, String> {
    let normalized = normalize_settings(settings)?;
    let path = settings_file_path(app)?;
    let payload = serde_json::to_string_pretty(&normalized)
        .map_err(|error| format!("Failed to serialize settings: {error}"))?;
    fs::write(&path, payload).map_err(|error| format!("Failed to save settings: {error}"))?;
    Ok(normalized)
}

pub(super) fn default_script_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "fetch-media.bat"
    } else {
        "fetch-media.sh"
    }
}

pub(super) fn ensure_custom_script(path: &str) -> Option<PathBuf> {
    let parsed = PathBuf::from(path);
    if !parsed.exists() {
        return None;
    }
    let canonical = fs::canonicalize(&parsed).ok()?;
    if canonical.is_file() {
        Some(canonical)
    } else {
        None
    }
}

pub(super) fn script_search_dirs(app: &AppHandle) -> Vec<(PathBuf, &'static str)> {
    let mut dirs = Vec::new();
    if let Ok(data_dir) = app_data_dir(app) {
        dirs.push((data_dir.join("tools"), "managed"));
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(Path::to_path_buf))
    {
        dirs.push((exe_dir, "executable-dir"));
    }
    if let Ok(working_dir) = std::env::current_dir() {
        dirs.push((working_dir, "working-dir"));
    }
    dirs
}

pub(super) fn find_script_in_dirs(
    dirs: &[(PathBuf, &'static str)],
    script_name: &str,
) -> Option<(PathBuf, String)> {
    dirs.iter()
        .map(|(dir, source)| (dir.join(script_name), *source))
        .find(|(candidate, _)| candidate.is_file())
        .map(|(path, source)| (path, source.to_string()))
}

pub(super) fn resolve_batch_script(
    app: &AppHandle,
    settings: &BatchToolsSettings,
) -> Option<(PathBuf, String)> {
    if let Some(custom) = settings
        .script_custom_path
        .as_ref()
        .and_then(|value| ensure_custom_script(value))
    {
        return Some((custom, "custom".to_string()));
    }

    let script_name = default_script_name();
    if let Some(found) = find_script_in_dirs(&script_search_dirs(app), script_name) {
        return Some(found);
    }

    which(script_name)
        .ok()
        .map(|path| (path, "system".to_string()))
}

#[cfg(unix)]
pub(super) fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

pub(super) fn inspect_script(resolved: Option<(PathBuf, String)>) -> ScriptStatus {
    match resolved {
        Some((path, source)) => {
            #[cfg(unix)]
            let message = if is_executable(&path) {
                None
            } else {
                Some("Script is not executable.".to_string())
            };
            #[cfg(not(unix))]
            let message: Option<String> = None;

            ScriptStatus {
                available: message.is_none(),
                source,
                path: Some(path.to_string_lossy().to_string()),
                message,
            }
        }
        None => ScriptStatus {
            available: false,
            source: "missing".to_string(),
            path: None,
            message: Some("Batch script not found.".to_string()),
        },
    }
}

pub(super) fn default_save_dir(app: &AppHandle) -> Option<PathBuf> {
    let settings = load_settings(app).ok()?;
    let configured = PathBuf::from(settings.default_save_dir?);
    if configured.is_dir() {
        Some(configured)
    } else {
        None
    }
}

pub(super) fn build_tools_status(app: &AppHandle, settings: BatchToolsSettings) -> BatchToolsStatus {
    let script = inspect_script(resolve_batch_script(app, &settings));
    let save_dir = settings
        .default_save_dir
        .clone()
        .filter(|value| PathBuf::from(value).is_dir());
    BatchToolsStatus {
        settings,
        script,
        save_dir,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitize_trims_and_drops_empty_values() {
        assert_eq!(sanitize_optional_path(None), Ok(None));
        assert_eq!(sanitize_optional_path(Some("   ".to_string())), Ok(None));
        assert_eq!(
            sanitize_optional_path(Some("  /opt/fetch-media.sh ".to_string())),
            Ok(Some("/opt/fetch-media.sh".to_string()))
        );
    }

    #[test]
    fn sanitize_caps_path_length() {
        let long = "a".repeat(600);
        assert!(sanitize_optional_path(Some(long)).is_err());
    }

    #[test]
    fn sanitize_rejects_control_characters() {
        assert!(sanitize_optional_path(Some("/tmp/\u{7}script".to_string())).is_err());
    }

    #[test]
    fn normalize_settings_keeps_valid_paths() {
        let settings = BatchToolsSettings {
            script_custom_path: Some(" C:\\tools\\fetch-media.bat ".to_string()),
            default_save_dir: Some(String::new()),
        };
        let normalized = normalize_settings(settings).unwrap();
        assert_eq!(
            normalized.script_custom_path.as_deref(),
            Some("C:\\tools\\fetch-media.bat")
        );
        assert_eq!(normalized.default_save_dir, None);
    }

    #[test]
    fn settings_parse_uses_camel_case_fields() {
        let parsed: BatchToolsSettings = serde_json::from_str(
            r#"{"scriptCustomPath": "/opt/fetch-media.sh", "defaultSaveDir": null}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.script_custom_path.as_deref(),
            Some("/opt/fetch-media.sh")
        );
        assert_eq!(parsed.default_save_dir, None);
    }

    #[test]
    fn find_script_prefers_earlier_directories() {
        let managed = tempdir().unwrap();
        let working = tempdir().unwrap();
        let dirs = vec![
            (managed.path().to_path_buf(), "managed"),
            (working.path().to_path_buf(), "working-dir"),
        ];

        fs::write(working.path().join("fetch.sh"), "#!/bin/sh\n").unwrap();
        let (path, source) = find_script_in_dirs(&dirs, "fetch.sh").unwrap();
        assert_eq!(source, "working-dir");
        assert_eq!(path, working.path().join("fetch.sh"));

        fs::write(managed.path().join("fetch.sh"), "#!/bin/sh\n").unwrap();
        let (_, source) = find_script_in_dirs(&dirs, "fetch.sh").unwrap();
        assert_eq!(source, "managed");
    }

    #[test]
    fn find_script_returns_none_when_absent() {
        let empty = tempdir().unwrap();
        let dirs = vec![(empty.path().to_path_buf(), "managed")];
        assert!(find_script_in_dirs(&dirs, "fetch.sh").is_none());
    }

    #[test]
    fn inspect_script_reports_missing() {
        let status = inspect_script(None);
        assert!(!status.available);
        assert_eq!(status.source, "missing");
        assert_eq!(status.path, None);
    }

    #[cfg(unix)]
    #[test]
    fn inspect_script_flags_non_executable_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let script = dir.path().join("fetch-media.sh");
        fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();

        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();
        let status = inspect_script(Some((script.clone(), "custom".to_string())));
        assert!(!status.available);
        assert!(status.message.is_some());

        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let status = inspect_script(Some((script, "custom".to_string())));
        assert!(status.available);
        assert_eq!(status.message, None);
    }
}
