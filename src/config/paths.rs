use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "winleap";
const MARKS_FILE: &str = "winleap.conf";
const SETTINGS_FILE: &str = "settings.toml";
const DEBUG_LOG_FILE: &str = "debug.log";

/// Кандидаты для файла меток в порядке приоритета (без `--config`).
pub fn mark_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(APP_DIR).join(MARKS_FILE));
    }

    match std::env::current_exe() {
        Ok(exe) => {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join(MARKS_FILE));
            }
        }
        Err(_) => candidates.push(PathBuf::from(MARKS_FILE)),
    }

    candidates
}

/// Путь к файлу меток: явный путь, иначе первый читаемый кандидат,
/// иначе первый кандидат (чтобы сообщение об ошибке указывало на него).
pub fn resolve_mark_file(override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        return path.to_path_buf();
    }

    let candidates = mark_file_candidates();
    first_readable(&candidates)
        .or_else(|| candidates.first().cloned())
        .unwrap_or_else(|| PathBuf::from(MARKS_FILE))
}

pub fn resolve_settings_file(override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        return path.to_path_buf();
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
}

/// `$XDG_STATE_HOME/winleap/debug.log`, иначе `./debug.log`.
pub fn debug_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(dir) => dir.join(APP_DIR).join(DEBUG_LOG_FILE),
        None => PathBuf::from(".").join(DEBUG_LOG_FILE),
    }
}

pub fn first_readable(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|path| {
            let readable = std::fs::File::open(path).is_ok();
            debug!("Кандидат {:?}: {}", path, if readable { "читается" } else { "нет" });
            readable
        })
        .cloned()
}
