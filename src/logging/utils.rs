//! Log file helpers.
use std::fs;
use std::path::PathBuf;

/// Drop the SGR color codes that console messages carry, so the log file
/// holds plain text.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut parts = s.split('\x1b');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let text = part
            .strip_prefix('[')
            .map(|p| p.trim_start_matches(|c: char| c.is_ascii_digit() || c == ';'))
            .and_then(|p| p.strip_prefix('m'));
        out.push_str(text.unwrap_or(part));
    }
    out
}

/// Return the `$XDG_CACHE_HOME/dotfiles/` directory, creating it if needed.
fn cache_dir() -> Option<PathBuf> {
    let cache_dir = std::env::var("XDG_CACHE_HOME").map_or_else(
        |_| {
            std::env::var("HOME")
                .map_or_else(|_| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    );
    let dir = cache_dir.join("dotfiles");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Return the log file path for `command` under the cache directory.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(cache_dir()?.join(format!("{command}.log")))
}

/// Format the current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
