use std::path::PathBuf;

/// Configuration section requested from the client
pub const SETTINGS_SECTION: &str = "languageServerExample";

/// Default cap on published problems per document
pub const DEFAULT_MAX_NUMBER_OF_PROBLEMS: u32 = 1000;

/// Returns the path to the data directory for lsp-sample.
/// Uses $XDG_DATA_HOME/lsp-sample if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/lsp-sample,
/// or ./lsp-sample if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("lsp-sample.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("lsp-sample")
}
