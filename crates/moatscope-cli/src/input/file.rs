use moatscope_core::AnalysisConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON document and deserialise it, reporting the file on failure.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_to_string(&canonical)?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Load an `AnalysisConfig` from `.json`, `.yaml` or `.yml`. Fields left
/// out of the file keep their defaults.
pub fn read_config(path: &str) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_to_string(&canonical)?;
    let extension = canonical
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let config = match extension.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?,
        Some("json") => serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?,
        _ => {
            return Err(format!(
                "Unsupported config format '{}': expected .json, .yaml or .yml",
                canonical.display()
            )
            .into())
        }
    };
    tracing::debug!(path = %canonical.display(), "loaded analysis config");
    Ok(config)
}

/// File stem of `path`, used to name a company when the series carries none.
pub fn stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

fn read_to_string(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?)
}

/// Resolve the path against the working directory and check it is a file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }
    Ok(canonical)
}
