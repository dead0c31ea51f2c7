//! Registry configuration file.
//!
//! ```toml
//! disabled_formats = ["SFX", "JPO"]
//! filename_detection = true
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use trackerkit_formats::RegistryConfig;

/// Read a TOML registry configuration; defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<RegistryConfig> {
    let Some(path) = path else {
        return Ok(RegistryConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: RegistryConfig = toml::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(
        path = %path.display(),
        disabled = config.disabled_formats.len(),
        filename_detection = config.filename_detection,
        "loaded registry config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_path_gives_defaults() {
        assert_eq!(load_config(None).unwrap(), RegistryConfig::default());
    }

    #[test]
    fn test_reads_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "disabled_formats = [\"SFX\", \"jpo\"]").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.disabled_formats, vec!["SFX".to_string(), "jpo".to_string()]);
        assert!(config.filename_detection);
    }

    #[test]
    fn test_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "filename_detection = \"sometimes\"").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().starts_with("failed to read config"));
    }
}
