//! Configuration file handling

use anyhow::{Context, Result};
use me_lint::MissingErrorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "missingerror.toml";

/// Contents of a configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Settings of the missing-error pass
    #[serde(default)]
    pub missingerror: Option<MissingErrorSection>,
}

/// `[missingerror]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissingErrorSection {
    /// Wrapper functions as `<package>.<name>`
    #[serde(default)]
    pub wrappers: Option<Vec<String>>,
}

impl ConfigFile {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Wrapper list configured by this file, joined with `,`
    pub fn wrappers(&self) -> Option<String> {
        self.missingerror
            .as_ref()
            .and_then(|section| section.wrappers.as_ref())
            .map(|wrappers| wrappers.join(","))
    }
}

/// Pick the wrapper list: the flag, then the config file, then the default
///
/// An explicit `config` path must exist. Without one, `missingerror.toml` in
/// the working directory is used if present.
pub fn resolve_wrappers(flag: Option<String>, config: Option<&Path>) -> Result<String> {
    if let Some(wrappers) = flag {
        return Ok(wrappers);
    }

    let file = match config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                Some(ConfigFile::load(default)?)
            } else {
                None
            }
        }
    };

    Ok(file
        .and_then(|file| file.wrappers())
        .unwrap_or_else(|| MissingErrorConfig::default().wrappers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn test_wrappers_from_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(
            &dir,
            r#"
[missingerror]
wrappers = ["fmt.Errorf", "a/helper.Wrap"]
"#,
        );

        let wrappers = resolve_wrappers(None, Some(&path)).expect("config loads");
        assert_eq!(wrappers, "fmt.Errorf,a/helper.Wrap");
    }

    #[test]
    fn test_flag_overrides_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, "[missingerror]\nwrappers = [\"a/helper.Wrap\"]\n");

        let wrappers = resolve_wrappers(Some("pkg.Wrapf".to_string()), Some(&path))
            .expect("flag wins");
        assert_eq!(wrappers, "pkg.Wrapf");
    }

    #[test]
    fn test_missing_section_uses_default() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, "# nothing configured\n");

        let wrappers = resolve_wrappers(None, Some(&path)).expect("empty config loads");
        assert_eq!(wrappers, "fmt.Errorf");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("absent.toml");

        let err = resolve_wrappers(None, Some(&path)).expect_err("file does not exist");
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_config(&dir, "[missingerror]\nwrappers = \"fmt.Errorf\"\n");

        let err = resolve_wrappers(None, Some(&path)).expect_err("wrappers must be a list");
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
