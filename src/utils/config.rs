use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "svg-recolor.json";
pub const CONFIG_PATH_ENV: &str = "SVG_RECOLOR_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid icon glob: {0}")]
    Pattern(#[from] glob::PatternError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IconEntry {
    pub label: String,
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecolorConfig {
    pub default_icon: String,
    pub asset_root: PathBuf,
    /// Initial foreground picker value; normalized at startup.
    pub foreground: String,
    pub background: String,
    pub icons: Vec<IconEntry>,
    pub icon_glob: Option<String>,
}

impl Default for RecolorConfig {
    fn default() -> Self {
        Self {
            default_icon: "./assets/default.svg".to_string(),
            asset_root: PathBuf::from("."),
            foreground: String::new(),
            background: String::new(),
            icons: Vec::new(),
            icon_glob: None,
        }
    }
}

impl RecolorConfig {
    /// `Ok(None)` when there is no file at `path`.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("loaded config from {}", path.display());
        Ok(Some(config))
    }

    /// Reads the config named by `SVG_RECOLOR_CONFIG`, or `svg-recolor.json`
    /// in the working directory. Problems fall back to defaults.
    pub fn load_or_default() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        match Self::from_file(&path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                info!("no config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Configured icons followed by any glob matches not already listed.
    pub fn icon_entries(&self) -> Vec<IconEntry> {
        let mut entries = self.icons.clone();

        if let Some(pattern) = &self.icon_glob {
            match self.discover(pattern) {
                Ok(found) => {
                    for entry in found {
                        if !entries.iter().any(|e| e.path == entry.path) {
                            entries.push(entry);
                        }
                    }
                }
                Err(e) => warn!("{e}; skipping icon discovery"),
            }
        }

        entries
    }

    fn discover(&self, pattern: &str) -> Result<Vec<IconEntry>, ConfigError> {
        let full_pattern = self.asset_root.join(pattern);
        let mut paths: Vec<PathBuf> = glob::glob(&full_pattern.to_string_lossy())?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        Ok(paths
            .into_iter()
            .map(|p| {
                let label = p
                    .file_stem()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                let relative = p.strip_prefix(&self.asset_root).unwrap_or(&p);
                IconEntry {
                    label,
                    path: relative.to_string_lossy().to_string(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = RecolorConfig::from_file(&dir.path().join("nope.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r##"{ "foreground": "#f0f", "icons": [{ "label": "Logo", "path": "logo.svg" }] }"##,
        )
        .unwrap();

        let config = RecolorConfig::from_file(&path).unwrap().unwrap();
        assert_eq!(config.foreground, "#f0f");
        assert_eq!(config.background, "");
        assert_eq!(config.default_icon, "./assets/default.svg");
        assert_eq!(config.icons.len(), 1);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let err = RecolorConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn glob_discovers_icons_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("assets");
        fs::create_dir(&assets).unwrap();
        for name in ["b.svg", "a.svg", "notes.txt"] {
            fs::write(assets.join(name), "<svg/>").unwrap();
        }

        let config = RecolorConfig {
            asset_root: dir.path().to_path_buf(),
            icons: vec![IconEntry {
                label: "Bee".to_string(),
                path: Path::new("assets").join("b.svg").to_string_lossy().to_string(),
            }],
            icon_glob: Some("assets/*.svg".to_string()),
            ..Default::default()
        };

        let entries = config.icon_entries();
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Bee", "a"]);
        assert_eq!(
            entries[1].path,
            Path::new("assets").join("a.svg").to_string_lossy()
        );
    }

    #[test]
    fn bad_glob_is_ignored() {
        let config = RecolorConfig {
            icon_glob: Some("assets/[*.svg".to_string()),
            ..Default::default()
        };
        assert!(config.icon_entries().is_empty());
    }
}
