//! YAML-backed configuration document owned by the desktop host.

use std::fs;
use std::path::{Path, PathBuf};

use platform_host::DashboardConfig;
use tauri::Manager;

/// File name of the configuration document inside the app config directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Outer window geometry in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

fn parse_config(raw: &str, path: &Path) -> Result<DashboardConfig, String> {
    if raw.trim().is_empty() {
        return Ok(DashboardConfig::default());
    }
    serde_yaml::from_str(raw)
        .map_err(|err| format!("failed to parse config {}: {err}", path.display()))
}

#[derive(Debug, Clone)]
/// Configuration store rooted at a single YAML file. Last write wins.
pub struct ConfigFileStore {
    file: PathBuf,
}

impl ConfigFileStore {
    /// Creates a store whose document lives in `root`.
    ///
    /// # Errors
    ///
    /// Returns an error when `root` cannot be created.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, String> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .map_err(|err| format!("failed to create config dir {}: {err}", root.display()))?;
        Ok(Self {
            file: root.join(CONFIG_FILE_NAME),
        })
    }

    pub(crate) fn from_app(app: &tauri::AppHandle) -> Result<Self, String> {
        let root = app
            .path()
            .app_config_dir()
            .map_err(|err| format!("failed to resolve app config dir: {err}"))?;
        Self::from_root(root)
    }

    /// Path of the YAML document.
    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Loads the document, writing the default document first when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, parsed, or created.
    pub fn load_or_create(&self) -> Result<DashboardConfig, String> {
        if !self.file.exists() {
            let config = DashboardConfig::default();
            self.save(&config)?;
            return Ok(config);
        }
        let raw = fs::read_to_string(&self.file)
            .map_err(|err| format!("failed to read {}: {err}", self.file.display()))?;
        parse_config(&raw, &self.file)
    }

    /// Replaces the document.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn save(&self, config: &DashboardConfig) -> Result<(), String> {
        let serialized = serde_yaml::to_string(config)
            .map_err(|err| format!("failed to serialize config: {err}"))?;
        fs::write(&self.file, serialized)
            .map_err(|err| format!("failed to write {}: {err}", self.file.display()))
    }

    /// Writes `geometry` into the window preferences of the stored document and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be loaded or saved.
    pub fn record_geometry(&self, geometry: WindowGeometry) -> Result<DashboardConfig, String> {
        let mut config = self.load_or_create()?;
        config.window.x = geometry.x;
        config.window.y = geometry.y;
        config.window.width = geometry.width;
        config.window.height = geometry.height;
        self.save(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn blank_file_parses_as_default_document() {
        let config = parse_config("  \n", Path::new("config.yaml")).expect("blank config");
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn partial_document_fills_window_defaults() {
        let raw = "blocks:\n  - id: clock\n    enabled: true\n";
        let config = parse_config(raw, Path::new("config.yaml")).expect("partial config");

        assert_eq!(config.window.width, 1100);
        assert_eq!(config.blocks.len(), 1);
        assert!(config.blocks[0].enabled);
        assert_eq!((config.blocks[0].grid_row, config.blocks[0].grid_col), (0, 0));
    }

    #[test]
    fn malformed_yaml_names_the_file() {
        let err = parse_config("blocks: [", Path::new("/tmp/bubble/config.yaml"))
            .expect_err("malformed yaml");
        assert!(err.starts_with("failed to parse config /tmp/bubble/config.yaml"));
    }
}
