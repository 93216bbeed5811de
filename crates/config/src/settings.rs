// Application settings
// Loaded from --config <path>, else ~/.config/digimv/settings.toml, else defaults

use std::fs;
use std::path::{Path, PathBuf};

use digimv_engine::map::DEFAULT_MAX_MARKERS;
use digimv_engine::{BuildOptions, FteThresholds, MasterConfig, MasterLayout};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Map view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Markers drawn at most (leading rows of the filtered table)
    pub max_markers: usize,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            max_markers: DEFAULT_MAX_MARKERS,
        }
    }
}

/// Excel export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Download name is `<file_prefix>_<YYYYmmdd_HHMM>.xlsx`
    pub file_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_prefix: "DigiMV_Export".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Column mapping from DigiMV sheets to the Master
    pub layout: MasterLayout,

    // Postcode matching, care-type filter
    pub build: BuildOptions,

    // Revenue-per-FTE band
    pub fte: FteThresholds,

    pub map: MapSettings,

    pub export: ExportSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("digimv");
        config_dir.join("settings.toml")
    }

    /// Load settings. An explicit path must exist; the default path is
    /// optional and its absence means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::config_path();
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.master_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.map.max_markers == 0 {
            return Err(ConfigError::Invalid("map.max_markers must be at least 1".into()));
        }
        if self.export.file_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("export.file_prefix must not be empty".into()));
        }
        Ok(())
    }

    /// The part of the settings the engine consumes.
    pub fn master_config(&self) -> MasterConfig {
        MasterConfig {
            layout: self.layout.clone(),
            build: self.build.clone(),
            fte: self.fte,
        }
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digimv_engine::MatchStrategy;

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_empty_file_is_default() {
        let (_dir, path) = write("");
        assert_eq!(Settings::load(Some(&path)).unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_sections() {
        let (_dir, path) = write(
            r#"
[build]
match_strategy = "pc4"

[fte]
max_revenue_per_fte = 150000

[export]
file_prefix = "Zorgkaart"
"#,
        );
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.build.match_strategy, MatchStrategy::Pc4);
        assert!(!settings.build.require_care_type);
        assert_eq!(settings.fte.min_revenue_per_fte, 20_000.0);
        assert_eq!(settings.fte.max_revenue_per_fte, 150_000.0);
        assert_eq!(settings.map.max_markers, 500);
        assert_eq!(settings.export.file_prefix, "Zorgkaart");
        assert_eq!(settings.layout, MasterLayout::default());
    }

    #[test]
    fn test_custom_layout() {
        let (_dir, path) = write(
            r#"
[layout]
base_sheet = "Blad1"
key_column = "Code"
required_columns = ["Code"]

[[layout.columns]]
output = "Code"
sheet = "Blad1"
column = "Code"

[[layout.columns]]
output = "Postcode"
sheet = "Blad1"
column = "PC"

[[layout.columns]]
output = "Omzet_Totaal"
sheet = "Blad2"
column = "Baten"
transform = "number"
"#,
        );
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.layout.base_sheet, "Blad1");
        assert_eq!(settings.layout.columns.len(), 3);
        assert_eq!(settings.layout.sheet_names(), vec!["Blad1", "Blad2"]);
    }

    #[test]
    fn test_min_above_max_rejected() {
        let (_dir, path) = write("[fte]\nmin_revenue_per_fte = 200000\nmax_revenue_per_fte = 100000\n");
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn test_zero_markers_rejected() {
        let (_dir, path) = write("[map]\nmax_markers = 0\n");
        assert!(matches!(Settings::load(Some(&path)), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_layout_rejected() {
        let (_dir, path) = write("[layout]\ncolumns = []\n");
        assert!(matches!(Settings::load(Some(&path)), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let (_dir, path) = write("[build\n");
        assert!(matches!(Settings::load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_unknown_strategy_is_parse_error() {
        let (_dir, path) = write("[build]\nmatch_strategy = \"fuzzy\"\n");
        assert!(matches!(Settings::load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_config_path() {
        let path = Settings::config_path();
        assert!(path.ends_with("digimv/settings.toml"));
    }
}
