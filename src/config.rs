use crate::data::PropertyNames;
use crate::stats::DEFAULT_GAMMA;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub records_csv: PathBuf,
    /// Municipal boundaries; the map panel is empty without them
    pub boundaries: Option<PathBuf>,
    pub properties: PropertyNames,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            records_csv: PathBuf::from("data/homicidios_2024.csv"),
            boundaries: Some(PathBuf::from("data/municipios.geojson")),
            properties: PropertyNames::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub top_n: NonZeroUsize,
    pub gamma: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_n: NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN),
            gamma: DEFAULT_GAMMA,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    /// Filter used when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("homicide-map.log"),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given; otherwise `config.toml` if present, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_path = Path::new("config.toml");
                if default_path.exists() {
                    Self::load_from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let gamma = self.display.gamma;
        if !gamma.is_finite() || gamma <= 0.0 {
            bail!("display.gamma must be a positive number, got {}", gamma);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.display.top_n.get(), 10);
        assert_eq!(config.display.gamma, DEFAULT_GAMMA);
        assert_eq!(config.input.properties.rate, "tasa_homicidios");
        assert_eq!(
            config.input.boundaries.as_deref(),
            Some(Path::new("data/municipios.geojson"))
        );
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [input]
            records_csv = "base3pro.csv"

            [input.properties]
            municipality = "MPIO_CNMBR"

            [display]
            gamma = 0.4
            "#,
        )
        .unwrap();
        assert_eq!(config.input.records_csv, PathBuf::from("base3pro.csv"));
        assert_eq!(config.input.properties.municipality, "MPIO_CNMBR");
        assert_eq!(config.input.properties.department, "departamento");
        assert_eq!(config.display.gamma, 0.4);
        assert_eq!(config.display.top_n.get(), 10);
    }

    #[test]
    fn test_rejects_non_positive_gamma() {
        assert!(AppConfig::from_toml("[display]\ngamma = 0.0").is_err());
        assert!(AppConfig::from_toml("[display]\ngamma = -1.5").is_err());
    }

    #[test]
    fn test_rejects_zero_top_n() {
        assert!(AppConfig::from_toml("[display]\ntop_n = 0").is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(AppConfig::load_from_file(Path::new("missing/config.toml")).is_err());
    }
}
