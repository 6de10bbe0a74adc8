use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable consulted when no `--config` flag is given
pub const CONFIG_ENV: &str = "BINSCOPE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bins: BinsConfig,
    pub headers: HeaderConfig,
    pub taxonomy: TaxonomyConfig,
    pub charts: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinsConfig {
    /// File extension (without the dot) identifying bin FASTA files
    pub extension: String,
}

/// Positional layout of the contig header, e.g. `NODE_12_length_5032_cov_8.41`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub delimiter: String,
    pub length_field: usize,
    pub coverage_field: usize,
    /// Abort on headers that don't decode instead of leaving the fields empty
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    pub class_rank_index: usize,
    /// Tokens this short or shorter are empty rank placeholders (`s__`)
    pub placeholder_max_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub facet_columns: usize,
    pub min_point_area: f64,
    pub max_point_area: f64,
    pub point_alpha: f64,
}

impl Default for BinsConfig {
    fn default() -> Self {
        Self {
            extension: "fasta".to_string(),
        }
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            delimiter: "_".to_string(),
            length_field: 3,
            coverage_field: 5,
            strict: true,
        }
    }
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            class_rank_index: 2,
            placeholder_max_len: 3,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            facet_columns: 4,
            min_point_area: 10.0,
            max_point_area: 2000.0,
            point_alpha: 0.5,
        }
    }
}

impl Config {
    fn validate(&self) -> Result<(), crate::BinscopeError> {
        if self.bins.extension.trim_start_matches('.').is_empty() {
            return Err(crate::BinscopeError::Config(
                "bins.extension must not be empty".to_string(),
            ));
        }
        if self.headers.delimiter.is_empty() {
            return Err(crate::BinscopeError::Config(
                "headers.delimiter must not be empty".to_string(),
            ));
        }
        if self.charts.facet_columns == 0 {
            return Err(crate::BinscopeError::Config(
                "charts.facet_columns must be at least 1".to_string(),
            ));
        }
        if self.charts.width == 0 || self.charts.height == 0 {
            return Err(crate::BinscopeError::Config(format!(
                "charts.width and charts.height must be positive, got {}x{}",
                self.charts.width, self.charts.height
            )));
        }
        let min_area = self.charts.min_point_area;
        if min_area.is_nan() || min_area < 0.0 || !self.charts.max_point_area.is_finite() {
            return Err(crate::BinscopeError::Config(format!(
                "charts point areas must be finite and non-negative, got {}..{}",
                self.charts.min_point_area, self.charts.max_point_area
            )));
        }
        if self.charts.min_point_area > self.charts.max_point_area {
            return Err(crate::BinscopeError::Config(format!(
                "charts.min_point_area ({}) exceeds charts.max_point_area ({})",
                self.charts.min_point_area, self.charts.max_point_area
            )));
        }
        if !(0.0..=1.0).contains(&self.charts.point_alpha) {
            return Err(crate::BinscopeError::Config(format!(
                "charts.point_alpha must be within 0..=1, got {}",
                self.charts.point_alpha
            )));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::BinscopeError> {
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config, crate::BinscopeError> {
    let config: Config = toml::from_str(contents)
        .map_err(|e| crate::BinscopeError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Load the config named on the command line, else `$BINSCOPE_CONFIG`, else defaults
pub fn resolve_config(path: Option<&Path>) -> Result<Config, crate::BinscopeError> {
    if let Some(path) = path {
        debug!("Loading config from {}", path.display());
        return load_config(path);
    }

    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => {
            debug!("Loading config from ${} = {:?}", CONFIG_ENV, path);
            load_config(path)
        }
        _ => Ok(Config::default()),
    }
}
