//! Engine tuning knobs, loaded from a TOML file or used with defaults.

use crate::density::DensityOptions;
use crate::error::{EngineError, Result};
use crate::kde::AxisRange;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_DEBOUNCE_MS: u64 = 1000;
const DEFAULT_GRID_SIZE: usize = 100;
const DEFAULT_LEVEL_COUNT: usize = 6;
const DEFAULT_GROUP_COLUMN: &str = "rating_group";
const DEFAULT_CATEGORY_FILTER: &str = "category";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Quiet period before a burst of filter changes triggers one density
    /// recompute. Purely a scheduling knob, not a business rule.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Resolution of the KDE evaluation grid (per axis).
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,

    /// Number of evenly spaced contour levels; the lowest is dropped when
    /// drawing.
    #[serde(default = "default_level_count")]
    pub level_count: usize,

    /// Column bucketing rows into density groups.
    #[serde(default = "default_group_column")]
    pub group_column: String,

    /// Filter rule whose empty selection freezes the overlay instead of
    /// clearing it.
    #[serde(default = "default_category_filter")]
    pub category_filter: String,

    /// Fixed axis ranges for the density grid; observed ranges when absent.
    #[serde(default)]
    pub x_range: Option<RangeConfig>,
    #[serde(default)]
    pub y_range: Option<RangeConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

impl From<RangeConfig> for AxisRange {
    fn from(r: RangeConfig) -> Self {
        AxisRange {
            min: r.min,
            max: r.max,
        }
    }
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_grid_size() -> usize {
    DEFAULT_GRID_SIZE
}
fn default_level_count() -> usize {
    DEFAULT_LEVEL_COUNT
}
fn default_group_column() -> String {
    DEFAULT_GROUP_COLUMN.to_string()
}
fn default_category_filter() -> String {
    DEFAULT_CATEGORY_FILTER.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            grid_size: DEFAULT_GRID_SIZE,
            level_count: DEFAULT_LEVEL_COUNT,
            group_column: DEFAULT_GROUP_COLUMN.to_string(),
            category_filter: DEFAULT_CATEGORY_FILTER.to_string(),
            x_range: None,
            y_range: None,
        }
    }
}

impl EngineConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| EngineError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(EngineError::Config(
                "debounce_ms must be positive".to_string(),
            ));
        }
        if self.grid_size < 2 {
            return Err(EngineError::Config(format!(
                "grid_size must be at least 2, got {}",
                self.grid_size
            )));
        }
        if self.level_count < 2 {
            return Err(EngineError::Config(format!(
                "level_count must be at least 2, got {}",
                self.level_count
            )));
        }
        if self.group_column.is_empty() {
            return Err(EngineError::Config("group_column cannot be empty".to_string()));
        }
        for (name, range) in [("x_range", self.x_range), ("y_range", self.y_range)] {
            if let Some(r) = range
                && r.min >= r.max
            {
                return Err(EngineError::Config(format!(
                    "{name}: min ({}) must be below max ({})",
                    r.min, r.max
                )));
            }
        }
        Ok(())
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn density_options(&self) -> DensityOptions {
        DensityOptions {
            grid_size: self.grid_size,
            level_count: self.level_count,
            group_column: self.group_column.clone(),
            category_filter: self.category_filter.clone(),
            x_range: self.x_range.map(Into::into),
            y_range: self.y_range.map(Into::into),
        }
    }
}
