//! Dashboard configuration, loaded from TOML.

use crate::error::{DashboardError, Result};
use crate::prepare::RATING_GROUPS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use viz_engine::EngineConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Engine knobs (debounce delay, KDE grid, contour levels).
    #[serde(default)]
    pub engine: EngineConfig,

    /// Categories matched against the raw `categories` field, in priority
    /// order; everything else is labeled "Other".
    #[serde(default = "default_categories")]
    pub categories_of_interest: Vec<String>,

    /// Rating groups active when the dashboard opens. The original layout
    /// starts with the lowest and highest bands checked.
    #[serde(default = "default_active_rating_groups")]
    pub active_rating_groups: Vec<String>,

    /// Whether the density overlay starts enabled.
    #[serde(default)]
    pub density_on_start: bool,
}

fn default_categories() -> Vec<String> {
    ["Chinese", "Japanese", "Italian", "Polish", "Scandinavian"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_active_rating_groups() -> Vec<String> {
    vec![RATING_GROUPS[0].to_string(), RATING_GROUPS[3].to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            categories_of_interest: default_categories(),
            active_rating_groups: default_active_rating_groups(),
            density_on_start: false,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| DashboardError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.categories_of_interest.is_empty() {
            return Err(DashboardError::Config(
                "categories_of_interest cannot be empty".to_string(),
            ));
        }
        for group in &self.active_rating_groups {
            if !RATING_GROUPS.contains(&group.as_str()) {
                return Err(DashboardError::Config(format!(
                    "unknown rating group {group:?}, expected one of {RATING_GROUPS:?}"
                )));
            }
        }
        self.engine.validate()?;
        Ok(())
    }
}
