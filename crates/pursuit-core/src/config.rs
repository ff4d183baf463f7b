use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::lifecycle::TransitionPolicy;

/// Page sizes the grid pager offers.
pub const PAGE_SIZES: [usize; 4] = [25, 50, 100, 250];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub data: DataConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            lifecycle: LifecycleConfig::default(),
            data: DataConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            delimiter: default_delimiter(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub policy: TransitionPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the JSON fixture holding the fetched collection.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

const fn default_page_size() -> usize {
    50
}

const fn default_delimiter() -> char {
    ','
}

/// Load `.pursuit/config.toml` under `project_root`, or defaults if absent.
///
/// # Errors
///
/// I/O or TOML syntax problems, with the offending path in the context.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".pursuit/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: ProjectConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if !PAGE_SIZES.contains(&config.grid.page_size) {
        anyhow::bail!(
            "Invalid grid.page_size {} in {} (allowed: 25, 50, 100, 250)",
            config.grid.page_size,
            path.display()
        );
    }
    Ok(config)
}
