//! Configuration loading and parsing.
//!
//! Parses `srcview.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [view]
//! tab_width = 8        # 1..=32
//! scroll_margin = 0    # rows kept visible around the cursor
//!
//! [metrics]
//! cell_width = 8       # pixels, min 1
//! cell_height = 16
//!
//! [search]
//! case_sensitive = false
//!
//! [expr]
//! max_lookbehind = 256 # bytes scanned left of a clicked word
//! ```
//!
//! Every section and key is optional. Unknown fields are ignored so newer
//! files keep loading in older builds. A missing file yields defaults; a file
//! that exists but cannot be read or parsed is an error carrying its path.
//! Out-of-range values are clamped by `Config::effective_*` accessors and the
//! clamp is logged on the `config` target; the raw parsed values are retained.

use serde::Deserialize;
use std::{fs, io, path::PathBuf};
use thiserror::Error;
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "srcview.toml";
pub const MAX_TAB_WIDTH: u16 = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    #[serde(default = "ViewConfig::default_tab_width")]
    pub tab_width: u16,
    #[serde(default)]
    pub scroll_margin: u16,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            tab_width: Self::default_tab_width(),
            scroll_margin: 0,
        }
    }
}

impl ViewConfig {
    const fn default_tab_width() -> u16 {
        8
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    #[serde(default = "MetricsConfig::default_cell_width")]
    pub cell_width: u32,
    #[serde(default = "MetricsConfig::default_cell_height")]
    pub cell_height: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            cell_width: Self::default_cell_width(),
            cell_height: Self::default_cell_height(),
        }
    }
}

impl MetricsConfig {
    const fn default_cell_width() -> u32 {
        8
    }
    const fn default_cell_height() -> u32 {
        16
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExprConfig {
    #[serde(default = "ExprConfig::default_max_lookbehind")]
    pub max_lookbehind: usize,
}

impl Default for ExprConfig {
    fn default() -> Self {
        Self {
            max_lookbehind: Self::default_max_lookbehind(),
        }
    }
}

impl ExprConfig {
    const fn default_max_lookbehind() -> usize {
        256
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub expr: ExprConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Original file contents, when a file was read.
    pub raw: Option<String>,
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Config path following platform conventions: `./srcview.toml` when present,
/// else `<config dir>/srcview/srcview.toml`.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("srcview").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn parse(content: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str::<ConfigFile>(content)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "config", path = %path.display(), "config_missing_using_defaults");
            return Ok(Config::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    let file = match parse(&content) {
        Ok(file) => file,
        Err(source) => return Err(ConfigError::Parse { path, source }),
    };
    info!(target: "config", path = %path.display(), "config_loaded");
    Ok(Config {
        raw: Some(content),
        path: Some(path),
        file,
    })
}

impl Config {
    /// Tab width clamped to `1..=MAX_TAB_WIDTH`.
    pub fn effective_tab_width(&self) -> usize {
        let raw = self.file.view.tab_width;
        let clamped = raw.clamp(1, MAX_TAB_WIDTH);
        if clamped != raw {
            info!(target: "config", raw, clamped, "tab_width_clamped");
        }
        clamped as usize
    }

    /// Scroll margin clamped to `(height - 2) / 2` for a viewport of `height` rows.
    pub fn effective_scroll_margin(&self, height: usize) -> usize {
        let raw = self.file.view.scroll_margin as usize;
        let max = if height <= 3 { 0 } else { (height - 2) / 2 };
        let clamped = raw.min(max);
        if clamped != raw {
            info!(target: "config", raw, clamped, max, height, "scroll_margin_clamped");
        }
        clamped
    }

    /// Cell size in pixels; zero dimensions become 1.
    pub fn effective_cell_size(&self) -> (u32, u32) {
        (
            self.file.metrics.cell_width.max(1),
            self.file.metrics.cell_height.max(1),
        )
    }

    pub fn case_sensitive(&self) -> bool {
        self.file.search.case_sensitive
    }

    pub fn max_lookbehind(&self) -> usize {
        self.file.expr.max_lookbehind
    }
}
