//! Optional config file loading. Search order: ./jlptscrape.toml, then
//! $XDG_CONFIG_HOME/jlptscrape/config.toml (or ~/.config/jlptscrape/config.toml).

use crate::model::JlptLevel;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Built-in level sources, used when the config file has no `[levels]` table.
pub const DEFAULT_LEVEL_URLS: [(JlptLevel, &str); 2] = [
    (
        JlptLevel::N5,
        "https://nihongokyoshi-net.com/2017/09/17/jlptn5-vocabulary-list/",
    ),
    (
        JlptLevel::N4,
        "https://nihongokyoshi-net.com/2020/10/16/jlptn4-vocabulary-list/",
    ),
];

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Root under which `vocabulary/` and `vocabulary_json/` are created. Relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Delay in seconds between requests.
    pub request_delay_secs: Option<u64>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Level label to page URL, e.g. `N3 = "https://..."`. Replaces the built-in list.
    pub levels: Option<BTreeMap<String, String>>,
}

impl Config {
    /// Level sources in N5..N1 order. Unknown labels are an error.
    pub fn level_urls(&self) -> Result<Vec<(JlptLevel, String)>, String> {
        let Some(levels) = &self.levels else {
            return Ok(default_level_urls());
        };
        let mut parsed = BTreeMap::new();
        for (label, url) in levels {
            let level = JlptLevel::parse(label).ok_or_else(|| {
                format!(
                    "Invalid level '{}' in [levels]. Use N5, N4, N3, N2, or N1.",
                    label
                )
            })?;
            parsed.insert(level, url.clone());
        }
        Ok(parsed.into_iter().collect())
    }
}

pub fn default_level_urls() -> Vec<(JlptLevel, String)> {
    DEFAULT_LEVEL_URLS
        .iter()
        .map(|(level, url)| (*level, url.to_string()))
        .collect()
}

/// Search order: (1) ./jlptscrape.toml, (2) $XDG_CONFIG_HOME/jlptscrape/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("jlptscrape.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("jlptscrape").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            return Ok(Some(config));
        }
    }
    Ok(None)
}
