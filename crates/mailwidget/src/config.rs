//! Widget configuration
//!
//! Settings are resolved in this order:
//! 1. `widget.json` in the config directory (see the `config` crate)
//! 2. Environment overrides (`MAILWIDGET_PAGE_SIZE`, `MAILWIDGET_SEARCH_DEBOUNCE_MS`)
//! 3. Built-in defaults

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::query::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZES};
use crate::search::DEFAULT_SEARCH_DEBOUNCE_MS;

/// Config filename in the config directory
const CONFIG_FILE: &str = "widget.json";

const PAGE_SIZE_ENV: &str = "MAILWIDGET_PAGE_SIZE";
const DEBOUNCE_ENV: &str = "MAILWIDGET_SEARCH_DEBOUNCE_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Rows per page when the widget mounts
    pub page_size: usize,
    /// Choices offered by the page-size selector
    pub page_sizes: Vec<usize>,
    /// Quiet period after the last keystroke before a search applies
    pub search_debounce_ms: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
        }
    }
}

impl WidgetConfig {
    /// Load from the config directory, apply environment overrides, validate
    pub fn load() -> Result<Self> {
        let config: Self = config::load_json_or_default(CONFIG_FILE)?;
        config.with_env_overrides()?.validated()
    }

    /// Load from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = config::load_json_file(path)?;
        config.validated()
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse widget config")?;
        config.validated()
    }

    /// Persist to the config directory
    pub fn save(&self) -> Result<()> {
        config::save_json(CONFIG_FILE, self)
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var(PAGE_SIZE_ENV) {
            self.page_size = value
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number, got {:?}", PAGE_SIZE_ENV, value))?;
        }
        if let Ok(value) = std::env::var(DEBOUNCE_ENV) {
            self.search_debounce_ms = value
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number, got {:?}", DEBOUNCE_ENV, value))?;
        }
        Ok(self)
    }

    /// Check the page-size settings are consistent
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.page_sizes.is_empty(), "page_sizes must not be empty");
        ensure!(
            self.page_sizes.iter().all(|&size| size > 0),
            "page_sizes must all be positive"
        );
        ensure!(
            self.page_sizes.contains(&self.page_size),
            "page_size {} is not one of {:?}",
            self.page_size,
            self.page_sizes
        );
        Ok(())
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn allows_page_size(&self, size: usize) -> bool {
        self.page_sizes.contains(&size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WidgetConfig::default();
        config.validate().unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.search_debounce(), Duration::from_millis(1000));
        assert!(config.allows_page_size(1000));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WidgetConfig::from_json(r#"{ "search_debounce_ms": 250 }"#).unwrap();
        assert_eq!(config.search_debounce_ms, 250);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_page_size_outside_choices() {
        let err = WidgetConfig::from_json(r#"{ "page_size": 7 }"#).unwrap_err();
        assert!(err.to_string().contains("page_size 7"));
    }

    #[test]
    fn test_empty_or_zero_choices() {
        assert!(WidgetConfig::from_json(r#"{ "page_sizes": [] }"#).is_err());
        assert!(WidgetConfig::from_json(r#"{ "page_size": 0, "page_sizes": [0, 10] }"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.json");
        std::fs::write(&path, r#"{ "page_size": 20, "page_sizes": [20, 40] }"#).unwrap();

        let config = WidgetConfig::from_file(&path).unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.page_sizes, vec![20, 40]);
    }
}
