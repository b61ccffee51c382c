//! Runtime configuration
//!
//! Every field has a default, so a config file only needs the values it changes:
//!
//! ```json
//! { "crawler": { "maxRetries": 5 }, "parser": { "dateFormat": "yyyy-MM-dd" } }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Output format of note dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    #[serde(rename = "dd/MM/yyyy")]
    DayMonthYear,
    #[serde(rename = "yyyy-MM-dd")]
    YearMonthDay,
}

/// Catalog refresh settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrawlerConfig {
    /// Attempts per record before the whole refresh fails
    pub max_retries: u32,
    /// Fixed wait after a "too many requests" answer
    pub rate_limit_delay_secs: u64,
    /// Upper bound of the random wait added to `rate_limit_delay_secs`
    pub rate_limit_jitter_secs: u64,
    pub stock_page_size: u32,
    pub fund_page_size: u32,
    pub language: String,
    pub request_timeout_secs: u64,
    /// Time between two scheduled refreshes
    pub update_interval_secs: u64,
    /// Time before a failed scheduled refresh is attempted again
    pub retry_interval_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_retries: 20,
            rate_limit_delay_secs: 10,
            rate_limit_jitter_secs: 5,
            stock_page_size: 120,
            fund_page_size: 60,
            language: "pt-br".to_string(),
            request_timeout_secs: 30,
            update_interval_secs: 7 * 24 * 3600,
            retry_interval_secs: 24 * 3600,
        }
    }
}

impl CrawlerConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}

/// Note parsing settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserConfig {
    pub date_format: DateFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub parser: ParserConfig,
}

impl Config {
    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
