#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://oprs.co.monmouth.nj.us/oprs/GoogleWithUC/";
pub const DEFAULT_USER_AGENT: &str = concat!("station-enrich/", env!("CARGO_PKG_VERSION"));

/// Settings for the property records portal lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub base_url: String,
    pub user_agent: String,
    pub expand_street_suffixes: bool,
    pub include_tax_history: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            expand_street_suffixes: true,
            include_tax_history: true,
        }
    }
}

impl Validate for SourceSettings {
    fn validate(&self) -> Result<()> {
        validate_url("source.base_url", &self.base_url)?;
        validate_non_empty_string("source.user_agent", &self.user_agent)?;
        Ok(())
    }
}
