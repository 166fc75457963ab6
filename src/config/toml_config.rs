use crate::config::SourceSettings;
use crate::utils::error::{EnrichError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

/// Optional configuration file. Every value may be omitted.
///
/// ```toml
/// [source]
/// base_url = "https://oprs.co.monmouth.nj.us/oprs/GoogleWithUC/"
/// user_agent = "${ENRICH_USER_AGENT}"
///
/// [lookup]
/// expand_street_suffixes = true
/// include_tax_history = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub lookup: LookupSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupSection {
    pub expand_street_suffixes: Option<bool>,
    pub include_tax_history: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EnrichError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EnrichError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Layer file values over `base`.
    pub fn apply_to(&self, base: SourceSettings) -> SourceSettings {
        SourceSettings {
            base_url: self.source.base_url.clone().unwrap_or(base.base_url),
            user_agent: self.source.user_agent.clone().unwrap_or(base.user_agent),
            expand_street_suffixes: self
                .lookup
                .expand_street_suffixes
                .unwrap_or(base.expand_street_suffixes),
            include_tax_history: self
                .lookup
                .include_tax_history
                .unwrap_or(base.include_tax_history),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.apply_to(SourceSettings::default()).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(
            config.apply_to(SourceSettings::default()),
            SourceSettings::default()
        );
    }

    #[test]
    fn test_file_values_override_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [source]
            base_url = "http://localhost:9000/oprs/"

            [lookup]
            include_tax_history = false
            "#,
        )
        .unwrap();

        let settings = config.apply_to(SourceSettings::default());
        assert_eq!(settings.base_url, "http://localhost:9000/oprs/");
        assert!(!settings.include_tax_history);
        assert!(settings.expand_street_suffixes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("STATION_ENRICH_TEST_UA", "county-research/2.0");
        let config = TomlConfig::from_toml_str(
            r#"
            [source]
            user_agent = "${STATION_ENRICH_TEST_UA}"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.source.user_agent.as_deref(),
            Some("county-research/2.0")
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = TomlConfig::from_toml_str("[source]\nendpoint = \"x\"\n");
        assert!(matches!(
            result,
            Err(EnrichError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_invalid_base_url_fails_validation() {
        let config = TomlConfig::from_toml_str("[source]\nbase_url = \"ftp://example.com\"\n").unwrap();
        assert!(config.validate().is_err());
    }
}
