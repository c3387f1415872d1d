//! Widget configuration.
//!
//! Every option has a default, so an empty TOML document is a valid config.
//! Option names follow snake_case; the camelCase names used by existing widget
//! integrations are accepted as aliases.

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;
pub const DEFAULT_QUERY_PARAM: &str = "q";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Queries shorter than this never reach the cache or the network.
    #[serde(alias = "minQueryLength")]
    pub min_query_length: usize,
    /// Quiet window before a search fires.
    #[serde(
        rename = "debounce_rate_ms",
        alias = "debounceRate",
        deserialize_with = "duration_from_millis"
    )]
    pub debounce_rate: Duration,
    /// Fire on the trailing edge of the quiet window (`false` fires on the
    /// leading edge instead).
    #[serde(alias = "debounceAfter")]
    pub debounce_after: bool,
    /// Target of the default HTTP fetcher.
    pub endpoint: Option<String>,
    /// Field of the response object holding the result list.
    #[serde(alias = "resultKey")]
    pub result_key: Option<String>,
    /// Pixel offset the renderer applies when scrolling a highlight into view.
    #[serde(alias = "scrollOffset")]
    pub scroll_offset: i32,
    pub placeholder: Option<String>,
    /// Bound on cached queries. Unbounded when unset.
    #[serde(alias = "cacheCapacity")]
    pub cache_capacity: Option<usize>,
    /// Parameter name the default fetcher sends the query under.
    #[serde(alias = "queryParam")]
    pub query_param: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
            debounce_rate: Duration::ZERO,
            debounce_after: true,
            endpoint: None,
            result_key: None,
            scroll_offset: 0,
            placeholder: None,
            cache_capacity: None,
            query_param: DEFAULT_QUERY_PARAM.to_string(),
        }
    }
}

fn duration_from_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

impl SearchConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.query_param.is_empty() {
            return Err(ConfigError::Invalid(
                "query_param must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_capacity(&self) -> Option<NonZeroUsize> {
        self.cache_capacity.and_then(NonZeroUsize::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use std::io::Write as _;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        check!(config.min_query_length == 3);
        check!(config.debounce_rate == Duration::ZERO);
        check!(config.debounce_after);
        check!(config.endpoint.is_none());
        check!(config.scroll_offset == 0);
        check!(config.query_param == "q");
        check!(config.cache_capacity().is_none());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let_assert!(Ok(config) = SearchConfig::from_toml_str(""));
        check!(config == SearchConfig::default());
    }

    #[test]
    fn test_snake_case_options() {
        let source = r#"
            min_query_length = 2
            debounce_rate_ms = 250
            debounce_after = false
            endpoint = "https://example.com/search"
            result_key = "items"
            scroll_offset = -40
            cache_capacity = 16
        "#;
        let_assert!(Ok(config) = SearchConfig::from_toml_str(source));
        check!(config.min_query_length == 2);
        check!(config.debounce_rate == Duration::from_millis(250));
        check!(!config.debounce_after);
        check!(config.endpoint.as_deref() == Some("https://example.com/search"));
        check!(config.result_key.as_deref() == Some("items"));
        check!(config.scroll_offset == -40);
        check!(config.cache_capacity().map(NonZeroUsize::get) == Some(16));
    }

    #[test]
    fn test_camel_case_aliases() {
        let source = r#"
            minQueryLength = 1
            debounceRate = 100
            debounceAfter = false
            resultKey = "data"
        "#;
        let_assert!(Ok(config) = SearchConfig::from_toml_str(source));
        check!(config.min_query_length == 1);
        check!(config.debounce_rate == Duration::from_millis(100));
        check!(!config.debounce_after);
        check!(config.result_key.as_deref() == Some("data"));
    }

    #[rstest]
    #[case("cache_capacity = 0", "cache_capacity")]
    #[case("query_param = \"\"", "query_param")]
    fn test_invalid_values(#[case] source: &str, #[case] field: &str) {
        let_assert!(Err(ConfigError::Invalid(message)) = SearchConfig::from_toml_str(source));
        check!(message.contains(field));
    }

    #[test]
    fn test_unknown_option_is_a_parse_error() {
        let_assert!(Err(ConfigError::Parse(_)) = SearchConfig::from_toml_str("colour = 1"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_query_length = 4").unwrap();

        let_assert!(Ok(config) = SearchConfig::load(file.path()));
        check!(config.min_query_length == 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let_assert!(Err(ConfigError::Read { path: reported, .. }) = SearchConfig::load(&path));
        check!(reported == path);
    }
}
