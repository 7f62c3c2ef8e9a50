//! Configuration loader.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, or defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.uiprobe`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.display.scale_x, 1.0);
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [display]
            scale_x = 2.0
            scale_y = 1.5

            [vector_store]
            url = "http://qdrant:6333"
            collection = "screens"
            connect_retries = 3

            [matching]
            acceptance_threshold = 0.95

            [budget]
            token_ceiling = 100000
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.display.scale_x, 2.0);
        assert_eq!(config.display.scale_y, 1.5);
        assert_eq!(config.vector_store.url, "http://qdrant:6333");
        assert_eq!(config.vector_store.collection, "screens");
        assert_eq!(config.vector_store.connect_retries, 3);
        assert_eq!(config.matching.acceptance_threshold, 0.95);
        assert_eq!(config.matching.merge_threshold, 0.3);
        assert_eq!(config.budget.token_ceiling, 100_000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval]").unwrap();
        writeln!(file, "top_n = 9").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.retrieval.top_n, 9);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/uiprobe.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/uiprobe.toml")).unwrap();
        assert_eq!(config.retrieval.top_n, 5);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("UIPROBE_TEST_API_KEY", "secret");
        }
        let content = "[vector_store]\napi_key = \"${UIPROBE_TEST_API_KEY}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.vector_store.api_key.as_deref(), Some("secret"));
        unsafe {
            std::env::remove_var("UIPROBE_TEST_API_KEY");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_UIPROBE_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/var/log"), "/var/log");
    }
}
