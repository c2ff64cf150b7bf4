//! Application configuration

pub mod site;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use site::{ConfigError, SiteConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Upper bound on simultaneously open chat widgets
    pub max_widgets: usize,
    /// Widgets untouched for this long are closed
    pub widget_idle_secs: u64,
    /// Optional TOML file overriding the landing page copy
    pub site_config: Option<PathBuf>,
}

/// Longest idle timeout accepted for chat widgets (one week)
pub const MAX_WIDGET_IDLE_SECS: u64 = 7 * 24 * 60 * 60;

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source; unset or
    /// unparseable values fall back to the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            max_widgets: lookup("ADVISOR_MAX_WIDGETS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_widgets),
            widget_idle_secs: lookup("ADVISOR_WIDGET_IDLE_SECS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.widget_idle_secs),
            site_config: lookup("ADVISOR_SITE_CONFIG").map(PathBuf::from),
        };

        if config.max_widgets == 0 {
            anyhow::bail!("ADVISOR_MAX_WIDGETS must be at least 1");
        }
        if config.widget_idle_secs == 0 || config.widget_idle_secs > MAX_WIDGET_IDLE_SECS {
            anyhow::bail!(
                "ADVISOR_WIDGET_IDLE_SECS must be between 1 and {}",
                MAX_WIDGET_IDLE_SECS
            );
        }
        Ok(config)
    }

    pub fn widget_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.widget_idle_secs)
    }

    /// Landing page copy: the configured file if any, else the built-in text
    pub fn load_site(&self) -> Result<SiteConfig, ConfigError> {
        match &self.site_config {
            Some(path) => SiteConfig::from_file(path),
            None => Ok(SiteConfig::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            max_widgets: 1024,
            widget_idle_secs: 30 * 60,
            site_config: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_widgets, 1024);
        assert_eq!(config.widget_idle_secs, 1800);
        assert!(config.site_config.is_none());
    }

    #[test]
    fn test_values_from_vars() {
        let config = from_vars(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("ADVISOR_MAX_WIDGETS", "10"),
            ("ADVISOR_WIDGET_IDLE_SECS", "60"),
            ("ADVISOR_SITE_CONFIG", "site.toml"),
        ])
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_widgets, 10);
        assert_eq!(config.widget_idle_timeout(), Duration::from_secs(60));
        assert_eq!(config.site_config, Some(PathBuf::from("site.toml")));
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = from_vars(&[
            ("PORT", "http"),
            ("ADVISOR_MAX_WIDGETS", "-4"),
            ("ADVISOR_WIDGET_IDLE_SECS", "soon"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_widgets, 1024);
        assert_eq!(config.widget_idle_secs, 1800);
    }

    #[test]
    fn test_zero_widgets_rejected() {
        let err = from_vars(&[("ADVISOR_MAX_WIDGETS", "0")]).unwrap_err();
        assert!(err.to_string().contains("ADVISOR_MAX_WIDGETS"));
    }

    #[test]
    fn test_idle_timeout_bounds() {
        assert!(from_vars(&[("ADVISOR_WIDGET_IDLE_SECS", "0")]).is_err());
        assert!(from_vars(&[("ADVISOR_WIDGET_IDLE_SECS", "100000000000000")]).is_err());

        let max = MAX_WIDGET_IDLE_SECS.to_string();
        let config = from_vars(&[("ADVISOR_WIDGET_IDLE_SECS", max.as_str())]).unwrap();
        assert_eq!(config.widget_idle_secs, MAX_WIDGET_IDLE_SECS);
    }

    #[test]
    fn test_default_site_when_unconfigured() {
        let config = Config::default();
        let site = config.load_site().unwrap();
        assert_eq!(site.features.len(), 5);
        assert_eq!(config.widget_idle_timeout(), Duration::from_secs(1800));
    }

    #[test]
    fn test_missing_site_file_is_an_error() {
        let config = Config {
            site_config: Some(PathBuf::from("/nonexistent/advisor-site.toml")),
            ..Config::default()
        };
        assert!(matches!(config.load_site(), Err(ConfigError::Io(_))));
    }
}
