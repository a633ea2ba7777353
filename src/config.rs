/// Runtime configuration
///
/// Read from the environment with defaults for everything. `from_lookup`
/// takes any key lookup so configuration can be tested without touching the
/// process environment.

use crate::error::ConfigError;
use crate::view::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "https://club-registration-backend-production.up.railway.app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the club registration REST API
    pub api_base_url: String,
    pub page_size: usize,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(url) = lookup("CLUBTABLE_API_URL") {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::Empty {
                    name: "CLUBTABLE_API_URL".to_string(),
                });
            }
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(size) = lookup("CLUBTABLE_PAGE_SIZE") {
            config.page_size = parse_positive("CLUBTABLE_PAGE_SIZE", &size)?;
        }

        if let Some(host) = lookup("HOST") {
            if host.trim().is_empty() {
                return Err(ConfigError::Empty {
                    name: "HOST".to_string(),
                });
            }
            config.host = host.trim().to_string();
        }

        if let Some(port) = lookup("PORT") {
            let value = parse_positive("PORT", &port)?;
            config.port = u16::try_from(value).map_err(|_| ConfigError::InvalidNumber {
                name: "PORT".to_string(),
                value: port.clone(),
            })?;
        }

        log::debug!("configuration: {:?}", config);
        Ok(config)
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 10);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CLUBTABLE_API_URL", "http://localhost:3000/"),
            ("CLUBTABLE_PAGE_SIZE", "25"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            Config::from_lookup(lookup(&[("PORT", "http")])),
            Err(ConfigError::InvalidNumber {
                name: "PORT".to_string(),
                value: "http".to_string(),
            })
        );
        assert!(Config::from_lookup(lookup(&[("PORT", "70000")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CLUBTABLE_PAGE_SIZE", "0")])).is_err());
        assert!(matches!(
            Config::from_lookup(lookup(&[("CLUBTABLE_API_URL", "  ")])),
            Err(ConfigError::Empty { .. })
        ));
    }
}
