//! Host configuration from environment variables.

use std::path::PathBuf;
use thiserror::Error;

/// Seed used when `HEXFRONT_SEED` is not set
pub const DEFAULT_SEED: u64 = 0x4845_5846;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HEXFRONT_SEED must be an unsigned integer, got {0:?}")]
    Seed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Enveloped template to start from; a demo map otherwise
    pub template: Option<PathBuf>,
    /// JSON array of move batches; a scripted demo game otherwise
    pub replay: Option<PathBuf>,
    /// Rules override, merged over the defaults
    pub rules: Option<PathBuf>,
    pub seed: u64,
}

impl HostConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        let seed = match lookup("HEXFRONT_SEED") {
            Some(text) => text.trim().parse().map_err(|_| ConfigError::Seed(text))?,
            None => DEFAULT_SEED,
        };
        Ok(Self {
            template: path("HEXFRONT_TEMPLATE"),
            replay: path("HEXFRONT_REPLAY"),
            rules: path("HEXFRONT_RULES"),
            seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HostConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(
            config,
            HostConfig {
                template: None,
                replay: None,
                rules: None,
                seed: DEFAULT_SEED,
            }
        );
    }

    #[test]
    fn test_reads_paths_and_seed() {
        let config = HostConfig::from_lookup(lookup(&[
            ("HEXFRONT_TEMPLATE", "maps/duel.json"),
            ("HEXFRONT_REPLAY", ""),
            ("HEXFRONT_SEED", " 42 "),
        ]))
        .unwrap();
        assert_eq!(config.template, Some(PathBuf::from("maps/duel.json")));
        assert_eq!(config.replay, None);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_rejects_bad_seed() {
        let err = HostConfig::from_lookup(lookup(&[("HEXFRONT_SEED", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Seed(s) if s == "soon"));
    }
}
