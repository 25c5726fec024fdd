use crate::error::ConfigError;
use crate::name_guard;
use std::path::PathBuf;

pub const CONFIG_PATH_VAR: &str = "BIND9_CONFIG_PATH";
pub const RECORDS_PATH_VAR: &str = "BIND9_RECORDS_PATH";
pub const PROTECTED_FILES_VAR: &str = "BIND9_PROTECTED_FILES";

/// Configuration files that can never be deleted through the store
pub const DEFAULT_PROTECTED_FILES: [&str; 3] =
    ["named.conf", "named.conf.local", "named.conf.default-zones"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding `named.conf` fragments
    pub config_dir: PathBuf,

    /// Directory holding zone files
    pub records_dir: PathBuf,

    /// Configuration file names that delete refuses to remove
    pub protected_files: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/app/bind9/config"),
            records_dir: PathBuf::from("/app/bind9/records"),
            protected_files: DEFAULT_PROTECTED_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl StoreConfig {
    pub fn new(config_dir: impl Into<PathBuf>, records_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            records_dir: records_dir.into(),
            ..Self::default()
        }
    }

    /// Create a StoreConfig from environment variables
    /// Returns Err if a variable is set but unusable
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(CONFIG_PATH_VAR) {
            config.config_dir = parse_dir(CONFIG_PATH_VAR, dir)?;
        }

        if let Some(dir) = lookup(RECORDS_PATH_VAR) {
            config.records_dir = parse_dir(RECORDS_PATH_VAR, dir)?;
        }

        if let Some(files) = lookup(PROTECTED_FILES_VAR) {
            config.protected_files = parse_protected_files(&files)?;
        }

        Ok(config)
    }
}

fn parse_dir(var: &'static str, value: String) -> Result<PathBuf, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidDirectory { var, value });
    }
    Ok(PathBuf::from(value.trim()))
}

fn parse_protected_files(value: &str) -> Result<Vec<String>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            if name_guard::is_safe(name) {
                Ok(name.to_string())
            } else {
                Err(ConfigError::InvalidProtectedFile(name.to_string()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert!(config.protected_files.contains(&"named.conf".to_string()));
    }

    #[test]
    fn test_env_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (CONFIG_PATH_VAR, "/srv/bind/etc"),
            (RECORDS_PATH_VAR, " /srv/bind/zones "),
            (PROTECTED_FILES_VAR, "named.conf, rndc.conf,"),
        ]))
        .unwrap();

        assert_eq!(config.config_dir, PathBuf::from("/srv/bind/etc"));
        assert_eq!(config.records_dir, PathBuf::from("/srv/bind/zones"));
        assert_eq!(config.protected_files, vec!["named.conf", "rndc.conf"]);
    }

    #[test]
    fn test_rejects_empty_dir_and_unsafe_protected_name() {
        let err = StoreConfig::from_lookup(lookup_from(&[(CONFIG_PATH_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDirectory { var: CONFIG_PATH_VAR, .. }));

        let err =
            StoreConfig::from_lookup(lookup_from(&[(PROTECTED_FILES_VAR, "../named.conf")]))
                .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidProtectedFile("../named.conf".to_string())
        );
    }
}
