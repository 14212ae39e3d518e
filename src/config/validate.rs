// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ProvrunError, Result};
use crate::watch::PathFilter;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ProvrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.run, raw.env, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_run_section(cfg)?;
    validate_env(cfg)?;
    validate_watchers(cfg)?;
    Ok(())
}

fn validate_run_section(cfg: &RawConfigFile) -> Result<()> {
    if let Some(id) = &cfg.run.builder_id {
        if id.trim().is_empty() {
            return Err(ProvrunError::ConfigError(
                "[run].builder_id must not be empty".to_string(),
            ));
        }
    }
    if let Some(cwd) = &cfg.run.cwd {
        if cwd.as_os_str().is_empty() {
            return Err(ProvrunError::ConfigError(
                "[run].cwd must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_env(cfg: &RawConfigFile) -> Result<()> {
    for key in cfg.env.keys() {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(ProvrunError::ConfigError(format!(
                "[env] has invalid variable name '{key}'"
            )));
        }
    }
    Ok(())
}

fn validate_watchers(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for watch in cfg.watch.iter() {
        if watch.path.as_os_str().is_empty() {
            return Err(ProvrunError::ConfigError(
                "[[watch]] entry has an empty path".to_string(),
            ));
        }

        let name = watch.effective_name();
        if !seen.insert(name.clone()) {
            return Err(ProvrunError::ConfigError(format!(
                "duplicate watcher name '{name}'"
            )));
        }

        PathFilter::new(&watch.include, &watch.exclude).map_err(|e| {
            ProvrunError::ConfigError(format!("watcher '{name}': {e}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::WatchConfig;

    #[test]
    fn empty_config_is_valid() {
        assert!(ConfigFile::try_from(RawConfigFile::default()).is_ok());
    }

    #[test]
    fn watcher_name_defaults_to_path_for_uniqueness() {
        let mut raw = RawConfigFile::default();
        raw.watch.push(WatchConfig::new("dist"));
        let mut named = WatchConfig::new("other");
        named.name = Some("dist".to_string());
        raw.watch.push(named);

        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate watcher name 'dist'"));
    }

    #[test]
    fn env_key_with_equals_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.env.insert("A=B".to_string(), "x".to_string());
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(ProvrunError::ConfigError(_))
        ));
    }
}
