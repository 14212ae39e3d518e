// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Config file looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Provrun.toml";

/// Read and deserialize a config file without semantic validation.
///
/// Use [`load_and_validate`] unless you need to merge overrides into the raw
/// sections first.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let mut config: RawConfigFile = toml::from_str(&contents)?;
    anchor_run_cwd(&mut config, path);

    Ok(config)
}

/// A relative `[run].cwd` is taken from the directory holding the config file.
fn anchor_run_cwd(config: &mut RawConfigFile, config_path: &Path) {
    let Some(base) = config_path.parent() else {
        return;
    };
    if let Some(cwd) = config.run.cwd.as_mut() {
        if cwd.is_relative() {
            *cwd = base.join(&*cwd);
        }
    }
}

/// Load a configuration file and validate it:
///
/// - watcher paths non-empty and names unique,
/// - include/exclude globs compile,
/// - `[env]` keys are usable variable names.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// The config file to read, if any.
///
/// An explicit path is always returned (a missing file is then an error when
/// loading). Without one, [`DEFAULT_CONFIG_FILE`] is used only if it exists.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(PathBuf::from(path)),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}
