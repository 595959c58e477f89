mod content;
mod file;

use std::path::{Path, PathBuf};

pub use content::{Configuration, Overrides, StorageContent, TimerContent};
pub use file::{ConfigurationFileError, DEFAULT_CONTENT};

use snafu::prelude::*;
use toml::de::Error as DeError;
use toml::ser::Error as SerError;

use crate::utils::xdg::{Xdg, XdgBaseKind, XdgError};

use file::ConfigurationFile;

const FILE_NAME: &str = "config.toml";

/// An error type for loading configuration from files.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum LoadConfigurationError {
    #[snafu(display("Could not resolve XDG configuration directory"))]
    XdgConfig { source: XdgError },
    #[snafu(display("Could not read content from file"))]
    Read { source: ConfigurationFileError },
    #[snafu(display("Could not parse invalid configurations"))]
    Parse { source: DeError },
}

/// An error type for writing configuration back to its file.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SaveConfigurationError {
    #[snafu(display("Could not serialize configurations"))]
    Serialize { source: SerError },
    #[snafu(display("Could not write content to file"))]
    Write { source: ConfigurationFileError },
}

/// Read configuration from given path. Optionally create one from default
/// template if it doesn't exist.
///
/// # Errors
///
/// This function will return an error if reading content from file fails or
/// parsing configuration fails.
pub fn load<P: AsRef<Path>>(
    path: P,
    create_new: bool,
) -> Result<Configuration, LoadConfigurationError> {
    let content = ConfigurationFile::new(path)
        .read(create_new)
        .context(ReadSnafu)?;
    toml::from_str(&content).context(ParseSnafu)
}

/// Resolve the configuration file in XDG configuration directory, creating
/// the directory when needed.
///
/// # Errors
///
/// This function will return an error if the directory could not be created.
pub fn xdg_path(app_name: &str) -> Result<PathBuf, LoadConfigurationError> {
    Xdg::new(app_name)
        .and_then(|xdg| xdg.resolve_create(XdgBaseKind::Config, FILE_NAME))
        .context(XdgConfigSnafu)
}

/// Write `config` to `path`, replacing the previous content.
///
/// # Errors
///
/// This function will return an error if serializing or writing fails.
pub fn save<P: AsRef<Path>>(path: P, config: &Configuration) -> Result<(), SaveConfigurationError> {
    let content = toml::to_string_pretty(config).context(SerializeSnafu)?;
    ConfigurationFile::new(path)
        .write(&content)
        .context(WriteSnafu)
}
