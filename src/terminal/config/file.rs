use std::fs::{self, File};
use std::io::{Error as IoError, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;

pub const DEFAULT_CONTENT: &str = r#"
# This configuration file is generated automatically. Values given on the
# command line are written back here.

# The `timer` section specifies the length of each timer in seconds.
[timer]
focus_duration = 1500
break_duration = 300
# Hide the clock while focusing.
hidden_focus_time = false

# The `storage` section specifies where the focus history is kept. Leave it
# empty to use the XDG data directory.
[storage]
# database = "/path/to/database.db"
"#;

/// The configuration file on disk, created from [`DEFAULT_CONTENT`] on demand.
#[derive(Debug, Clone)]
pub struct ConfigurationFile {
    path: PathBuf,
}

impl ConfigurationFile {
    /// Creates a new [`ConfigurationFile`].
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read content from the file, creating it first if `create_new` is set
    /// and the file is missing.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file doesn't exist or it
    /// fails to create a configuration file.
    pub fn read(&self, create_new: bool) -> Result<String, ConfigurationFileError> {
        let mut file = self.open(create_new)?;
        let mut content = String::new();
        file.read_to_string(&mut content).context(FileSystemSnafu {
            when: "Reading configuration",
        })?;
        Ok(content)
    }

    /// Replace the content of the file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file could not be written.
    pub fn write(&self, content: &str) -> Result<(), ConfigurationFileError> {
        fs::write(&self.path, content).context(FileSystemSnafu {
            when: "Writing configuration",
        })
    }

    fn open(&self, create_new: bool) -> Result<File, ConfigurationFileError> {
        match File::open(&self.path) {
            Ok(file) => Ok(file),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                ensure!(
                    create_new,
                    NotFoundSnafu {
                        path: self.path.clone()
                    }
                );
                self.create()
            }
            Err(err) => Err(err).context(FileSystemSnafu {
                when: "Opening configuration file",
            }),
        }
    }

    fn create(&self) -> Result<File, ConfigurationFileError> {
        let mut file = File::options()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&self.path)
            .context(FileSystemSnafu {
                when: "Creating configuration file",
            })?;

        file.write_all(DEFAULT_CONTENT.as_bytes())
            .context(FileSystemSnafu {
                when: "Writing default configuration content",
            })?;

        file.seek(SeekFrom::Start(0)).context(FileSystemSnafu {
            when: "Resetting file cursor position to start",
        })?;

        tracing::info!(path = %self.path.display(), "Created default configuration");
        Ok(file)
    }
}

/// An error type for accessing the configuration file.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum ConfigurationFileError {
    #[snafu(display("Could not open inexistent file {}", path.display()))]
    NotFound { path: PathBuf },
    #[snafu(display("Could not access configuration: {when}"))]
    FileSystem {
        when: String,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use predicates::path as path_pred;

    #[test]
    fn read_configuration() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("config.toml");
        let content = "[timer]\nfocus_duration = 60\n";
        file.write_str(content).unwrap();

        let config = ConfigurationFile::new(file.path());
        assert_eq!(config.read(false).unwrap(), content);
    }

    #[test]
    fn read_configuration_not_found() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("config.toml");
        file.assert(path_pred::missing());

        let config = ConfigurationFile::new(file.path());
        assert!(matches!(
            config.read(false),
            Err(ConfigurationFileError::NotFound { .. })
        ));
        file.assert(path_pred::missing());
    }

    #[test]
    fn read_configuration_creates_default() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("config.toml");

        let config = ConfigurationFile::new(file.path());
        assert_eq!(config.read(true).unwrap(), DEFAULT_CONTENT);
        file.assert(DEFAULT_CONTENT);
    }

    #[test]
    fn write_configuration() {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        let file = tmp.child("config.toml");
        file.write_str(DEFAULT_CONTENT).unwrap();

        let config = ConfigurationFile::new(file.path());
        config.write("[timer]\n").unwrap();
        file.assert("[timer]\n");
    }
}
