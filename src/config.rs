use crate::{
    errors::{FileOperation, IoError, ParseError},
    settings::PartialSettings,
};
use miette::Diagnostic;
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("I/O error within config domain")]
    #[diagnostic(code(pkgcreator::config::io))]
    Io(#[from] IoError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

/// Optional user configuration, e.g.
///
/// ```toml
/// license_api = "https://api.github.com/repos/github/choosealicense.com/contents/_licenses"
///
/// [settings]
/// author_name = "Ada Lovelace"
/// github_username = "ada"
/// license = "mit"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub license_api: Option<String>,
    pub settings: PartialSettings,
}
impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|error| IoError::new(FileOperation::Read, path.to_path_buf(), error))?;

        let parsed = toml::from_str(&content)
            .map_err(|error| ParseError::new(path.to_path_buf(), error))?;

        log::debug!("loaded config from {}", path.display());

        Ok(parsed)
    }
}
