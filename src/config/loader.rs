//! Config loading

use std::path::PathBuf;

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::Result;

pub const ENV_PREFIX: &str = "HELM_SPRUCE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wrapped binary, as a name looked up on `PATH` or an explicit path.
    /// When unset it is derived from the wrapper's own executable name.
    pub binary: Option<PathBuf>,
    /// Merge values files but leave `(( ... ))` expressions untouched.
    pub skip_eval: bool,
    /// `tracing` filter directive.
    pub log: String,
    /// File name of the synthesized values file inside the temp dir.
    pub values_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binary: None,
            skip_eval: false,
            log: "warn".to_string(),
            values_file: "values.yaml".to_string(),
        }
    }
}

pub fn provider() -> Figment {
    Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed(ENV_PREFIX))
}

pub fn load_config() -> Result<Config> {
    let config: Config = provider().extract()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let name = config.values_file.as_str();
    if name.is_empty() || name.contains(std::path::is_separator) || name == "." || name == ".." {
        return Err(figment::Error::from(format!(
            "values_file must be a plain file name, got '{name}'"
        ))
        .into());
    }
    if let Err(err) = EnvFilter::try_new(&config.log) {
        return Err(figment::Error::from(format!(
            "log must be a tracing filter directive, got '{}': {err}",
            config.log
        ))
        .into());
    }
    Ok(())
}
