//! Server configuration.
//!
//! Defaults, then an optional TOML file, then `CLASSROOM_*` environment
//! variables. Later sources win field by field.

use classroom_core::{default_log_level, validate_log_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_FILE_NAME: &str = "classroom.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidValue { field: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "unable to read config file `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "unable to parse config file `{}`: {source}", path.display())
            }
            Self::InvalidValue { field, message } => write!(f, "invalid {field}: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// On-disk shape; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    host: Option<String>,
    port: Option<u16>,
    db_path: Option<PathBuf>,
    log_level: Option<String>,
    log_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub log_level: String,
    /// `None` logs to stderr.
    pub log_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`ServerConfig::load`] with an injectable environment lookup.
    pub fn load_with(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => ConfigFile::default(),
        };

        let mut cfg = Self::default();
        cfg.apply(ConfigFile {
            host: env("CLASSROOM_HOST").or(file.host),
            port: match env("CLASSROOM_PORT") {
                Some(raw) => Some(raw.trim().parse().map_err(|err| ConfigError::InvalidValue {
                    field: "port",
                    message: format!("{raw:?}: {err}"),
                })?),
                None => file.port,
            },
            db_path: env("CLASSROOM_DB_PATH")
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| PathBuf::from(raw.trim()))
                .or(file.db_path),
            log_level: env("CLASSROOM_LOG_LEVEL").or(file.log_level),
            log_dir: env("CLASSROOM_LOG_DIR").or(file.log_dir),
        })?;

        Ok(cfg)
    }

    fn apply(&mut self, overrides: ConfigFile) -> Result<(), ConfigError> {
        if let Some(host) = overrides.host {
            let ip: IpAddr = host.trim().parse().map_err(|err| ConfigError::InvalidValue {
                field: "host",
                message: format!("{host:?}: {err}"),
            })?;
            self.addr.set_ip(ip);
        }
        if let Some(port) = overrides.port {
            self.addr.set_port(port);
        }
        if let Some(db_path) = overrides.db_path {
            self.db_path = db_path;
        }
        if let Some(level) = overrides.log_level {
            validate_log_level(&level).map_err(|message| ConfigError::InvalidValue {
                field: "log_level",
                message,
            })?;
            self.log_level = level;
        }
        if let Some(dir) = overrides.log_dir {
            self.log_dir = Some(dir).filter(|dir| !dir.trim().is_empty());
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, DEFAULT_PORT};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let cfg = ServerConfig::load_with(None, env_of(&[])).unwrap();
        assert_eq!(cfg.addr.port(), DEFAULT_PORT);
        assert_eq!(cfg.log_dir, None);
        assert!(cfg.db_path.ends_with("classroom.sqlite3"));
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classroom.toml");
        std::fs::write(
            &path,
            "host = \"127.0.0.1\"\nport = 8080\ndb_path = \"/var/lib/classroom.db\"\nlog_level = \"warn\"\n",
        )
        .unwrap();

        let cfg = ServerConfig::load_with(
            Some(&path),
            env_of(&[("CLASSROOM_PORT", "9090"), ("CLASSROOM_LOG_LEVEL", "DEBUG")]),
        )
        .unwrap();
        assert_eq!(cfg.addr.to_string(), "127.0.0.1:9090");
        assert_eq!(cfg.db_path, PathBuf::from("/var/lib/classroom.db"));
        assert_eq!(cfg.log_level, "DEBUG");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ServerConfig::load_with(None, env_of(&[("CLASSROOM_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "port", .. }));

        let err = ServerConfig::load_with(None, env_of(&[("CLASSROOM_HOST", "localhost")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "host", .. }));

        let err = ServerConfig::load_with(None, env_of(&[("CLASSROOM_LOG_LEVEL", "loud")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "log_level", .. }));
    }

    #[test]
    fn unknown_file_keys_fail_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classroom.toml");
        std::fs::write(&path, "prot = 1\n").unwrap();

        let err = ServerConfig::load_with(Some(&path), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
