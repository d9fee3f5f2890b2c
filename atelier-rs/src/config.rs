use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(
    name = "atelier-rs",
    version,
    about = "Content-management backend for an artist portfolio site"
)]
pub struct Cli {
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    #[arg(long, short = 'd', value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    pub exhibitions_file: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    pub db_file: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    pub admin_file: Option<PathBuf>,

    #[arg(long, value_name = "HOURS")]
    pub session_ttl_hours: Option<u64>,

    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub exhibitions_file: PathBuf,
    pub db_file: PathBuf,
    pub admin_file: Option<PathBuf>,
    pub session_ttl_hours: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind: Option<SocketAddr>,
    data_dir: Option<PathBuf>,
    exhibitions_file: Option<PathBuf>,
    db_file: Option<PathBuf>,
    admin_file: Option<PathBuf>,
    session_ttl_hours: Option<u64>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let from_file = read_file_config(cli.config.as_deref())?;

        let bind = cli
            .bind
            .or(from_file.bind)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));
        let data_dir = cli
            .data_dir
            .or(from_file.data_dir)
            .unwrap_or_else(|| PathBuf::from("./data"));
        let exhibitions_file = cli
            .exhibitions_file
            .or(from_file.exhibitions_file)
            .unwrap_or_else(|| data_dir.join("exhibitions.json"));
        let db_file = cli
            .db_file
            .or(from_file.db_file)
            .unwrap_or_else(|| data_dir.join("atelier.db"));
        let admin_file = cli.admin_file.or(from_file.admin_file);
        let session_ttl_hours = cli
            .session_ttl_hours
            .or(from_file.session_ttl_hours)
            .unwrap_or(24)
            .max(1);

        Ok(Self {
            bind,
            data_dir,
            exhibitions_file,
            db_file,
            admin_file,
            session_ttl_hours,
        })
    }
}

fn read_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use tempfile::tempdir;

    use super::{AppConfig, Cli};

    #[test]
    fn defaults_derive_store_paths_from_data_dir() {
        let cli = Cli::parse_from(["atelier-rs"]);
        let config = AppConfig::from_cli(cli).unwrap();

        assert_eq!(config.bind.port(), 3000);
        assert_eq!(
            config.exhibitions_file,
            config.data_dir.join("exhibitions.json")
        );
        assert_eq!(config.db_file, config.data_dir.join("atelier.db"));
        assert_eq!(config.session_ttl_hours, 24);
        assert!(config.admin_file.is_none());
    }

    #[test]
    fn cli_overrides_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "bind = \"127.0.0.1:9000\"\nsession_ttl_hours = 2\n").unwrap();

        let cli = Cli::parse_from([
            "atelier-rs",
            "--bind",
            "127.0.0.1:9100",
            "--config",
            path.to_str().unwrap(),
        ]);
        let config = AppConfig::from_cli(cli).unwrap();

        assert_eq!(config.bind.port(), 9100);
        assert_eq!(config.session_ttl_hours, 2);
    }

    #[test]
    fn invalid_config_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "bind = 3000\n").unwrap();

        let cli = Cli::parse_from(["atelier-rs", "--config", path.to_str().unwrap()]);
        assert!(AppConfig::from_cli(cli).is_err());
    }
}
