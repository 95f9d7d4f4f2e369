//! Process configuration.
//!
//! Every option can be given as a flag or through its environment variable.
//! Without `DATABASE_URL` the service runs on in-memory storage, with the
//! cell registry seeded from `--cell` pairs.

use std::net::SocketAddr;

use clap::Parser;
use thiserror::Error;

use x3pl_observability::LogFormat;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "x3pl-api",
    author,
    version,
    about = "X_Three_PL warehouse inventory service",
    long_about = None
)]
pub struct Args {
    /// Interface to bind.
    #[arg(long, env = "X3PL_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3010)]
    pub port: u16,

    /// PostgreSQL connection string; in-memory storage when absent.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "X3PL_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,

    /// Cell registry entries for in-memory mode, as `BARCODE=Name`.
    #[arg(long = "cell", env = "X3PL_CELLS", value_delimiter = ',', value_parser = parse_cell)]
    pub cells: Vec<CellEntry>,

    /// Log output format (`json` or `text`).
    #[arg(long, env = "X3PL_LOG_FORMAT", default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEntry {
    pub barcode: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address {addr}: {source}")]
    Address {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

impl Args {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|source| ConfigError::Address { addr, source })
    }

    /// Configuration for in-process use (tests, embedding).
    pub fn in_memory(cells: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: None,
            db_max_connections: 10,
            cells: cells
                .into_iter()
                .map(|(barcode, name)| CellEntry {
                    barcode: barcode.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            log_format: LogFormat::Text,
        }
    }
}

fn parse_cell(raw: &str) -> Result<CellEntry, String> {
    let (barcode, name) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected BARCODE=Name, got '{raw}'"))?;
    let (barcode, name) = (barcode.trim(), name.trim());
    if barcode.is_empty() || name.is_empty() {
        return Err(format!("expected BARCODE=Name, got '{raw}'"));
    }
    Ok(CellEntry {
        barcode: barcode.to_string(),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_legacy_deployment() {
        let args = Args::try_parse_from(["x3pl-api"]).unwrap();
        assert_eq!(args.port, 3010);
        assert_eq!(args.db_max_connections, 10);
        assert_eq!(args.log_format, LogFormat::Json);
        assert_eq!(args.listen_addr().unwrap().to_string(), "0.0.0.0:3010");
    }

    #[test]
    fn cells_are_parsed_from_pairs() {
        let args = Args::try_parse_from(["x3pl-api", "--cell", "C1=Shelf 1,C2=Shelf 2"]).unwrap();
        assert_eq!(args.cells.len(), 2);
        assert_eq!(args.cells[1].name, "Shelf 2");
        assert!(Args::try_parse_from(["x3pl-api", "--cell", "C1"]).is_err());
    }
}
