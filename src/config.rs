//! Configuration for the MediConnect API server
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// MediConnect - community platform API for doctors and patients
#[derive(Parser, Debug, Clone)]
#[command(name = "mediconnect")]
#[command(about = "API server for the MediConnect doctor-patient community")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "MEDICONNECT_LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Entity store backend serving the API
    #[arg(long, value_enum, env = "MEDICONNECT_STORAGE", default_value = "memory")]
    pub storage: StorageBackend,

    /// Postgres connection string (required with --storage postgres)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Session lifetime in seconds, slid forward on each authenticated request
    #[arg(long, env = "MEDICONNECT_SESSION_TTL", default_value = "604800")]
    pub session_ttl_secs: u64,

    /// Load the demo dataset at startup if the store is empty
    #[arg(long, env = "MEDICONNECT_SEED_DEMO", default_value = "false")]
    pub seed_demo: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MEDICONNECT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Which entity store serves the API
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process store, data lost on restart
    Memory,
    /// PostgreSQL-backed store
    Postgres,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Postgres => "postgres",
        }
    }
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.storage == StorageBackend::Postgres && self.database_url.is_none() {
            return Err("DATABASE_URL is required with --storage postgres".to_string());
        }

        if self.session_ttl_secs == 0 {
            return Err("MEDICONNECT_SESSION_TTL must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["mediconnect"])
    }

    #[test]
    fn test_defaults() {
        let args = base_args();
        assert_eq!(args.listen.port(), 5000);
        assert_eq!(args.storage, StorageBackend::Memory);
        assert_eq!(args.session_ttl_secs, 604_800);
        assert!(!args.seed_demo);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        // Keep the ambient environment out of the parse
        std::env::remove_var("DATABASE_URL");

        let args = Args::parse_from(["mediconnect", "--storage", "postgres"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from([
            "mediconnect",
            "--storage",
            "postgres",
            "--database-url",
            "postgres://localhost/mediconnect",
        ]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let args = Args::parse_from(["mediconnect", "--session-ttl-secs", "0"]);
        assert!(args.validate().is_err());
    }
}
