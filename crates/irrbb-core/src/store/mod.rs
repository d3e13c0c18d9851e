//! Persistence for instruments and recorded analytics.
//!
//! The backend is chosen from the `DATABASE_URL` scheme:
//! - `postgres://` / `postgresql://`: [`PostgresStore`]
//! - `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>`: [`SqliteStore`]

mod postgres;
mod sqlite;
mod traits;

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;
pub use traits::InstrumentStore;

use crate::error::{IrrbbError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Parsed database location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    Postgres(String),
    SqliteMemory,
    SqliteFile(PathBuf),
}

impl DatabaseUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(DatabaseUrl::Postgres(url.to_string()));
        }
        if url == "sqlite::memory:" || url == "sqlite://:memory:" {
            return Ok(DatabaseUrl::SqliteMemory);
        }
        if let Some(path) = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
        {
            if path.is_empty() {
                return Err(IrrbbError::config("SQLite URL is missing a file path"));
            }
            return Ok(DatabaseUrl::SqliteFile(PathBuf::from(path)));
        }

        let scheme = url.split("://").next().unwrap_or(url);
        Err(IrrbbError::config(format!(
            "Unsupported DATABASE_URL scheme '{}'; expected postgres://, postgresql:// or sqlite:",
            scheme
        )))
    }

    /// Description safe for logs (credentials removed).
    pub fn redacted(&self) -> String {
        match self {
            DatabaseUrl::Postgres(url) => match (url.find("://"), url.rfind('@')) {
                (Some(scheme_end), Some(at)) if at > scheme_end => {
                    format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
                }
                _ => url.clone(),
            },
            DatabaseUrl::SqliteMemory => "sqlite::memory:".to_string(),
            DatabaseUrl::SqliteFile(path) => format!("sqlite://{}", path.display()),
        }
    }
}

/// Open the store described by `url`, creating its schema if needed.
pub async fn open_store(url: &str) -> Result<Arc<dyn InstrumentStore>> {
    let parsed = DatabaseUrl::parse(url)?;
    info!("Opening database {}", parsed.redacted());

    let store: Arc<dyn InstrumentStore> = match parsed {
        DatabaseUrl::Postgres(url) => Arc::new(PostgresStore::connect(&url).await?),
        DatabaseUrl::SqliteMemory => Arc::new(SqliteStore::open_in_memory()?),
        DatabaseUrl::SqliteFile(path) => Arc::new(SqliteStore::open(path)?),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_postgres_urls() {
        let url = "postgresql://irrbb_user:irrbb_password@db:5432/irrbb_db?sslmode=disable";
        assert_eq!(
            DatabaseUrl::parse(url).unwrap(),
            DatabaseUrl::Postgres(url.to_string())
        );
        assert!(matches!(
            DatabaseUrl::parse("postgres://localhost/x").unwrap(),
            DatabaseUrl::Postgres(_)
        ));
    }

    #[test]
    fn test_parse_sqlite_urls() {
        assert_eq!(
            DatabaseUrl::parse("sqlite::memory:").unwrap(),
            DatabaseUrl::SqliteMemory
        );
        assert_eq!(
            DatabaseUrl::parse("sqlite://data/irrbb.db").unwrap(),
            DatabaseUrl::SqliteFile(PathBuf::from("data/irrbb.db"))
        );
        assert_eq!(
            DatabaseUrl::parse("sqlite:irrbb.db").unwrap(),
            DatabaseUrl::SqliteFile(PathBuf::from("irrbb.db"))
        );
        assert!(DatabaseUrl::parse("sqlite://").is_err());
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = DatabaseUrl::parse("mysql://root@localhost/db").unwrap_err();
        assert!(matches!(err, IrrbbError::Config { .. }));
        assert!(err.to_string().contains("mysql"));
    }

    #[test]
    fn test_redacted_hides_credentials() {
        let url = DatabaseUrl::parse("postgresql://user:secret@db:5432/irrbb_db").unwrap();
        assert_eq!(url.redacted(), "postgresql://***@db:5432/irrbb_db");
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = open_store("sqlite::memory:").await.unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        assert_eq!(store.count_loans().await.unwrap(), 0);
    }
}
