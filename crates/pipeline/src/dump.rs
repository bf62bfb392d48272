//! Database dump collaborators
//!
//! Two providers, matching what the tool is deployed against:
//! - postgres: `pg_dump` with the password passed via `PGPASSWORD`
//! - sqlite: a plain copy of the database file

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Connection parameters for one postgres database.
#[derive(Clone)]
pub struct PostgresConnection {
    pub name: String,
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
}

impl PostgresConnection {
    /// `psql`/`pg_dump` connection arguments.
    fn conn_args(&self) -> Vec<&str> {
        vec![
            "-h",
            &self.host,
            "-p",
            &self.port,
            "-U",
            &self.username,
            "-d",
            &self.name,
        ]
    }
}

// Password redacted; connection details end up in debug logs.
impl fmt::Debug for PostgresConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConnection")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

/// One database to back up.
#[derive(Debug, Clone)]
pub enum DatabaseSpec {
    Postgres(PostgresConnection),
    Sqlite { path: PathBuf },
}

impl DatabaseSpec {
    /// Stable label used for dump file names and log lines.
    pub fn label(&self) -> String {
        match self {
            DatabaseSpec::Postgres(conn) => conn.name.clone(),
            DatabaseSpec::Sqlite { path } => path
                .to_string_lossy()
                .replace(['/', '\\', '.'], "_"),
        }
    }
}

impl fmt::Display for DatabaseSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseSpec::Postgres(conn) => {
                write!(f, "<postgres {}@{}:{}>", conn.name, conn.host, conn.port)
            }
            DatabaseSpec::Sqlite { path } => write!(f, "<sqlite '{}'>", path.display()),
        }
    }
}

/// Dump collaborator seam.
#[async_trait]
pub trait Dumper: Send + Sync {
    /// Dump `db` to a file starting at `dest` (the implementation adds
    /// a provider-specific extension) and return the written path.
    async fn dump(&self, db: &DatabaseSpec, dest: &Path) -> Result<PathBuf>;

    /// Cheap connectivity/presence check, used by preflight.
    async fn check(&self, db: &DatabaseSpec) -> Result<()>;
}

/// Production dumper shelling out to the provider CLI tools.
#[derive(Debug, Default, Clone)]
pub struct ToolDumper;

#[async_trait]
impl Dumper for ToolDumper {
    async fn dump(&self, db: &DatabaseSpec, dest: &Path) -> Result<PathBuf> {
        match db {
            DatabaseSpec::Postgres(conn) => {
                let out = PathBuf::from(format!("{}.sql", dest.display()));
                debug!(db = %db, dest = %out.display(), "running pg_dump");
                let output = Command::new("pg_dump")
                    .args(conn.conn_args())
                    .arg("-f")
                    .arg(&out)
                    .env("PGPASSWORD", &conn.password)
                    .output()
                    .await
                    .context("failed to spawn pg_dump")?;
                if !output.status.success() {
                    bail!(
                        "pg_dump failed for {}: {}",
                        db,
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
                Ok(out)
            }
            DatabaseSpec::Sqlite { path } => {
                let out = PathBuf::from(format!("{}.db", dest.display()));
                debug!(db = %db, dest = %out.display(), "copying sqlite file");
                tokio::fs::copy(path, &out)
                    .await
                    .with_context(|| format!("failed to copy sqlite database {}", path.display()))?;
                Ok(out)
            }
        }
    }

    async fn check(&self, db: &DatabaseSpec) -> Result<()> {
        match db {
            DatabaseSpec::Postgres(conn) => {
                let output = Command::new("psql")
                    .args(conn.conn_args())
                    .args(["-c", "\\q"])
                    .env("PGPASSWORD", &conn.password)
                    .output()
                    .await
                    .context("failed to spawn psql")?;
                if !output.status.success() {
                    bail!(
                        "could not connect to {}: {}",
                        db,
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
                Ok(())
            }
            DatabaseSpec::Sqlite { path } => {
                if !path.is_file() {
                    bail!("sqlite database not found: {}", path.display());
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> PostgresConnection {
        PostgresConnection {
            name: "appdb".to_string(),
            host: "localhost".to_string(),
            port: "5432".to_string(),
            username: "app".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let formatted = format!("{:?}", conn());
        assert!(!formatted.contains("hunter2"));
        assert!(formatted.contains("*****"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(DatabaseSpec::Postgres(conn()).label(), "appdb");
        let sqlite = DatabaseSpec::Sqlite {
            path: PathBuf::from("data/app.db"),
        };
        assert_eq!(sqlite.label(), "data_app_db");
    }

    #[tokio::test]
    async fn test_sqlite_dump_copies_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("app.db");
        std::fs::write(&src, b"sqlite bytes").unwrap();

        let db = DatabaseSpec::Sqlite { path: src };
        let dest = dir.path().join("dump_0");
        let written = ToolDumper.dump(&db, &dest).await.unwrap();

        assert_eq!(written, dir.path().join("dump_0.db"));
        assert_eq!(std::fs::read(written).unwrap(), b"sqlite bytes");
    }

    #[tokio::test]
    async fn test_sqlite_check_requires_existing_file() {
        let db = DatabaseSpec::Sqlite {
            path: PathBuf::from("/nonexistent/app.db"),
        };
        assert!(ToolDumper.check(&db).await.is_err());
    }
}
