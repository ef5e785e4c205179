//! SQLite connectivity.
//!
//! Opens the pooled database the server needs before it may accept
//! connections.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

/// Name appended to the configured database URI.
pub const DB_NAME: &str = "video-streaming";

const SQLITE_SCHEME: &str = "sqlite://";

#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl Database {
    /// Open the pool for `database_uri` and verify a connection answers.
    pub fn connect(database_uri: &str) -> Result<Self> {
        let path = database_path(database_uri);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database dir {:?}", parent))?;
        }

        let manager = SqliteConnectionManager::file(&path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });
        let pool = Pool::builder()
            .max_size(4)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .with_context(|| format!("open database {:?}", path))?;

        let db = Self { pool, path };
        db.ping()?;
        Ok(db)
    }

    /// Round-trip a trivial query.
    pub fn ping(&self) -> Result<()> {
        let conn = self.pool.get().context("checkout database connection")?;
        let one: i64 = conn
            .query_row("SELECT 1", [], |row| row.get(0))
            .context("database ping")?;
        anyhow::ensure!(one == 1, "unexpected ping result {one}");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// File backing `database_uri`: the URI (minus an optional `sqlite://`
/// scheme) with the database name and `.db` appended.
pub fn database_path(database_uri: &str) -> PathBuf {
    let base = database_uri
        .trim()
        .strip_prefix(SQLITE_SCHEME)
        .unwrap_or(database_uri.trim());
    PathBuf::from(format!("{base}{DB_NAME}.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "video-stream-server-{tag}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn database_path_appends_name() {
        assert_eq!(
            database_path("./data/"),
            PathBuf::from("./data/video-streaming.db")
        );
        assert_eq!(
            database_path("sqlite:///srv/db/"),
            PathBuf::from("/srv/db/video-streaming.db")
        );
        assert_eq!(database_path("prefix-"), PathBuf::from("prefix-video-streaming.db"));
    }

    #[test]
    fn connect_creates_database_and_pings() {
        let root = temp_root("db-ok");
        let uri = format!("{}/", root.display());

        let db = Database::connect(&uri).expect("connect");

        assert!(db.path().exists());
        db.ping().expect("ping");
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn connect_fails_when_location_is_unusable() {
        let root = temp_root("db-bad");
        std::fs::create_dir_all(&root).unwrap();
        let blocker = root.join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let uri = format!("{}/nested/", blocker.display());

        assert!(Database::connect(&uri).is_err());
        let _ = std::fs::remove_dir_all(&root);
    }
}
