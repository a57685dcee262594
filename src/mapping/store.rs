use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use super::{MappingError, Result};
use crate::models::{EntityKind, MappingRecord};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS mappings (
        uuid TEXT PRIMARY KEY NOT NULL,
        slug TEXT NOT NULL,
        kind TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE (slug, kind)
    );
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

/// SQLite-backed mapping table behind one shared, lazily opened handle.
///
/// Every operation checks the handle first and connects when it is empty, so
/// a failed connect is retried by the next request instead of poisoning the
/// process.
#[derive(Clone)]
pub struct MappingStore {
    location: DatabaseLocation,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl MappingStore {
    pub fn new(location: DatabaseLocation) -> Self {
        Self {
            location,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    /// Returns the uuid for `(slug, kind)`, inserting a fresh one on a miss.
    ///
    /// The insert relies on the `UNIQUE (slug, kind)` constraint: a losing
    /// concurrent writer inserts nothing and reads back the winner's uuid.
    pub fn get_or_create(&self, slug: &str, kind: EntityKind) -> Result<String> {
        self.with_connection(|conn| {
            debug!("Looking up mapping for {} ({})", slug, kind);
            let candidate = Uuid::new_v4().to_string();
            let inserted = conn.execute(
                "INSERT INTO mappings (uuid, slug, kind, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (slug, kind) DO NOTHING",
                params![candidate, slug, kind.as_str(), unix_now()],
            )?;
            if inserted > 0 {
                info!("Created mapping {} for {} ({})", candidate, slug, kind);
            }
            conn.query_row(
                "SELECT uuid FROM mappings WHERE slug = ?1 AND kind = ?2",
                params![slug, kind.as_str()],
                |row| row.get(0),
            )
        })
    }

    pub fn find(&self, uuid: &str) -> Result<Option<MappingRecord>> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT uuid, slug, kind FROM mappings WHERE uuid = ?1",
                params![uuid],
                |row| {
                    let kind: String = row.get(2)?;
                    let kind = kind.parse::<EntityKind>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    Ok(MappingRecord {
                        uuid: row.get(0)?,
                        slug: row.get(1)?,
                        kind,
                    })
                },
            )
            .optional()
        })
    }

    pub fn count(&self) -> Result<usize> {
        self.with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM mappings", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .map(|n| n.max(0) as usize)
    }

    pub fn ping(&self) -> Result<()> {
        self.with_connection(|conn| conn.query_row("SELECT 1", [], |_| Ok(())))
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| MappingError::Persistence("connection lock poisoned".to_string()))?;

        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        let conn = guard
            .as_ref()
            .ok_or_else(|| MappingError::Persistence("database not connected".to_string()))?;

        f(conn).map_err(MappingError::from)
    }

    fn connect(&self) -> Result<Connection> {
        info!("Connecting to mapping database {:?}", self.location);
        let conn = match &self.location {
            DatabaseLocation::Memory => Connection::open_in_memory(),
            DatabaseLocation::File(path) => Connection::open(path),
        }?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        info!("Mapping database connected");
        Ok(conn)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
