//! Cache table layout, stamped into `PRAGMA user_version`.

use tokio_rusqlite::Connection;

use crate::Error;

/// Layout version written by this build.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = include_str!("schema.sql");

/// Create the cache table if the file predates it.
///
/// A file stamped with a newer version than [`SCHEMA_VERSION`] is refused
/// rather than written with a layout it may not have.
pub async fn ensure(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let found: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        if found > SCHEMA_VERSION {
            return Err(Error::MigrationFailed(format!(
                "cache file has schema version {found}, this build supports up to {SCHEMA_VERSION}"
            )));
        }
        if found < SCHEMA_VERSION {
            let tx = conn.transaction()?;
            tx.execute_batch(SCHEMA)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            tracing::debug!(from = found, to = SCHEMA_VERSION, "cache schema created");
        }
        Ok(())
    })
    .await
    .map_err(Error::from)
}
