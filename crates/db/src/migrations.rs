//! Module migration ledger.
//!
//! Applied migrations are recorded per `(module, id)` in `schema_migrations`.
//! The ledger layout itself is versioned through `PRAGMA user_version`.

use rusqlite::{params, Connection, OptionalExtension};

use crate::{DbError, DbResult};

/// Version of the `schema_migrations` ledger layout.
const LEDGER_VERSION: u32 = 1;

/// Migration definition contributed by a module.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Apply every migration not yet recorded in the ledger.
///
/// All pending migrations run inside one transaction; a failing migration
/// leaves the schema untouched. Returns the number of migrations applied.
pub fn apply_migrations(conn: &mut Connection, migrations: &[(String, Migration)]) -> DbResult<usize> {
    let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if db_version > LEDGER_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: LEDGER_VERSION,
        });
    }

    let tx = conn.transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            module     TEXT    NOT NULL,
            id         TEXT    NOT NULL,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            PRIMARY KEY (module, id)
        );",
    )?;
    tx.execute_batch(&format!("PRAGMA user_version = {LEDGER_VERSION};"))?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM schema_migrations WHERE module = ?1 AND id = ?2;",
                params![module, migration.id],
                |row| row.get(0),
            )
            .optional()?;
        if already.is_some() {
            continue;
        }

        tracing::info!(
            target: "folio-db",
            module = %module,
            migration = migration.id,
            "applying migration"
        );
        tx.execute_batch(migration.up)?;
        tx.execute(
            "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2);",
            params![module, migration.id],
        )?;
        applied += 1;
    }
    tx.commit()?;

    Ok(applied)
}
