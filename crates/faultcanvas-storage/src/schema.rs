use super::*;

const SCHEMA_VERSION: u32 = 1;

const TABLE_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tree_graph (
        tree_id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        document TEXT NOT NULL
    )",
];

pub(super) fn init(conn: &Connection) -> Result<(), StorageError> {
    for statement in TABLE_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let stored_version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if stored_version > SCHEMA_VERSION {
        return Err(StorageError::Other(format!(
            "Unsupported database schema version: {stored_version} (max supported: {SCHEMA_VERSION})"
        )));
    }
    if stored_version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(())
}
