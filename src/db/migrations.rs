use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS prayer_times_cache (
            source_key  TEXT NOT NULL,
            date        TEXT NOT NULL,
            fajr        TEXT NOT NULL,
            sunrise     TEXT NOT NULL,
            dhuhr       TEXT NOT NULL,
            asr         TEXT NOT NULL,
            maghrib     TEXT NOT NULL,
            isha        TEXT NOT NULL,
            origin      TEXT NOT NULL DEFAULT 'calculated'
                        CHECK(origin IN ('calculated','aladhan','service')),
            stored_at   TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (source_key, date)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('prayer_times_cache', 'app_meta')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
