use rusqlite::Connection;

use crate::error::Result;

/// Initialise the registry schema in `conn`.
///
/// One row per irrigation zone. `start_time`/`end_time` hold `HH:MM:SS`,
/// `freq` is the firing interval in minutes and `duration` the valve-open
/// time in seconds.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS irrigation_table (
            id          INTEGER NOT NULL PRIMARY KEY,
            active      INTEGER NOT NULL DEFAULT 1,
            start_time  TEXT    NOT NULL,
            end_time    TEXT    NOT NULL,
            freq        INTEGER NOT NULL,   -- minutes between firings
            duration    INTEGER NOT NULL    -- seconds the output stays on
        );
        ",
    )?;
    Ok(())
}
