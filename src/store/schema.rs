use sqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), sqlite::Error> {
    conn.execute(
        "
        CREATE TABLE IF NOT EXISTS users (
            user_id       INTEGER PRIMARY KEY CHECK (user_id > 0),
            first_name    TEXT NOT NULL,
            last_name     TEXT,
            username      TEXT,
            is_contact    INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS chats (
            chat_id       INTEGER PRIMARY KEY CHECK (chat_id < 0),
            title         TEXT NOT NULL,
            chat_type     TEXT NOT NULL CHECK (chat_type IN ('group', 'supergroup', 'channel')),
            username      TEXT,
            can_send      INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS dialogs (
            dialog_id     INTEGER PRIMARY KEY,
            date          INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_dialogs_date
            ON dialogs (date DESC);

        CREATE TABLE IF NOT EXISTS recent_targets (
            dialog_id     INTEGER PRIMARY KEY,
            pinned        INTEGER NOT NULL DEFAULT 0,
            touched_at    INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}
