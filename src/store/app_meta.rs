use super::Store;

/// Key/value settings persisted beside the index (see `config`).
impl Store {
    pub fn get_meta(&self, key: &str) -> Result<Option<String>, sqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM app_meta WHERE key = :key")?;
        stmt.bind((":key", key))?;
        match stmt.next()? {
            sqlite::State::Row => Ok(Some(stmt.read::<String, _>("value")?)),
            sqlite::State::Done => Ok(None),
        }
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO app_meta (key, value) VALUES (:key, :value)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )?;
        stmt.bind((":key", key))?;
        stmt.bind((":value", value))?;
        stmt.next()?;
        Ok(())
    }

    pub fn delete_meta(&self, key: &str) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare("DELETE FROM app_meta WHERE key = :key")?;
        stmt.bind((":key", key))?;
        stmt.next()?;
        Ok(())
    }
}
