use super::Store;
use crate::search::TargetId;

impl Store {
    /// Record the last activity in a dialog (unix seconds).
    pub fn upsert_dialog(&self, id: TargetId, date: i64) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO dialogs (dialog_id, date) VALUES (?, ?)
             ON CONFLICT(dialog_id) DO UPDATE SET date = excluded.date",
        )?;
        stmt.bind((1, id.0))?;
        stmt.bind((2, date))?;
        stmt.next()?;
        Ok(())
    }

    pub fn dialog_date(&self, id: TargetId) -> Result<Option<i64>, sqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT date FROM dialogs WHERE dialog_id = ?")?;
        stmt.bind((1, id.0))?;
        if stmt.next()? == sqlite::State::Row {
            Ok(Some(stmt.read::<i64, _>(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn dialog_count(&self) -> Result<i64, sqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT COUNT(*) FROM dialogs")?;
        stmt.next()?;
        stmt.read::<i64, _>(0)
    }
}
