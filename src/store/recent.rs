use super::index::{read_joined_target, TARGET_COLUMNS};
use super::Store;
use crate::search::{Target, TargetId};

/// A persisted recent or pinned share target.
#[derive(Debug, Clone)]
pub struct RecentEntry {
    pub target: Target,
    pub pinned: bool,
    pub touched_at: i64,
}

impl Store {
    /// Mark a target as used at `at`. Keeps an existing pin.
    pub fn touch_recent(&self, id: TargetId, at: i64) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO recent_targets (dialog_id, pinned, touched_at) VALUES (?, 0, ?)
             ON CONFLICT(dialog_id) DO UPDATE SET touched_at = excluded.touched_at",
        )?;
        stmt.bind((1, id.0))?;
        stmt.bind((2, at))?;
        stmt.next()?;
        Ok(())
    }

    /// Pin or unpin a target already in the recent list. No-op for unknown ids.
    pub fn set_recent_pinned(&self, id: TargetId, pinned: bool) -> Result<(), sqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("UPDATE recent_targets SET pinned = ? WHERE dialog_id = ?")?;
        stmt.bind((1, pinned as i64))?;
        stmt.bind((2, id.0))?;
        stmt.next()?;
        Ok(())
    }

    pub fn remove_recent(&self, id: TargetId) -> Result<(), sqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("DELETE FROM recent_targets WHERE dialog_id = ?")?;
        stmt.bind((1, id.0))?;
        stmt.next()?;
        Ok(())
    }

    /// Pinned entries first, then most recently touched. Entries whose peer
    /// is no longer known are skipped.
    pub fn get_recent_targets(&self) -> Result<Vec<RecentEntry>, sqlite::Error> {
        let sql = format!(
            "SELECT r.dialog_id, r.pinned, r.touched_at,
                    MAX(COALESCE(d.date, 0), r.touched_at) AS last_interaction,
                    {TARGET_COLUMNS}
             FROM recent_targets r
             LEFT JOIN dialogs d ON d.dialog_id = r.dialog_id
             LEFT JOIN users u ON u.user_id = r.dialog_id
             LEFT JOIN chats c ON c.chat_id = r.dialog_id
             ORDER BY r.pinned DESC, r.touched_at DESC, r.dialog_id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut entries = Vec::new();
        while stmt.next()? == sqlite::State::Row {
            let id = TargetId(stmt.read::<i64, _>("dialog_id")?);
            let last_interaction = stmt.read::<i64, _>("last_interaction")?;
            if let Some(target) = read_joined_target(&stmt, id, last_interaction)? {
                entries.push(RecentEntry {
                    target,
                    pinned: stmt.read::<i64, _>("pinned")? != 0,
                    touched_at: stmt.read::<i64, _>("touched_at")?,
                });
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::chat::ChatRow;
    use crate::store::user::UserRow;

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .upsert_user(&UserRow {
                user_id: 1,
                first_name: "Anna".to_string(),
                last_name: None,
                username: None,
                is_contact: true,
            })
            .unwrap();
        store
            .upsert_chat(&ChatRow {
                chat_id: -5,
                title: "Team".to_string(),
                chat_type: "group".to_string(),
                username: None,
                can_send: true,
            })
            .unwrap();
        store
    }

    fn ids(entries: &[RecentEntry]) -> Vec<i64> {
        entries.iter().map(|e| e.target.id.0).collect()
    }

    #[test]
    fn test_touch_orders_by_time() {
        let store = seeded_store();
        store.touch_recent(TargetId(1), 100).unwrap();
        store.touch_recent(TargetId(-5), 200).unwrap();
        assert_eq!(ids(&store.get_recent_targets().unwrap()), vec![-5, 1]);

        store.touch_recent(TargetId(1), 300).unwrap();
        let entries = store.get_recent_targets().unwrap();
        assert_eq!(ids(&entries), vec![1, -5]);
        assert_eq!(entries[0].touched_at, 300);
        assert_eq!(entries[0].target.last_interaction, 300);
    }

    #[test]
    fn test_pinned_first_and_survives_touch() {
        let store = seeded_store();
        store.touch_recent(TargetId(1), 100).unwrap();
        store.touch_recent(TargetId(-5), 200).unwrap();
        store.set_recent_pinned(TargetId(1), true).unwrap();
        store.touch_recent(TargetId(1), 150).unwrap();

        let entries = store.get_recent_targets().unwrap();
        assert_eq!(ids(&entries), vec![1, -5]);
        assert!(entries[0].pinned);
        assert!(!entries[1].pinned);
    }

    #[test]
    fn test_remove_and_unknown_peer() {
        let store = seeded_store();
        store.touch_recent(TargetId(1), 100).unwrap();
        store.touch_recent(TargetId(42), 500).unwrap();
        assert_eq!(ids(&store.get_recent_targets().unwrap()), vec![1]);

        store.remove_recent(TargetId(1)).unwrap();
        assert!(store.get_recent_targets().unwrap().is_empty());
    }

    #[test]
    fn test_dialog_date_wins_when_newer() {
        let store = seeded_store();
        store.touch_recent(TargetId(-5), 100).unwrap();
        store.upsert_dialog(TargetId(-5), 900).unwrap();
        let entries = store.get_recent_targets().unwrap();
        assert_eq!(entries[0].target.last_interaction, 900);
    }

    #[test]
    fn test_step_error_is_reported() {
        let store = seeded_store();
        store.touch_recent(TargetId(1), 100).unwrap();
        store
            .conn()
            .execute(
                "DROP TABLE dialogs;
                 CREATE VIEW dialogs AS
                     SELECT 1 AS dialog_id, abs(-9223372036854775807 - 1) AS date;",
            )
            .unwrap();
        assert!(store.get_recent_targets().is_err());
    }
}
