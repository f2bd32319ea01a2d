use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::chat::ChatRow;
use super::user::UserRow;
use super::Store;
use crate::search::local::{LocalIndex, LocalIndexError};
use crate::search::matcher::match_kind;
use crate::search::{Target, TargetId};

/// Column list shared by queries that resolve a dialog id to a user or chat.
/// Expects `users u` and `chats c` to be LEFT JOINed on the id.
pub(super) const TARGET_COLUMNS: &str = "u.first_name, u.last_name,
     u.username AS user_username, u.is_contact,
     c.title, c.chat_type, c.username AS chat_username, c.can_send";

/// Build a target from a joined row. None when the id resolves to neither a
/// known user nor a known chat.
pub(super) fn read_joined_target(
    stmt: &sqlite::Statement,
    id: TargetId,
    last_interaction: i64,
) -> Result<Option<Target>, sqlite::Error> {
    if id.is_user() {
        let Some(first_name) = stmt.read::<Option<String>, _>("first_name")? else {
            return Ok(None);
        };
        let user = UserRow {
            user_id: id.0,
            first_name,
            last_name: stmt.read::<Option<String>, _>("last_name")?,
            username: stmt.read::<Option<String>, _>("user_username")?,
            is_contact: stmt.read::<Option<i64>, _>("is_contact")? == Some(1),
        };
        return Ok(Some(user.to_target(last_interaction)));
    }

    let Some(title) = stmt.read::<Option<String>, _>("title")? else {
        return Ok(None);
    };
    let chat = ChatRow {
        chat_id: id.0,
        title,
        chat_type: stmt.read::<Option<String>, _>("chat_type")?.unwrap_or_default(),
        username: stmt.read::<Option<String>, _>("chat_username")?,
        can_send: stmt.read::<Option<i64>, _>("can_send")? != Some(0),
    };
    Ok(Some(chat.to_target(last_interaction)))
}

impl Store {
    /// Candidate targets for local matching: the `scan_limit` most recent
    /// dialogs, then contacts that fell outside the scan. Chats the account
    /// cannot post to are skipped.
    pub fn candidates(&self, scan_limit: usize) -> Result<Vec<Target>, sqlite::Error> {
        let sql = format!(
            "SELECT d.dialog_id, d.date, {TARGET_COLUMNS}
             FROM dialogs d
             LEFT JOIN users u ON u.user_id = d.dialog_id
             LEFT JOIN chats c ON c.chat_id = d.dialog_id
             ORDER BY d.date DESC, d.dialog_id ASC
             LIMIT ?"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.bind((1, scan_limit as i64))?;

        let mut targets = Vec::new();
        let mut seen = HashSet::new();
        while stmt.next()? == sqlite::State::Row {
            let id = TargetId(stmt.read::<i64, _>("dialog_id")?);
            let date = stmt.read::<i64, _>("date")?;
            if id.is_chat() && stmt.read::<Option<i64>, _>("can_send")? == Some(0) {
                continue;
            }
            if let Some(target) = read_joined_target(&stmt, id, date)? {
                seen.insert(id);
                targets.push(target);
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT u.user_id, u.first_name, u.last_name, u.username, u.is_contact,
                    COALESCE(d.date, 0) AS date
             FROM users u
             LEFT JOIN dialogs d ON d.dialog_id = u.user_id
             WHERE u.is_contact = 1
             ORDER BY u.user_id",
        )?;
        while stmt.next()? == sqlite::State::Row {
            let contact = UserRow::read(&stmt)?;
            if seen.contains(&TargetId(contact.user_id)) {
                continue;
            }
            targets.push(contact.to_target(stmt.read::<i64, _>("date")?));
        }

        Ok(targets)
    }

    /// Look up a single known user or chat by dialog id.
    pub fn resolve_target(&self, id: TargetId) -> Result<Option<Target>, sqlite::Error> {
        let last_interaction = self.dialog_date(id)?.unwrap_or(0);
        if id.is_user() {
            Ok(self.get_user(id.0)?.map(|u| u.to_target(last_interaction)))
        } else {
            Ok(self.get_chat(id.0)?.map(|c| c.to_target(last_interaction)))
        }
    }
}

/// [`LocalIndex`] over the sqlite store. The connection is not `Sync`, so
/// the store sits behind a mutex shared with whoever writes to it.
pub struct StoreIndex {
    store: Arc<Mutex<Store>>,
    scan_limit: usize,
}

impl StoreIndex {
    pub fn new(store: Arc<Mutex<Store>>, scan_limit: usize) -> Self {
        Self { store, scan_limit }
    }
}

impl LocalIndex for StoreIndex {
    fn match_targets(&self, tokens: &[String]) -> Result<Vec<Target>, LocalIndexError> {
        let candidates = {
            let store = self
                .store
                .lock()
                .map_err(|_| LocalIndexError::Unavailable("store lock poisoned".into()))?;
            store.candidates(self.scan_limit)?
        };
        log::trace!("local index scanned {} candidates", candidates.len());
        Ok(candidates
            .into_iter()
            .filter(|t| match_kind(t, tokens).is_some())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::TargetKind;
    use crate::search::matcher::query_tokens;
    use crate::store::chat::ChatRow;
    use crate::store::user::UserRow;

    fn user(id: i64, first: &str, last: Option<&str>, username: Option<&str>, contact: bool) -> UserRow {
        UserRow {
            user_id: id,
            first_name: first.to_string(),
            last_name: last.map(String::from),
            username: username.map(String::from),
            is_contact: contact,
        }
    }

    fn chat(id: i64, title: &str, chat_type: &str, can_send: bool) -> ChatRow {
        ChatRow {
            chat_id: id,
            title: title.to_string(),
            chat_type: chat_type.to_string(),
            username: None,
            can_send,
        }
    }

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.upsert_user(&user(1, "Ivan", Some("Petrov"), Some("ivanp"), false)).unwrap();
        store.upsert_user(&user(2, "Anna", None, None, true)).unwrap();
        store.upsert_user(&user(3, "Иван", None, None, true)).unwrap();
        store.upsert_chat(&chat(-10, "Rust Devs", "supergroup", true)).unwrap();
        store.upsert_chat(&chat(-20, "News", "channel", false)).unwrap();

        store.upsert_dialog(TargetId(1), 300).unwrap();
        store.upsert_dialog(TargetId(-10), 200).unwrap();
        store.upsert_dialog(TargetId(-20), 400).unwrap();
        // Dialog with an unknown peer
        store.upsert_dialog(TargetId(99), 500).unwrap();
        store
    }

    fn ids(targets: &[Target]) -> Vec<i64> {
        targets.iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn test_candidates_order_and_filtering() {
        let store = seeded_store();
        let targets = store.candidates(100).unwrap();
        // Dialogs by date, unknown peer and read-only channel skipped,
        // then contacts without a dialog.
        assert_eq!(ids(&targets), vec![1, -10, 2, 3]);
        assert_eq!(targets[0].display_name, "Ivan Petrov");
        assert_eq!(targets[0].last_interaction, 300);
        assert_eq!(targets[1].kind, TargetKind::Group);
        assert_eq!(targets[2].last_interaction, 0);
    }

    #[test]
    fn test_candidates_scan_limit() {
        let store = seeded_store();
        // Only the unknown peer and the channel fall in the scan window
        let targets = store.candidates(2).unwrap();
        assert_eq!(ids(&targets), vec![2, 3]);
    }

    #[test]
    fn test_contact_with_dialog_keeps_date() {
        let store = seeded_store();
        store.upsert_dialog(TargetId(2), 50).unwrap();
        let targets = store.candidates(2).unwrap();
        let anna = targets.iter().find(|t| t.id == TargetId(2)).unwrap();
        assert_eq!(anna.last_interaction, 50);
    }

    #[test]
    fn test_resolve_target() {
        let store = seeded_store();
        let ivan = store.resolve_target(TargetId(1)).unwrap().unwrap();
        assert_eq!(ivan.display_name, "Ivan Petrov");
        assert_eq!(ivan.last_interaction, 300);

        let news = store.resolve_target(TargetId(-20)).unwrap().unwrap();
        assert_eq!(news.kind, TargetKind::Channel);

        assert!(store.resolve_target(TargetId(99)).unwrap().is_none());
    }

    #[test]
    fn test_store_index_matches() {
        let index = StoreIndex::new(Arc::new(Mutex::new(seeded_store())), 100);

        let found = index.match_targets(&query_tokens("ivan")).unwrap();
        let mut found = ids(&found);
        found.sort();
        assert_eq!(found, vec![1, 3]);

        let found = index.match_targets(&query_tokens("rust")).unwrap();
        assert_eq!(ids(&found), vec![-10]);

        assert!(index.match_targets(&query_tokens("news")).unwrap().is_empty());
    }

    #[test]
    fn test_step_error_is_not_a_short_list() {
        let store = seeded_store();
        // abs() of the smallest integer fails while stepping, not at prepare
        store
            .conn()
            .execute(
                "DROP TABLE dialogs;
                 CREATE VIEW dialogs AS
                     SELECT 1 AS dialog_id, abs(-9223372036854775807 - 1) AS date;",
            )
            .unwrap();
        assert!(store.candidates(10).is_err());

        let index = StoreIndex::new(Arc::new(Mutex::new(store)), 10);
        assert!(matches!(
            index.match_targets(&query_tokens("ivan")),
            Err(LocalIndexError::Store(_))
        ));
    }
}
