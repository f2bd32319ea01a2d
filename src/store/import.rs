use serde::{Deserialize, Serialize};

use super::chat::ChatRow;
use super::user::UserRow;
use super::Store;
use crate::search::TargetId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogRow {
    pub dialog_id: i64,
    pub date: i64,
}

/// Users, chats and dialog dates as exported by a sync client.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreDump {
    pub users: Vec<UserRow>,
    pub chats: Vec<ChatRow>,
    pub dialogs: Vec<DialogRow>,
}

impl Store {
    /// Upsert every row of `dump` in one transaction. Nothing is written if
    /// any row is rejected.
    pub fn import(&self, dump: &StoreDump) -> Result<(), sqlite::Error> {
        self.conn.execute("BEGIN")?;
        match self.import_rows(dump) {
            Ok(()) => self.conn.execute("COMMIT"),
            Err(e) => {
                if let Err(rollback) = self.conn.execute("ROLLBACK") {
                    log::warn!("rollback after failed import: {}", rollback);
                }
                Err(e)
            }
        }
    }

    fn import_rows(&self, dump: &StoreDump) -> Result<(), sqlite::Error> {
        for user in &dump.users {
            self.upsert_user(user)?;
        }
        for chat in &dump.chats {
            self.upsert_chat(chat)?;
        }
        for dialog in &dump.dialogs {
            self.upsert_dialog(TargetId(dialog.dialog_id), dialog.date)?;
        }
        log::info!(
            "imported {} users, {} chats, {} dialogs",
            dump.users.len(),
            dump.chats.len(),
            dump.dialogs.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_json_dump() {
        let store = Store::open_in_memory().unwrap();
        let dump: StoreDump = serde_json::from_str(
            r#"{
                "users": [{"user_id": 1, "first_name": "Ivan", "last_name": null,
                           "username": "ivan", "is_contact": true}],
                "chats": [{"chat_id": -5, "title": "Team", "chat_type": "group",
                           "username": null, "can_send": true}],
                "dialogs": [{"dialog_id": 1, "date": 100}, {"dialog_id": -5, "date": 50}]
            }"#,
        )
        .unwrap();
        store.import(&dump).unwrap();

        assert_eq!(store.user_count().unwrap(), 1);
        assert_eq!(store.chat_count().unwrap(), 1);
        let ids: Vec<i64> = store.candidates(10).unwrap().iter().map(|t| t.id.0).collect();
        assert_eq!(ids, vec![1, -5]);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let dump: StoreDump = serde_json::from_str(r#"{"dialogs": []}"#).unwrap();
        assert!(dump.users.is_empty() && dump.chats.is_empty());
    }

    #[test]
    fn test_rejected_row_rolls_back() {
        let store = Store::open_in_memory().unwrap();
        let dump = StoreDump {
            users: vec![UserRow {
                user_id: 1,
                first_name: "Ivan".to_string(),
                last_name: None,
                username: None,
                is_contact: false,
            }],
            // Chat ids must be negative
            chats: vec![ChatRow {
                chat_id: 5,
                title: "Bad".to_string(),
                chat_type: "group".to_string(),
                username: None,
                can_send: true,
            }],
            dialogs: vec![],
        };
        assert!(store.import(&dump).is_err());
        assert_eq!(store.user_count().unwrap(), 0);
    }
}
