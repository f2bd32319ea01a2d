use serde::{Deserialize, Serialize};

use super::Store;
use crate::search::{Target, TargetId, TargetKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub is_contact: bool,
}

impl UserRow {
    /// Read a row selected with the `users` column names.
    pub(super) fn read(stmt: &sqlite::Statement) -> Result<Self, sqlite::Error> {
        Ok(UserRow {
            user_id: stmt.read::<i64, _>("user_id")?,
            first_name: stmt.read::<String, _>("first_name")?,
            last_name: stmt.read::<Option<String>, _>("last_name")?,
            username: stmt.read::<Option<String>, _>("username")?,
            is_contact: stmt.read::<i64, _>("is_contact")? != 0,
        })
    }

    pub fn display_name(&self) -> String {
        user_display_name(&self.first_name, self.last_name.as_deref())
    }

    pub fn to_target(&self, last_interaction: i64) -> Target {
        Target::new(
            TargetId(self.user_id),
            TargetKind::User,
            self.display_name(),
            self.username.clone(),
            last_interaction,
        )
    }
}

fn user_display_name(first: &str, last: Option<&str>) -> String {
    match last.map(str::trim).filter(|l| !l.is_empty()) {
        Some(last) => format!("{} {}", first.trim(), last),
        None => first.trim().to_string(),
    }
}

impl Store {
    pub fn upsert_user(&self, user: &UserRow) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO users (user_id, first_name, last_name, username, is_contact)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                username = excluded.username,
                is_contact = excluded.is_contact",
        )?;
        stmt.bind((1, user.user_id))?;
        stmt.bind((2, user.first_name.as_str()))?;
        match &user.last_name {
            Some(l) => stmt.bind((3, l.as_str()))?,
            None => stmt.bind((3, sqlite::Value::Null))?,
        };
        match &user.username {
            Some(u) => stmt.bind((4, u.as_str()))?,
            None => stmt.bind((4, sqlite::Value::Null))?,
        };
        stmt.bind((5, user.is_contact as i64))?;
        stmt.next()?;
        Ok(())
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<UserRow>, sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, first_name, last_name, username, is_contact
             FROM users WHERE user_id = ?",
        )?;
        stmt.bind((1, user_id))?;
        if stmt.next()? == sqlite::State::Row {
            Ok(Some(UserRow::read(&stmt)?))
        } else {
            Ok(None)
        }
    }

    pub fn user_count(&self) -> Result<i64, sqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT COUNT(*) FROM users")?;
        stmt.next()?;
        stmt.read::<i64, _>(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(id: i64) -> UserRow {
        UserRow {
            user_id: id,
            first_name: "Alice".to_string(),
            last_name: Some("Smith".to_string()),
            username: Some(format!("alice_{}", id)),
            is_contact: true,
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_user(&sample_user(7)).unwrap();

        let fetched = store.get_user(7).unwrap().unwrap();
        assert_eq!(fetched.display_name(), "Alice Smith");
        assert_eq!(fetched.username.as_deref(), Some("alice_7"));
        assert!(fetched.is_contact);
        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_updates_existing() {
        let store = Store::open_in_memory().unwrap();
        let mut user = sample_user(7);
        store.upsert_user(&user).unwrap();
        user.last_name = None;
        user.is_contact = false;
        store.upsert_user(&user).unwrap();

        let fetched = store.get_user(7).unwrap().unwrap();
        assert_eq!(fetched.display_name(), "Alice");
        assert!(!fetched.is_contact);
        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[test]
    fn test_user_ids_must_be_positive() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.upsert_user(&sample_user(-5)).is_err());
    }

    #[test]
    fn test_to_target() {
        let target = sample_user(7).to_target(42);
        assert_eq!(target.id, TargetId(7));
        assert_eq!(target.kind, TargetKind::User);
        assert_eq!(target.display_name, "Alice Smith");
        assert_eq!(target.last_interaction, 42);
    }

    #[test]
    fn test_display_name_ignores_blank_last_name() {
        assert_eq!(user_display_name(" Bob ", Some("  ")), "Bob");
        assert_eq!(user_display_name("Bob", Some("Lee")), "Bob Lee");
    }
}
