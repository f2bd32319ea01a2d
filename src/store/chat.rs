use serde::{Deserialize, Serialize};

use super::Store;
use crate::search::{Target, TargetId, TargetKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRow {
    /// Bot API dialog id, always negative.
    pub chat_id: i64,
    pub title: String,
    pub chat_type: String,
    pub username: Option<String>,
    /// False for broadcast channels the account cannot post to.
    pub can_send: bool,
}

impl ChatRow {
    pub fn kind(&self) -> TargetKind {
        chat_kind(&self.chat_type)
    }

    pub fn to_target(&self, last_interaction: i64) -> Target {
        Target::new(
            TargetId(self.chat_id),
            self.kind(),
            self.title.clone(),
            self.username.clone(),
            last_interaction,
        )
    }
}

fn chat_kind(chat_type: &str) -> TargetKind {
    match chat_type {
        "channel" => TargetKind::Channel,
        _ => TargetKind::Group,
    }
}

impl Store {
    pub fn upsert_chat(&self, chat: &ChatRow) -> Result<(), sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO chats (chat_id, title, chat_type, username, can_send)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(chat_id) DO UPDATE SET
                title = excluded.title,
                chat_type = excluded.chat_type,
                username = excluded.username,
                can_send = excluded.can_send",
        )?;
        stmt.bind((1, chat.chat_id))?;
        stmt.bind((2, chat.title.as_str()))?;
        stmt.bind((3, chat.chat_type.as_str()))?;
        match &chat.username {
            Some(u) => stmt.bind((4, u.as_str()))?,
            None => stmt.bind((4, sqlite::Value::Null))?,
        };
        stmt.bind((5, chat.can_send as i64))?;
        stmt.next()?;
        Ok(())
    }

    pub fn get_chat(&self, chat_id: i64) -> Result<Option<ChatRow>, sqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT chat_id, title, chat_type, username, can_send
             FROM chats WHERE chat_id = ?",
        )?;
        stmt.bind((1, chat_id))?;
        if stmt.next()? == sqlite::State::Row {
            Ok(Some(read_chat_row(&stmt)?))
        } else {
            Ok(None)
        }
    }

    pub fn chat_count(&self) -> Result<i64, sqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT COUNT(*) FROM chats")?;
        stmt.next()?;
        stmt.read::<i64, _>(0)
    }
}

fn read_chat_row(stmt: &sqlite::Statement) -> Result<ChatRow, sqlite::Error> {
    Ok(ChatRow {
        chat_id: stmt.read::<i64, _>("chat_id")?,
        title: stmt.read::<String, _>("title")?,
        chat_type: stmt.read::<String, _>("chat_type")?,
        username: stmt.read::<Option<String>, _>("username")?,
        can_send: stmt.read::<i64, _>("can_send")? != 0,
    })
}
