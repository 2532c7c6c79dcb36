use crate::message::{Message, MessageId};
use std::collections::HashMap;

/// Keyed table of every `Message` ever accepted into the system, addressable
/// by id for status polling. Single-writer: only `MessageHandler` calls
/// `update`; the HTTP layer only ever calls `get`/`add`.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: HashMap<MessageId, Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: Message) {
        self.messages.insert(message.id, message);
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    /// Replaces the stored message wholesale. Returns `false` if `id` was
    /// never added — callers treat that as an internal-error condition since
    /// a `Message` is always `add`ed before it can reach a handler.
    pub fn update(&mut self, message: Message) -> bool {
        match self.messages.get_mut(&message.id) {
            Some(slot) => {
                *slot = message;
                true
            }
            None => false,
        }
    }

    pub fn list_for_user(&self, user: &str) -> Vec<&Message> {
        let mut out: Vec<&Message> = self.messages.values().filter(|m| m.user == user).collect();
        out.sort_by_key(|m| m.created_at);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Asset;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn add_then_get_round_trips() {
        let mut store = MessageStore::new();
        let msg = Message::deposit(Uuid::new_v4(), "alice".into(), Asset::A, dec!(10), 1, "tx1".into(), 0);
        let id = msg.id;
        store.add(msg);
        assert!(store.get(id).is_some());
    }

    #[test]
    fn update_missing_id_returns_false() {
        let mut store = MessageStore::new();
        let msg = Message::deposit(Uuid::new_v4(), "alice".into(), Asset::A, dec!(10), 1, "tx1".into(), 0);
        assert!(!store.update(msg));
    }

    #[test]
    fn list_for_user_is_time_ordered() {
        let mut store = MessageStore::new();
        let later = Message::deposit(Uuid::new_v4(), "alice".into(), Asset::A, dec!(10), 1, "tx1".into(), 5);
        let earlier = Message::deposit(Uuid::new_v4(), "alice".into(), Asset::A, dec!(10), 1, "tx2".into(), 1);
        store.add(later);
        store.add(earlier);
        let listed = store.list_for_user("alice");
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at < listed[1].created_at);
    }
}
