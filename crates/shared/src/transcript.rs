//! Ordered chat transcript for a single support session.
//!
//! The transcript is append-only: messages are never edited, reordered or
//! merged, and the only way to remove them is to clear the whole log.

use chrono::{Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
    System,
}

impl Sender {
    /// Name shown in the chat window and in generated tickets
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "AskForHelp",
            Sender::System => "System",
        }
    }
}

/// One entry in the transcript
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    /// Wall-clock time at creation (second precision)
    pub timestamp: NaiveTime,
    /// Welcome text and error notices; excluded from ticket bodies
    pub is_system: bool,
}

impl Message {
    /// `HH:MM:SS` label used by the chat view and the ticket formatter
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with the current local time.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>, is_system: bool) -> &Message {
        self.append_at(sender, text, is_system, Local::now().time())
    }

    /// Append a message with an explicit timestamp.
    pub fn append_at(
        &mut self,
        sender: Sender,
        text: impl Into<String>,
        is_system: bool,
        time: NaiveTime,
    ) -> &Message {
        // Sub-second precision never shows up in any rendering.
        let timestamp = time.with_nanosecond(0).unwrap_or(time);
        self.messages.push(Message {
            sender,
            text: text.into(),
            timestamp,
            is_system,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Drop every message. Irreversible.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages that belong in a ticket body, in transcript order
    pub fn non_system_messages(&self) -> Vec<&Message> {
        self.messages.iter().filter(|m| !m.is_system).collect()
    }

    /// Messages from one sender, in transcript order
    pub fn messages_from(&self, sender: Sender) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.sender == sender).collect()
    }

    pub fn has_user_messages(&self) -> bool {
        self.messages.iter().any(|m| m.sender == Sender::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_append_preserves_order_and_duplicates() {
        let mut t = Transcript::new();
        t.append_at(Sender::User, "same", false, at(9, 0, 0));
        t.append_at(Sender::User, "same", false, at(9, 0, 0));
        t.append_at(Sender::Assistant, "reply", false, at(9, 0, 1));

        let texts: Vec<&str> = t.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["same", "same", "reply"]);
    }

    #[test]
    fn test_append_returns_created_message() {
        let mut t = Transcript::new();
        let msg = t.append_at(Sender::Assistant, "hello\nthere", false, at(13, 5, 9));
        assert_eq!(msg.sender, Sender::Assistant);
        assert_eq!(msg.text, "hello\nthere");
        assert_eq!(msg.timestamp_label(), "13:05:09");
    }

    #[test]
    fn test_non_system_messages_is_ordered_subsequence() {
        let mut t = Transcript::new();
        t.append_at(Sender::System, "welcome", true, at(8, 0, 0));
        t.append_at(Sender::User, "a", false, at(8, 0, 1));
        t.append_at(Sender::System, "error", true, at(8, 0, 2));
        t.append_at(Sender::Assistant, "b", false, at(8, 0, 3));
        t.append_at(Sender::User, "c", false, at(8, 0, 4));

        let body: Vec<&str> = t
            .non_system_messages()
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(body, vec!["a", "b", "c"]);
        assert!(body.len() <= t.len());
    }

    #[test]
    fn test_messages_from_filters_by_sender() {
        let mut t = Transcript::new();
        t.append_at(Sender::User, "first", false, at(8, 0, 0));
        t.append_at(Sender::Assistant, "answer", false, at(8, 0, 1));
        t.append_at(Sender::User, "second", false, at(8, 0, 2));

        let users: Vec<&str> = t
            .messages_from(Sender::User)
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(users, vec!["first", "second"]);
    }

    #[test]
    fn test_clear_then_append() {
        let mut t = Transcript::new();
        t.append(Sender::User, "old", false);
        t.append(Sender::Assistant, "old reply", false);
        t.clear();

        assert!(t.non_system_messages().is_empty());
        assert!(t.is_empty());

        t.append(Sender::User, "new", false);
        assert_eq!(t.len(), 1);
        assert_eq!(t.non_system_messages()[0].text, "new");
    }

    #[test]
    fn test_timestamp_drops_subsecond_precision() {
        let mut t = Transcript::new();
        let time = NaiveTime::from_hms_milli_opt(10, 20, 30, 999).unwrap();
        let msg = t.append_at(Sender::User, "x", false, time);
        assert_eq!(msg.timestamp, at(10, 20, 30));
    }
}
