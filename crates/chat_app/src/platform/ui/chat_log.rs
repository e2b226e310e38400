use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
}

/// Transcript of the current conversation, owned by the UI.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn push(&mut self, role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) {
        self.messages.push(ChatMessage {
            content: content.into(),
            role,
            timestamp,
        });
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn keeps_messages_in_arrival_order() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let mut log = ChatLog::default();
        log.push(Role::User, "hello", at);
        log.push(Role::Assistant, "hi there", at);

        assert_eq!(log.len(), 2);
        assert_eq!(log.last().map(|m| m.content.as_str()), Some("hi there"));

        log.clear();
        assert!(log.is_empty());
    }
}
