//! Hub Wire Protocol
//!
//! Tagged-JSON frames exchanged over the `/chathub` websocket. Client
//! frames are invocations; server frames are events. Unknown client
//! frame types produce an `Error` event rather than a disconnect.

use serde::{Deserialize, Serialize};

/// Frames a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientFrame {
    /// Send a chat message into a match conversation.
    SendMessage {
        match_id: String,
        content: String,
    },

    /// Signal that the sender is typing (or stopped) in a match.
    SendTypingIndicator {
        match_id: String,
        #[serde(default = "default_true")]
        is_typing: bool,
    },

    /// The sender has read all messages in the match.
    NotifyMessagesRead { match_id: String },

    /// Ask the hub to push a NewMatch event to the other participant
    /// (used right after a REST swipe created the match).
    NotifyMatch { match_id: String },

    /// Application-level heartbeat.
    Ping,
}

fn default_true() -> bool {
    true
}

/// Frames the hub pushes to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerFrame {
    /// A new chat message in one of the recipient's matches.
    ReceiveMessage(MessagePayload),

    /// The other participant's typing state changed.
    TypingIndicator {
        match_id: String,
        student_id: String,
        is_typing: bool,
    },

    /// The other participant read the conversation.
    MessagesRead {
        match_id: String,
        reader_id: String,
    },

    /// A new match involving the recipient.
    NewMatch(MatchPayload),

    /// A match was closed (unmatch, block, or ban).
    MatchClosed { match_id: String },

    /// Heartbeat response.
    Pong,

    /// A client frame was rejected.
    Error { code: String, message: String },
}

/// Chat message payload
#[derive(Debug, Clone, Serialize)]
pub struct MessagePayload {
    pub id: String,
    pub match_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<&crate::domain::Message> for MessagePayload {
    fn from(m: &crate::domain::Message) -> Self {
        Self {
            id: m.id.to_string(),
            match_id: m.match_id.to_string(),
            sender_id: m.sender_id.to_string(),
            content: m.content.clone(),
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// New match payload
#[derive(Debug, Clone, Serialize)]
pub struct MatchPayload {
    pub match_id: String,
    pub other_student_id: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_client_frame_parsing() {
        let frame: ClientFrame = serde_json::from_str(
            r#"{"type":"SendMessage","data":{"match_id":"42","content":"hey"}}"#,
        )
        .unwrap();
        match frame {
            ClientFrame::SendMessage { match_id, content } => {
                assert_eq!(match_id, "42");
                assert_eq!(content, "hey");
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_typing_indicator_defaults_to_typing() {
        let frame: ClientFrame = serde_json::from_str(
            r#"{"type":"SendTypingIndicator","data":{"match_id":"42"}}"#,
        )
        .unwrap();
        match frame {
            ClientFrame::SendTypingIndicator { is_typing, .. } => assert!(is_typing),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_ping_has_no_payload() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type":"Ping"}"#).unwrap();
        assert!(matches!(frame, ClientFrame::Ping));
    }

    #[test]
    fn test_server_frame_shape() {
        let json = serde_json::to_value(ServerFrame::MatchClosed {
            match_id: "7".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "MatchClosed");
        assert_eq!(json["data"]["match_id"], "7");
    }
}
