use serde::{Deserialize, Serialize};
use crate::models::{Identity, Segment};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppendMessage {
    pub text: String,
}

/// Frames a client may send. Anything that does not decode into one of
/// these variants is dropped by the session pump.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "append")]
    Append(AppendMessage),
    #[serde(rename = "backspace")]
    Backspace,
    #[serde(rename = "clear")]
    Clear,
}

impl ClientMessage {
    /// Lenient decode: `None` for non-JSON, unknown `type` tags and
    /// structurally unexpected payloads.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InitMessage {
    pub segments: Vec<Segment>,
    pub you: Identity,
    pub users: Vec<Identity>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SegmentsMessage {
    pub segments: Vec<Segment>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UsersMessage {
    pub users: Vec<Identity>,
}

/// Frames the coordinator sends to clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init(InitMessage),
    #[serde(rename = "segments")]
    Segments(SegmentsMessage),
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "users")]
    Users(UsersMessage),
}

impl ServerMessage {
    pub fn segments(segments: Vec<Segment>) -> Self {
        ServerMessage::Segments(SegmentsMessage { segments })
    }

    pub fn users(users: Vec<Identity>) -> Self {
        ServerMessage::Users(UsersMessage { users })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_intents() {
        assert_eq!(
            ClientMessage::parse(r#"{"type":"append","text":"h"}"#),
            Some(ClientMessage::Append(AppendMessage { text: "h".into() }))
        );
        assert_eq!(ClientMessage::parse(r#"{"type":"backspace"}"#), Some(ClientMessage::Backspace));
        assert_eq!(ClientMessage::parse(r#"{"type":"clear"}"#), Some(ClientMessage::Clear));
    }

    #[test]
    fn ignores_unknown_and_malformed_frames() {
        assert_eq!(ClientMessage::parse("not json"), None);
        assert_eq!(ClientMessage::parse(r#"{"type":"rename","name":"x"}"#), None);
        assert_eq!(ClientMessage::parse(r#"{"type":"append"}"#), None);
        assert_eq!(ClientMessage::parse(r#"{"text":"a"}"#), None);
        assert_eq!(ClientMessage::parse("[]"), None);
    }

    #[test]
    fn server_frames_use_type_tag() {
        let steve = Identity::new("Steve", "#ff6b6b");
        let init = ServerMessage::Init(InitMessage {
            segments: vec![Segment::authored_by(&steve, "hi")],
            you: steve.clone(),
            users: vec![steve.clone()],
        });
        assert_eq!(
            serde_json::to_value(&init).unwrap(),
            json!({
                "type": "init",
                "segments": [{"text": "hi", "name": "Steve", "color": "#ff6b6b"}],
                "you": {"name": "Steve", "color": "#ff6b6b"},
                "users": [{"name": "Steve", "color": "#ff6b6b"}],
            })
        );
        assert_eq!(serde_json::to_value(ServerMessage::Clear).unwrap(), json!({"type": "clear"}));
    }
}
