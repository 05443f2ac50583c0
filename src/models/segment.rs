use serde::{Deserialize, Serialize};

/// Display name and color handed to a connected participant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub color: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// A contiguous run of text typed by one author.
///
/// This is also the persisted record layout: `{text, name, color}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub name: String,
    pub color: String,
}

impl Segment {
    pub fn authored_by(identity: &Identity, text: &str) -> Self {
        Self {
            text: text.to_string(),
            name: identity.name.clone(),
            color: identity.color.clone(),
        }
    }

    /// Length in chars, which is what backspace operates on.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
