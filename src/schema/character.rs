use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Facial expression a character sprite is shown with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Despair,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Self::Neutral,
        Self::Happy,
        Self::Sad,
        Self::Angry,
        Self::Despair,
    ];

    /// Wire name: "neutral", "happy", ...
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Despair => "despair",
        }
    }
}

/// Horizontal slot a character occupies on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Center,
    Left,
    Right,
}

impl Position {
    pub const ALL: [Position; 3] = [Self::Center, Self::Left, Self::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Returned when a text front-end names an emotion or position that does
/// not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant '{0}'")]
pub struct UnknownVariant(pub String);

impl FromStr for Emotion {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == lower)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl FromStr for Position {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// An on-screen presence attached to a dialogue line.
///
/// `id` is assigned once when the character is added and is the stable key
/// used to remove it later; it is never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    pub emotion: Emotion,
    pub position: Position,
    pub visible: bool,
    pub is_speaking: bool,
}

impl Character {
    /// A visible, silent, centered character with a neutral face.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            emotion: Emotion::Neutral,
            position: Position::Center,
            visible: true,
            is_speaking: false,
        }
    }
}

impl Default for Character {
    fn default() -> Self {
        Self::new("")
    }
}

/// A single field assignment on a character. The id is not editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterField {
    Name(String),
    Emotion(Emotion),
    Position(Position),
    Visible(bool),
    IsSpeaking(bool),
}

impl CharacterField {
    pub fn apply(self, character: &mut Character) {
        match self {
            Self::Name(name) => character.name = name,
            Self::Emotion(emotion) => character.emotion = emotion,
            Self::Position(position) => character.position = position,
            Self::Visible(visible) => character.visible = visible,
            Self::IsSpeaking(speaking) => character.is_speaking = speaking,
        }
    }
}
