use serde::{Deserialize, Serialize};

use super::character::Character;

/// One line of narrative text within a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dialogue {
    pub text: String,
    pub wait_for_input: bool,
    pub speaker_name: String,
    pub characters: Vec<Character>,
}

impl Dialogue {
    /// An empty line that waits for the player before advancing.
    pub fn new() -> Self {
        Self {
            text: String::new(),
            wait_for_input: true,
            speaker_name: String::new(),
            characters: Vec::new(),
        }
    }

    pub fn has_character(&self, id: &str) -> bool {
        self.characters.iter().any(|c| c.id == id)
    }
}

impl Default for Dialogue {
    fn default() -> Self {
        Self::new()
    }
}

/// A single field assignment on a dialogue line. Characters are edited
/// through their own commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueField {
    Text(String),
    WaitForInput(bool),
    SpeakerName(String),
}

impl DialogueField {
    pub fn apply(self, dialogue: &mut Dialogue) {
        match self {
            Self::Text(text) => dialogue.text = text,
            Self::WaitForInput(wait) => dialogue.wait_for_input = wait,
            Self::SpeakerName(name) => dialogue.speaker_name = name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_dialogue_waits_for_input() {
        let d = Dialogue::new();
        assert!(d.wait_for_input);
        assert!(d.text.is_empty());
        assert!(d.speaker_name.is_empty());
        assert!(d.characters.is_empty());
    }

    #[test]
    fn missing_wait_for_input_defaults_true() {
        let d: Dialogue = serde_json::from_str(r#"{"text":"Hi"}"#).unwrap();
        assert_eq!(d.text, "Hi");
        assert!(d.wait_for_input);
    }

    #[test]
    fn has_character_by_id() {
        let mut d = Dialogue::new();
        d.characters.push(Character::new("char_1"));
        assert!(d.has_character("char_1"));
        assert!(!d.has_character("char_2"));
    }
}
