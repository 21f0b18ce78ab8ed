//! WASM bindings for scene-graph, letting the browser editor drive a store.
//!
//! Everything crossing the boundary is a plain string, a number or a JSON
//! document. The page re-renders from `summary()` / `current_scene()` after
//! each call, or polls `revision()`.

use wasm_bindgen::prelude::*;

use scene_graph::core::config::EditorConfig;
use scene_graph::schema::character::{CharacterField, Emotion, Position};
use scene_graph::schema::dialogue::{Dialogue, DialogueField};
use scene_graph::schema::scene::{ChoiceField, Next, SceneUpdate};
use scene_graph::SceneStore;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Deserialize)]
struct SceneUpdateInput {
    background: Option<String>,
    transition: Option<bool>,
    dialogue: Option<Vec<Dialogue>>,
    next: Option<Next>,
}

impl From<SceneUpdateInput> for SceneUpdate {
    fn from(input: SceneUpdateInput) -> Self {
        SceneUpdate {
            background: input.background,
            transition: input.transition,
            dialogue: input.dialogue,
            next: input.next,
        }
    }
}

#[derive(serde::Serialize)]
struct IssueInfo {
    message: String,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------
fn parse_flag(value: &str) -> Result<bool, JsError> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(JsError::new(&format!("Expected a boolean, got '{value}'"))),
    }
}

fn parse_character_field(field: &str, value: &str) -> Result<CharacterField, JsError> {
    match field {
        "name" => Ok(CharacterField::Name(value.to_string())),
        "emotion" => value
            .parse::<Emotion>()
            .map(CharacterField::Emotion)
            .map_err(|e| JsError::new(&e.to_string())),
        "position" => value
            .parse::<Position>()
            .map(CharacterField::Position)
            .map_err(|e| JsError::new(&e.to_string())),
        "visible" => parse_flag(value).map(CharacterField::Visible),
        "isSpeaking" => parse_flag(value).map(CharacterField::IsSpeaking),
        _ => Err(JsError::new(&format!("Unknown character field: {field}"))),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// SceneEditor: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct SceneEditor {
    store: SceneStore,
}

#[wasm_bindgen]
impl SceneEditor {
    /// Create an empty editor. `config_ron` optionally overrides defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_ron: Option<String>) -> Result<SceneEditor, JsError> {
        let config = match config_ron {
            Some(src) => EditorConfig::parse_ron(&src)
                .map_err(|e| JsError::new(&format!("Config parse error: {e}")))?,
            None => EditorConfig::default(),
        };
        Ok(SceneEditor {
            store: SceneStore::with_config(config),
        })
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn selection(&self) -> Option<String> {
        self.store.selection().map(str::to_string)
    }

    /// JSON array of flow summaries, one per scene.
    pub fn summary(&self) -> Result<String, JsError> {
        to_json(&self.store.flow_summary())
    }

    /// The selected scene as JSON, or `null`.
    pub fn current_scene(&self) -> Result<String, JsError> {
        to_json(&self.store.current_scene())
    }

    /// JSON array of integrity issues.
    pub fn issues(&self) -> Result<String, JsError> {
        let issues: Vec<IssueInfo> = self
            .store
            .validate()
            .iter()
            .map(|issue| IssueInfo {
                message: issue.to_string(),
            })
            .collect();
        to_json(&issues)
    }

    /// Add a scene; an empty or missing id is generated.
    pub fn add_scene(&mut self, id: Option<String>) -> Result<String, JsError> {
        let snap = self
            .store
            .add_scene(id.as_deref())
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(snap.selection().unwrap_or_default().to_string())
    }

    pub fn delete_scene(&mut self, id: &str) {
        self.store.delete_scene(id);
    }

    pub fn rename_scene(&mut self, id: &str, new_id: &str) -> Result<(), JsError> {
        self.store
            .rename_scene(id, new_id)
            .map(|_| ())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn select(&mut self, id: Option<String>) {
        self.store.select(id.as_deref());
    }

    /// Merge fields into a scene.
    ///
    /// Expected JSON shape (every key optional):
    /// ```json
    /// { "background": "forest", "transition": true, "next": { "scene": "end" } }
    /// ```
    pub fn update_scene(&mut self, id: &str, update_json: &str) -> Result<(), JsError> {
        let input: SceneUpdateInput = serde_json::from_str(update_json)
            .map_err(|e| JsError::new(&format!("Invalid update JSON: {e}")))?;
        self.store.update_scene(id, input.into());
        Ok(())
    }

    pub fn add_dialogue(&mut self) {
        self.store.add_dialogue();
    }

    pub fn set_dialogue_text(&mut self, index: usize, text: &str) {
        self.store
            .update_dialogue(index, DialogueField::Text(text.to_string()));
    }

    pub fn set_dialogue_speaker(&mut self, index: usize, speaker: &str) {
        self.store
            .update_dialogue(index, DialogueField::SpeakerName(speaker.to_string()));
    }

    pub fn set_dialogue_wait(&mut self, index: usize, wait: bool) {
        self.store
            .update_dialogue(index, DialogueField::WaitForInput(wait));
    }

    pub fn remove_dialogue(&mut self, index: usize) {
        self.store.remove_dialogue(index);
    }

    pub fn add_character(&mut self, dialogue_index: usize) {
        self.store.add_character(dialogue_index);
    }

    /// `field` is one of `name`, `emotion`, `position`, `visible`,
    /// `isSpeaking`; booleans are passed as "true"/"false".
    pub fn update_character(
        &mut self,
        dialogue_index: usize,
        character_index: usize,
        field: &str,
        value: &str,
    ) -> Result<(), JsError> {
        let field = parse_character_field(field, value)?;
        self.store
            .update_character(dialogue_index, character_index, field);
        Ok(())
    }

    pub fn remove_character(&mut self, dialogue_index: usize, character_index: usize) {
        self.store.remove_character(dialogue_index, character_index);
    }

    pub fn set_flow_mode(&mut self, use_choices: bool) {
        self.store.set_flow_mode(use_choices);
    }

    pub fn set_single_target(&mut self, target: &str) {
        self.store.set_single_target(target);
    }

    pub fn add_choice(&mut self) {
        self.store.add_choice();
    }

    pub fn set_choice_text(&mut self, index: usize, text: &str) {
        self.store
            .update_choice(index, ChoiceField::Text(text.to_string()));
    }

    pub fn set_choice_target(&mut self, index: usize, target: &str) {
        self.store
            .update_choice(index, ChoiceField::Target(target.to_string()));
    }

    pub fn remove_choice(&mut self, index: usize) {
        self.store.remove_choice(index);
    }

    pub fn export(&self) -> Result<String, JsError> {
        self.store
            .export()
            .map_err(|e| JsError::new(&format!("Export error: {e}")))
    }

    /// Replace the graph. The error message names the failure kind.
    pub fn import(&mut self, document: &str) -> Result<(), JsError> {
        self.store
            .import(document)
            .map(|_| ())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Return JSON array of emotion names.
    pub fn emotions() -> String {
        let names: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of position names.
    pub fn positions() -> String {
        let names: Vec<&str> = Position::ALL.iter().map(|p| p.as_str()).collect();
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    }
}
