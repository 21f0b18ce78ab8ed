//! The scene graph store: owns the current snapshot and selection, applies
//! editing commands and publishes each resulting snapshot to observers.
//!
//! Commands never mutate a published snapshot. Each one works on a copy and,
//! if anything changed, swaps the copy in as the new current snapshot. A
//! rejected command or a no-op leaves the previous `Arc` in place.

use std::sync::Arc;
use thiserror::Error;

use crate::core::codec::{self, CodecError};
use crate::core::config::{EditorConfig, ImportPolicy};
use crate::core::ids::{IdError, IdPolicy};
use crate::core::integrity::{self, Issue};
use crate::core::summary::SceneSummary;
use crate::schema::character::{Character, CharacterField};
use crate::schema::dialogue::{Dialogue, DialogueField};
use crate::schema::scene::{Choice, ChoiceField, Next, Scene, SceneUpdate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("id error: {0}")]
    Id(#[from] IdError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("imported graph has {} integrity issue(s)", .0.len())]
    Invalid(Vec<Issue>),
}

impl StoreError {
    pub fn is_duplicate_id(&self) -> bool {
        matches!(self, Self::Id(IdError::Duplicate(_)))
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Codec(CodecError::Parse(_)))
    }

    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Codec(CodecError::Format(_)))
    }
}

/// An immutable view of the whole graph plus the current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSnapshot {
    scenes: Vec<Scene>,
    selection: Option<String>,
}

impl GraphSnapshot {
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.selection.as_deref().and_then(|id| self.scene(id))
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    fn scene_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.id == id)
    }
}

/// Handle returned by [`SceneStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&GraphSnapshot, u64)>;

/// Owner of the scene graph. Commands are applied one at a time through
/// `&mut self`; a concurrent host must funnel them through a single writer.
pub struct SceneStore {
    current: Arc<GraphSnapshot>,
    revision: u64,
    config: EditorConfig,
    ids: IdPolicy,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let ids = IdPolicy::new(
            config.scene_id_prefix.clone(),
            config.character_id_prefix.clone(),
        );
        Self {
            current: Arc::new(GraphSnapshot::default()),
            revision: 0,
            config,
            ids,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        Arc::clone(&self.current)
    }

    pub fn scenes(&self) -> &[Scene] {
        self.current.scenes()
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.current.scene(id)
    }

    pub fn selection(&self) -> Option<&str> {
        self.current.selection()
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.current.current_scene()
    }

    /// Number of snapshots published so far. Pollers can compare it against
    /// the last value they saw.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn flow_summary(&self) -> Vec<SceneSummary> {
        let selected = self.current.selection();
        self.current
            .scenes()
            .iter()
            .map(|s| SceneSummary::of(s, Some(s.id.as_str()) == selected, self.config.preview_len))
            .collect()
    }

    pub fn validate(&self) -> Vec<Issue> {
        integrity::inspect(self.current.scenes())
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register `observer` to be called with every newly published snapshot
    /// and its revision.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&GraphSnapshot, u64) + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    // ------------------------------------------------------------------
    // Scene commands
    // ------------------------------------------------------------------

    /// Append an empty scene and select it. Without an explicit id (or with
    /// an empty one) an id is generated.
    pub fn add_scene(&mut self, id: Option<&str>) -> Result<Arc<GraphSnapshot>, StoreError> {
        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.ids.generate_scene_id(self.current.scenes()),
        };
        if let Err(e) = IdPolicy::validate_unique(&id, self.current.scenes()) {
            log::warn!("add_scene rejected: {}", e);
            return Err(e.into());
        }

        let mut next = (*self.current).clone();
        next.scenes.push(Scene::new(id.clone()));
        next.selection = Some(id);
        Ok(self.commit(next, "add_scene"))
    }

    /// Remove every scene with `id` and clear all references to it. If it was
    /// selected, the first remaining scene becomes the selection.
    pub fn delete_scene(&mut self, id: &str) -> Arc<GraphSnapshot> {
        if self.current.scene(id).is_none() {
            return self.unchanged("delete_scene");
        }

        let mut next = (*self.current).clone();
        next.scenes.retain(|s| s.id != id);
        let cleared = integrity::clear_references(&mut next.scenes, id);
        log::debug!("delete_scene '{}': cleared {} reference(s)", id, cleared);

        if next.selection.as_deref() == Some(id) {
            next.selection = next.scenes.first().map(|s| s.id.clone());
        }
        self.commit(next, "delete_scene")
    }

    /// Merge `update` into the scene with `id`. No-op if there is none.
    pub fn update_scene(&mut self, id: &str, update: SceneUpdate) -> Arc<GraphSnapshot> {
        let mut next = (*self.current).clone();
        match next.scene_mut(id) {
            Some(scene) => update.apply(scene),
            None => return self.unchanged("update_scene"),
        }
        self.commit(next, "update_scene")
    }

    /// Give a scene a new id and point every reference at the new id.
    pub fn rename_scene(&mut self, id: &str, new_id: &str) -> Result<Arc<GraphSnapshot>, StoreError> {
        if id == new_id || self.current.scene(id).is_none() {
            return Ok(self.unchanged("rename_scene"));
        }
        if let Err(e) = IdPolicy::validate_unique(new_id, self.current.scenes()) {
            log::warn!("rename_scene rejected: {}", e);
            return Err(e.into());
        }

        let mut next = (*self.current).clone();
        if let Some(scene) = next.scene_mut(id) {
            scene.id = new_id.to_string();
        }
        integrity::retarget_references(&mut next.scenes, id, new_id);
        if next.selection.as_deref() == Some(id) {
            next.selection = Some(new_id.to_string());
        }
        Ok(self.commit(next, "rename_scene"))
    }

    /// Select a scene, or clear the selection with `None`. Selecting an id
    /// that does not exist is a no-op.
    pub fn select(&mut self, id: Option<&str>) -> Arc<GraphSnapshot> {
        if let Some(id) = id {
            if self.current.scene(id).is_none() {
                return self.unchanged("select");
            }
        }
        let mut next = (*self.current).clone();
        next.selection = id.map(str::to_string);
        self.commit(next, "select")
    }

    // ------------------------------------------------------------------
    // Dialogue commands (current selection)
    // ------------------------------------------------------------------

    pub fn add_dialogue(&mut self) -> Arc<GraphSnapshot> {
        self.edit_current("add_dialogue", |scene| {
            scene.dialogue.push(Dialogue::new());
        })
    }

    pub fn update_dialogue(&mut self, index: usize, field: DialogueField) -> Arc<GraphSnapshot> {
        self.edit_current("update_dialogue", |scene| {
            if let Some(dialogue) = scene.dialogue.get_mut(index) {
                field.apply(dialogue);
            }
        })
    }

    pub fn remove_dialogue(&mut self, index: usize) -> Arc<GraphSnapshot> {
        self.edit_current("remove_dialogue", |scene| {
            if index < scene.dialogue.len() {
                scene.dialogue.remove(index);
            }
        })
    }

    // ------------------------------------------------------------------
    // Character commands (current selection)
    // ------------------------------------------------------------------

    /// Append a default character with a fresh id to a dialogue line.
    pub fn add_character(&mut self, dialogue_index: usize) -> Arc<GraphSnapshot> {
        let exists = self
            .current
            .current_scene()
            .is_some_and(|s| dialogue_index < s.dialogue.len());
        if !exists {
            return self.unchanged("add_character");
        }

        let Some(id) = self.ids.next_character_id() else {
            log::warn!("add_character rejected: character id sequence exhausted");
            return self.unchanged("add_character");
        };
        self.edit_current("add_character", |scene| {
            if let Some(dialogue) = scene.dialogue.get_mut(dialogue_index) {
                dialogue.characters.push(Character::new(id));
            }
        })
    }

    pub fn update_character(
        &mut self,
        dialogue_index: usize,
        character_index: usize,
        field: CharacterField,
    ) -> Arc<GraphSnapshot> {
        self.edit_current("update_character", |scene| {
            if let Some(character) = scene
                .dialogue
                .get_mut(dialogue_index)
                .and_then(|d| d.characters.get_mut(character_index))
            {
                field.apply(character);
            }
        })
    }

    pub fn remove_character(
        &mut self,
        dialogue_index: usize,
        character_index: usize,
    ) -> Arc<GraphSnapshot> {
        self.edit_current("remove_character", |scene| {
            if let Some(dialogue) = scene.dialogue.get_mut(dialogue_index) {
                if character_index < dialogue.characters.len() {
                    dialogue.characters.remove(character_index);
                }
            }
        })
    }

    pub fn remove_character_by_id(
        &mut self,
        dialogue_index: usize,
        character_id: &str,
    ) -> Arc<GraphSnapshot> {
        self.edit_current("remove_character_by_id", |scene| {
            if let Some(dialogue) = scene.dialogue.get_mut(dialogue_index) {
                dialogue.characters.retain(|c| c.id != character_id);
            }
        })
    }

    // ------------------------------------------------------------------
    // Flow commands (current selection)
    // ------------------------------------------------------------------

    /// Switch between a single continuation and choices. Either direction
    /// discards whatever the previous continuation held.
    pub fn set_flow_mode(&mut self, use_choices: bool) -> Arc<GraphSnapshot> {
        self.edit_current("set_flow_mode", |scene| {
            scene.next = if use_choices {
                Next::one_empty_choice()
            } else {
                Next::unset()
            };
        })
    }

    /// Append an empty choice, entering choice mode if needed.
    pub fn add_choice(&mut self) -> Arc<GraphSnapshot> {
        self.edit_current("add_choice", |scene| {
            if let Next::Choices(choices) = &mut scene.next {
                choices.push(Choice::empty());
            } else {
                scene.next = Next::one_empty_choice();
            }
        })
    }

    pub fn update_choice(&mut self, index: usize, field: ChoiceField) -> Arc<GraphSnapshot> {
        self.edit_current("update_choice", |scene| {
            if let Next::Choices(choices) = &mut scene.next {
                if let Some(choice) = choices.get_mut(index) {
                    field.apply(choice);
                }
            }
        })
    }

    /// Remove a choice. Removing the last one returns the scene to an unset
    /// single continuation.
    pub fn remove_choice(&mut self, index: usize) -> Arc<GraphSnapshot> {
        self.edit_current("remove_choice", |scene| {
            if let Next::Choices(choices) = &mut scene.next {
                if index < choices.len() {
                    choices.remove(index);
                    if choices.is_empty() {
                        scene.next = Next::unset();
                    }
                }
            }
        })
    }

    pub fn set_single_target(&mut self, target: &str) -> Arc<GraphSnapshot> {
        self.edit_current("set_single_target", |scene| {
            scene.next = Next::single(target);
        })
    }

    // ------------------------------------------------------------------
    // Import / export
    // ------------------------------------------------------------------

    pub fn export(&self) -> Result<String, StoreError> {
        let text = codec::export(self.current.scenes(), self.config.export_indent)?;
        log::info!("Exported {} scene(s)", self.current.len());
        Ok(text)
    }

    /// Replace the whole graph with the scenes in `input`. On error the
    /// current graph is left untouched.
    pub fn import(&mut self, input: &str) -> Result<Arc<GraphSnapshot>, StoreError> {
        let scenes = codec::import(input).map_err(|e| {
            log::warn!("import rejected: {}", e);
            e
        })?;

        let issues = integrity::inspect(&scenes);
        if !issues.is_empty() {
            match self.config.import_policy {
                ImportPolicy::Strict => {
                    log::warn!("import rejected: {} integrity issue(s)", issues.len());
                    return Err(StoreError::Invalid(issues));
                }
                ImportPolicy::Permissive => {
                    log::warn!("importing graph with {} integrity issue(s)", issues.len());
                }
            }
        }

        self.ids.observe_characters(&scenes);
        let selection = scenes.first().map(|s| s.id.clone());
        log::info!("Imported {} scene(s)", scenes.len());
        Ok(self.commit(GraphSnapshot { scenes, selection }, "import"))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Apply `edit` to a copy of the selected scene. No-op without a
    /// selection.
    fn edit_current<F>(&mut self, command: &str, edit: F) -> Arc<GraphSnapshot>
    where
        F: FnOnce(&mut Scene),
    {
        let Some(id) = self.current.selection.clone() else {
            return self.unchanged(command);
        };
        let mut next = (*self.current).clone();
        match next.scene_mut(&id) {
            Some(scene) => edit(scene),
            None => return self.unchanged(command),
        }
        self.commit(next, command)
    }

    fn commit(&mut self, next: GraphSnapshot, command: &str) -> Arc<GraphSnapshot> {
        if next == *self.current {
            return self.unchanged(command);
        }
        self.current = Arc::new(next);
        self.revision += 1;
        log::debug!("{}: published revision {}", command, self.revision);

        let snapshot = Arc::clone(&self.current);
        for (_, observer) in self.observers.iter_mut() {
            observer(&snapshot, self.revision);
        }
        snapshot
    }

    fn unchanged(&self, command: &str) -> Arc<GraphSnapshot> {
        log::trace!("{}: no change", command);
        Arc::clone(&self.current)
    }
}
