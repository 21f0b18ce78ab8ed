//! Identifier policy: scene id proposals, uniqueness checks and character
//! id issuance.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::schema::scene::Scene;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("scene id '{0}' already exists")]
    Duplicate(String),
    #[error("scene id must not be empty")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct IdPolicy {
    scene_prefix: String,
    character_prefix: String,
    /// Last character sequence number handed out.
    character_seq: u64,
}

impl IdPolicy {
    pub fn new(scene_prefix: impl Into<String>, character_prefix: impl Into<String>) -> Self {
        Self {
            scene_prefix: scene_prefix.into(),
            character_prefix: character_prefix.into(),
            character_seq: 0,
        }
    }

    /// Propose an id for a new scene: `<prefix><count + 1>`, moving past any
    /// number that is already taken.
    pub fn generate_scene_id(&self, existing: &[Scene]) -> String {
        let taken: FxHashSet<&str> = existing.iter().map(|s| s.id.as_str()).collect();
        let mut n = existing.len() + 1;
        loop {
            let candidate = format!("{}{}", self.scene_prefix, n);
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn validate_unique(id: &str, existing: &[Scene]) -> Result<(), IdError> {
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        if existing.iter().any(|s| s.id == id) {
            return Err(IdError::Duplicate(id.to_string()));
        }
        Ok(())
    }

    /// Issue a character id. Ids come from a counter that only grows, so an
    /// id is never handed out twice by the same policy. Returns `None` once
    /// the counter is exhausted, which only happens after importing an id
    /// with a suffix at the top of the `u64` range.
    pub fn next_character_id(&mut self) -> Option<String> {
        self.character_seq = self.character_seq.checked_add(1)?;
        Some(format!("{}{}", self.character_prefix, self.character_seq))
    }

    /// Advance the character counter past every `<prefix><n>` id found in
    /// `scenes`, so ids issued afterwards cannot clash with imported ones.
    pub fn observe_characters(&mut self, scenes: &[Scene]) {
        let highest = scenes
            .iter()
            .flat_map(|s| &s.dialogue)
            .flat_map(|d| &d.characters)
            .filter_map(|c| c.id.strip_prefix(self.character_prefix.as_str()))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.character_seq = self.character_seq.max(highest);
    }
}

impl Default for IdPolicy {
    fn default() -> Self {
        Self::new("scene_", "char_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::Character;
    use crate::schema::dialogue::Dialogue;

    fn scenes(ids: &[&str]) -> Vec<Scene> {
        ids.iter().map(|id| Scene::new(*id)).collect()
    }

    #[test]
    fn proposes_count_plus_one() {
        let policy = IdPolicy::default();
        assert_eq!(policy.generate_scene_id(&[]), "scene_1");
        assert_eq!(policy.generate_scene_id(&scenes(&["intro", "end"])), "scene_3");
    }

    #[test]
    fn proposal_skips_taken_numbers() {
        // scene_2 was deleted from scene_1..scene_3; the count-based
        // proposal would be scene_3 which still exists.
        let policy = IdPolicy::default();
        let existing = scenes(&["scene_1", "scene_3"]);
        assert_eq!(policy.generate_scene_id(&existing), "scene_4");
    }

    #[test]
    fn validate_unique_rejects_duplicates() {
        let existing = scenes(&["intro"]);
        assert_eq!(
            IdPolicy::validate_unique("intro", &existing),
            Err(IdError::Duplicate("intro".to_string()))
        );
        assert!(IdPolicy::validate_unique("outro", &existing).is_ok());
    }

    #[test]
    fn validate_unique_rejects_empty() {
        assert_eq!(IdPolicy::validate_unique("", &[]), Err(IdError::Empty));
    }

    #[test]
    fn character_ids_never_repeat() {
        let mut policy = IdPolicy::default();
        let a = policy.next_character_id();
        let b = policy.next_character_id();
        assert_eq!(a.as_deref(), Some("char_1"));
        assert_eq!(b.as_deref(), Some("char_2"));
    }

    #[test]
    fn observe_characters_moves_counter_forward() {
        let mut dialogue = Dialogue::new();
        dialogue.characters.push(Character::new("char_9"));
        dialogue.characters.push(Character::new("mentor"));
        let mut scene = Scene::new("s");
        scene.dialogue.push(dialogue);

        let mut policy = IdPolicy::default();
        policy.observe_characters(&[scene]);
        assert_eq!(policy.next_character_id().as_deref(), Some("char_10"));

        // Never moves backwards.
        policy.observe_characters(&[]);
        assert_eq!(policy.next_character_id().as_deref(), Some("char_11"));
    }

    #[test]
    fn exhausted_counter_stops_issuing() {
        let mut dialogue = Dialogue::new();
        dialogue
            .characters
            .push(Character::new(format!("char_{}", u64::MAX - 1)));
        let mut scene = Scene::new("s");
        scene.dialogue.push(dialogue);

        let mut policy = IdPolicy::default();
        policy.observe_characters(&[scene]);
        assert_eq!(
            policy.next_character_id(),
            Some(format!("char_{}", u64::MAX))
        );
        assert_eq!(policy.next_character_id(), None);
        // Stays exhausted rather than wrapping to low numbers.
        assert_eq!(policy.next_character_id(), None);
    }
}
