//! Referential integrity: sweeping references to deleted or renamed scenes,
//! and reporting graphs that break the model's invariants.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

use crate::schema::scene::{Next, Scene};

/// Clear every reference to `deleted_id` in `scenes`.
///
/// Single targets become `""`. Choices keep their entry and text; only their
/// target is cleared, and a choice set is never collapsed here even if every
/// target ends up empty. Returns the number of references cleared.
pub fn clear_references(scenes: &mut [Scene], deleted_id: &str) -> usize {
    retarget_references(scenes, deleted_id, "")
}

/// Point every reference to `from` at `to` instead.
pub fn retarget_references(scenes: &mut [Scene], from: &str, to: &str) -> usize {
    if from.is_empty() {
        return 0;
    }
    let mut touched = 0;
    for scene in scenes.iter_mut() {
        match &mut scene.next {
            Next::Single(target) => {
                if target == from {
                    *target = to.to_string();
                    touched += 1;
                }
            }
            Next::Choices(choices) => {
                for choice in choices.iter_mut().filter(|c| c.target == from) {
                    choice.target = to.to_string();
                    touched += 1;
                }
            }
        }
    }
    touched
}

/// A broken invariant found by [`inspect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// More than one scene carries this id.
    DuplicateSceneId { id: String, count: usize },
    /// The scene at `index` has an empty id.
    EmptySceneId { index: usize },
    /// A target names a scene that does not exist. `choice` is `None` for a
    /// single continuation.
    DanglingTarget {
        scene: String,
        choice: Option<usize>,
        target: String,
    },
    /// A scene is in choice mode with no choices.
    EmptyChoiceSet { scene: String },
    /// Two characters in one dialogue line share an id.
    DuplicateCharacterId {
        scene: String,
        dialogue: usize,
        id: String,
    },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSceneId { id, count } => {
                write!(f, "scene id '{}' is used by {} scenes", id, count)
            }
            Self::EmptySceneId { index } => write!(f, "scene #{} has an empty id", index),
            Self::DanglingTarget {
                scene,
                choice: None,
                target,
            } => write!(f, "scene '{}' continues to missing scene '{}'", scene, target),
            Self::DanglingTarget {
                scene,
                choice: Some(i),
                target,
            } => write!(
                f,
                "choice {} of scene '{}' leads to missing scene '{}'",
                i, scene, target
            ),
            Self::EmptyChoiceSet { scene } => {
                write!(f, "scene '{}' is in choice mode with no choices", scene)
            }
            Self::DuplicateCharacterId {
                scene,
                dialogue,
                id,
            } => write!(
                f,
                "dialogue {} of scene '{}' has duplicate character id '{}'",
                dialogue, scene, id
            ),
        }
    }
}

/// Report every invariant violation in `scenes`, in scene order.
pub fn inspect(scenes: &[Scene]) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for scene in scenes {
        *counts.entry(scene.id.as_str()).or_insert(0) += 1;
    }

    let mut reported: FxHashSet<&str> = FxHashSet::default();
    for (index, scene) in scenes.iter().enumerate() {
        if scene.id.is_empty() {
            issues.push(Issue::EmptySceneId { index });
            continue;
        }
        let count = counts[scene.id.as_str()];
        if count > 1 && reported.insert(scene.id.as_str()) {
            issues.push(Issue::DuplicateSceneId {
                id: scene.id.clone(),
                count,
            });
        }
    }

    for scene in scenes {
        match &scene.next {
            Next::Single(target) => {
                if !target.is_empty() && !counts.contains_key(target.as_str()) {
                    issues.push(Issue::DanglingTarget {
                        scene: scene.id.clone(),
                        choice: None,
                        target: target.clone(),
                    });
                }
            }
            Next::Choices(choices) => {
                if choices.is_empty() {
                    issues.push(Issue::EmptyChoiceSet {
                        scene: scene.id.clone(),
                    });
                }
                for (i, choice) in choices.iter().enumerate() {
                    if !choice.target.is_empty() && !counts.contains_key(choice.target.as_str()) {
                        issues.push(Issue::DanglingTarget {
                            scene: scene.id.clone(),
                            choice: Some(i),
                            target: choice.target.clone(),
                        });
                    }
                }
            }
        }

        for (d, dialogue) in scene.dialogue.iter().enumerate() {
            let mut seen: FxHashSet<&str> = FxHashSet::default();
            for character in &dialogue.characters {
                if !seen.insert(character.id.as_str()) {
                    issues.push(Issue::DuplicateCharacterId {
                        scene: scene.id.clone(),
                        dialogue: d,
                        id: character.id.clone(),
                    });
                }
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::Character;
    use crate::schema::dialogue::Dialogue;
    use crate::schema::scene::Choice;

    fn scene(id: &str, next: Next) -> Scene {
        let mut s = Scene::new(id);
        s.next = next;
        s
    }

    #[test]
    fn clear_single_and_choice_targets() {
        let mut scenes = vec![
            scene("a", Next::single("b")),
            scene(
                "c",
                Next::Choices(vec![Choice::new("to b", "b"), Choice::new("to a", "a")]),
            ),
        ];
        let cleared = clear_references(&mut scenes, "b");
        assert_eq!(cleared, 2);
        assert_eq!(scenes[0].next, Next::unset());
        let choices = scenes[1].next.choices().unwrap();
        assert_eq!(choices[0], Choice::new("to b", ""));
        assert_eq!(choices[1], Choice::new("to a", "a"));
    }

    #[test]
    fn clear_never_collapses_choices() {
        let mut scenes = vec![scene("c", Next::Choices(vec![Choice::new("x", "gone")]))];
        clear_references(&mut scenes, "gone");
        assert_eq!(scenes[0].next, Next::Choices(vec![Choice::new("x", "")]));
    }

    #[test]
    fn clear_empty_id_touches_nothing() {
        let mut scenes = vec![scene("a", Next::unset())];
        assert_eq!(clear_references(&mut scenes, ""), 0);
        assert_eq!(scenes[0].next, Next::unset());
    }

    #[test]
    fn retarget_rewrites_every_reference() {
        let mut scenes = vec![
            scene("a", Next::single("old")),
            scene("b", Next::Choices(vec![Choice::new("1", "old"), Choice::new("2", "old")])),
        ];
        assert_eq!(retarget_references(&mut scenes, "old", "new"), 3);
        assert_eq!(scenes[0].next, Next::single("new"));
        assert_eq!(scenes[1].next.targets(), vec!["new", "new"]);
    }

    #[test]
    fn inspect_clean_graph() {
        let scenes = vec![scene("a", Next::single("b")), scene("b", Next::unset())];
        assert!(inspect(&scenes).is_empty());
    }

    #[test]
    fn inspect_reports_each_kind() {
        let mut with_chars = scene("d", Next::Choices(Vec::new()));
        let mut line = Dialogue::new();
        line.characters.push(Character::new("char_1"));
        line.characters.push(Character::new("char_1"));
        with_chars.dialogue.push(line);

        let scenes = vec![
            scene("a", Next::single("nowhere")),
            scene("a", Next::unset()),
            scene("", Next::unset()),
            scene("c", Next::Choices(vec![Choice::new("x", "missing")])),
            with_chars,
        ];
        let issues = inspect(&scenes);
        assert!(issues.contains(&Issue::DuplicateSceneId {
            id: "a".to_string(),
            count: 2
        }));
        assert!(issues.contains(&Issue::EmptySceneId { index: 2 }));
        assert!(issues.contains(&Issue::DanglingTarget {
            scene: "a".to_string(),
            choice: None,
            target: "nowhere".to_string()
        }));
        assert!(issues.contains(&Issue::DanglingTarget {
            scene: "c".to_string(),
            choice: Some(0),
            target: "missing".to_string()
        }));
        assert!(issues.contains(&Issue::EmptyChoiceSet {
            scene: "d".to_string()
        }));
        assert!(issues.contains(&Issue::DuplicateCharacterId {
            scene: "d".to_string(),
            dialogue: 0,
            id: "char_1".to_string()
        }));
        assert_eq!(issues.len(), 6);
    }

    #[test]
    fn issue_display() {
        let issue = Issue::DanglingTarget {
            scene: "a".to_string(),
            choice: Some(1),
            target: "z".to_string(),
        };
        assert_eq!(issue.to_string(), "choice 1 of scene 'a' leads to missing scene 'z'");
    }
}
