//! Per-scene flow summaries for drawing the graph overview.

use serde::Serialize;

use crate::schema::scene::{Next, Scene};

/// Where a scene's flow goes, reduced to what an overview needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FlowLink {
    Next { target: String },
    Choices { count: usize },
    Unconnected,
}

impl FlowLink {
    pub fn of(next: &Next) -> Self {
        match next {
            Next::Single(target) if target.is_empty() => Self::Unconnected,
            Next::Single(target) => Self::Next {
                target: target.clone(),
            },
            Next::Choices(choices) => Self::Choices {
                count: choices.len(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub id: String,
    /// Start of the first dialogue line, cut to the preview length with
    /// `...` appended when something was cut.
    pub preview: String,
    pub link: FlowLink,
    pub selected: bool,
}

impl SceneSummary {
    pub fn of(scene: &Scene, selected: bool, preview_len: usize) -> Self {
        let preview = scene
            .dialogue
            .first()
            .map(|d| truncate(&d.text, preview_len))
            .unwrap_or_default();
        Self {
            id: scene.id.clone(),
            preview,
            link: FlowLink::of(&scene.next),
            selected,
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::dialogue::Dialogue;
    use crate::schema::scene::Choice;

    #[test]
    fn link_kinds() {
        assert_eq!(FlowLink::of(&Next::unset()), FlowLink::Unconnected);
        assert_eq!(
            FlowLink::of(&Next::single("end")),
            FlowLink::Next {
                target: "end".to_string()
            }
        );
        assert_eq!(
            FlowLink::of(&Next::Choices(vec![Choice::empty(), Choice::empty()])),
            FlowLink::Choices { count: 2 }
        );
    }

    #[test]
    fn preview_is_cut_on_char_boundary() {
        let mut scene = Scene::new("s");
        let mut line = Dialogue::new();
        line.text = "ああああああ".to_string();
        scene.dialogue.push(line);
        let summary = SceneSummary::of(&scene, false, 4);
        assert_eq!(summary.preview, "ああああ...");
    }

    #[test]
    fn short_preview_untouched() {
        let mut scene = Scene::new("s");
        let mut line = Dialogue::new();
        line.text = "Hello".to_string();
        scene.dialogue.push(line);
        assert_eq!(SceneSummary::of(&scene, true, 40).preview, "Hello");
        assert_eq!(SceneSummary::of(&Scene::new("e"), false, 40).preview, "");
    }

    #[test]
    fn link_serializes_with_kind_tag() {
        let json = serde_json::to_string(&FlowLink::Choices { count: 3 }).unwrap();
        assert_eq!(json, r#"{"kind":"choices","count":3}"#);
    }
}
