use serde::{Deserialize, Serialize};

use super::dialogue::Dialogue;

/// A labeled edge from a scene in choice mode to a target scene.
///
/// An empty `target` means "unset". A target naming a scene that no longer
/// exists is treated the same way.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub text: String,
    #[serde(rename = "nextScene")]
    pub target: String,
}

impl Choice {
    pub fn new(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target: target.into(),
        }
    }

    /// A choice with no label and no target.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// How a scene continues once its dialogue is exhausted.
///
/// Persisted as `{"scene": "<id>"}` or `{"choices": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Next {
    /// Continue to exactly one scene. Empty string means unset.
    #[serde(rename = "scene")]
    Single(String),
    /// Let the player pick. Non-empty whenever reached through store commands.
    #[serde(rename = "choices")]
    Choices(Vec<Choice>),
}

impl Default for Next {
    fn default() -> Self {
        Self::unset()
    }
}

impl Next {
    /// `Single("")`, the continuation of a freshly created scene.
    pub fn unset() -> Self {
        Self::Single(String::new())
    }

    pub fn single(target: impl Into<String>) -> Self {
        Self::Single(target.into())
    }

    /// The choice set a scene gets when switched into choice mode.
    pub fn one_empty_choice() -> Self {
        Self::Choices(vec![Choice::empty()])
    }

    pub fn is_choices(&self) -> bool {
        matches!(self, Self::Choices(_))
    }

    pub fn choices(&self) -> Option<&[Choice]> {
        match self {
            Self::Choices(choices) => Some(choices),
            Self::Single(_) => None,
        }
    }

    /// Every non-empty target id referenced by this continuation.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Single(target) if !target.is_empty() => vec![target.as_str()],
            Self::Single(_) => Vec::new(),
            Self::Choices(choices) => choices
                .iter()
                .map(|c| c.target.as_str())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Collapse an empty choice set back to an unset single target.
    pub fn normalized(self) -> Self {
        match self {
            Self::Choices(choices) if choices.is_empty() => Self::unset(),
            other => other,
        }
    }
}

/// A node in the narrative graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub id: String,
    pub background: String,
    pub transition: bool,
    pub dialogue: Vec<Dialogue>,
    pub next: Next,
}

impl Scene {
    /// An empty scene: no background, no transition, no dialogue, unset
    /// continuation.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A single field assignment on a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceField {
    Text(String),
    Target(String),
}

impl ChoiceField {
    pub fn apply(self, choice: &mut Choice) {
        match self {
            Self::Text(text) => choice.text = text,
            Self::Target(target) => choice.target = target,
        }
    }
}

/// A partial set of scene fields to merge into an existing scene. Fields
/// left as `None` are kept. The id is changed through a rename instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneUpdate {
    pub background: Option<String>,
    pub transition: Option<bool>,
    pub dialogue: Option<Vec<Dialogue>>,
    pub next: Option<Next>,
}

impl SceneUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn transition(mut self, transition: bool) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn dialogue(mut self, dialogue: Vec<Dialogue>) -> Self {
        self.dialogue = Some(dialogue);
        self
    }

    pub fn next(mut self, next: Next) -> Self {
        self.next = Some(next);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.background.is_none()
            && self.transition.is_none()
            && self.dialogue.is_none()
            && self.next.is_none()
    }

    /// Merge into `scene`. An empty choice set is stored as `Single("")`.
    pub fn apply(self, scene: &mut Scene) {
        if let Some(background) = self.background {
            scene.background = background;
        }
        if let Some(transition) = self.transition {
            scene.transition = transition;
        }
        if let Some(dialogue) = self.dialogue {
            scene.dialogue = dialogue;
        }
        if let Some(next) = self.next {
            scene.next = next.normalized();
        }
    }
}
