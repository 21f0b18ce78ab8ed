//! Scene Graph: the editing core of a branching visual-novel diagrammer.
//!
//! A graph is an ordered list of scenes. Each scene holds dialogue lines
//! with on-screen characters and continues either to one successor scene or
//! through a set of player choices. [`SceneStore`] applies editing commands,
//! keeps references consistent when scenes are deleted or renamed, and
//! imports/exports the graph as JSON.

pub mod core;
pub mod schema;

pub use crate::core::config::{EditorConfig, ImportPolicy};
pub use crate::core::store::{GraphSnapshot, SceneStore, StoreError, SubscriptionId};
