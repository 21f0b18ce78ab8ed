//! Pure data shapes of the scene graph. Behavior lives in `crate::core`.

pub mod character;
pub mod dialogue;
pub mod scene;
