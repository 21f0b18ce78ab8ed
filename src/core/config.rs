//! Editor configuration, loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What the store does with a syntactically valid document whose graph
/// breaks internal invariants (duplicate ids, dangling targets, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImportPolicy {
    /// Accept the scenes as they are.
    #[default]
    Permissive,
    /// Reject the import if the integrity report is non-empty.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Prefix of generated scene ids (`scene_1`, `scene_2`, ...).
    pub scene_id_prefix: String,
    /// Prefix of generated character ids.
    pub character_id_prefix: String,
    /// Spaces per indentation level in exported documents.
    pub export_indent: usize,
    pub import_policy: ImportPolicy,
    /// Characters of the first dialogue line shown in flow summaries.
    pub preview_len: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scene_id_prefix: "scene_".to_string(),
            character_id_prefix: "char_".to_string(),
            export_indent: 4,
            import_policy: ImportPolicy::Permissive,
            preview_len: 40,
        }
    }
}

impl EditorConfig {
    /// Load a config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<EditorConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse_ron(&contents)?;
        log::info!("Loaded editor config from {:?}", path);
        Ok(config)
    }

    /// Parse a config from a RON string. Missing fields keep their defaults.
    pub fn parse_ron(input: &str) -> Result<EditorConfig, ConfigError> {
        let config: EditorConfig = ron::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.scene_id_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "scene_id_prefix must not be empty".to_string(),
            ));
        }
        if self.character_id_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "character_id_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = EditorConfig::default();
        assert_eq!(cfg.scene_id_prefix, "scene_");
        assert_eq!(cfg.export_indent, 4);
        assert_eq!(cfg.import_policy, ImportPolicy::Permissive);
        assert_eq!(cfg.preview_len, 40);
    }

    #[test]
    fn parse_partial_ron() {
        let cfg = EditorConfig::parse_ron("(export_indent: 2, import_policy: Strict)").unwrap();
        assert_eq!(cfg.export_indent, 2);
        assert_eq!(cfg.import_policy, ImportPolicy::Strict);
        assert_eq!(cfg.character_id_prefix, "char_");
    }

    #[test]
    fn empty_prefix_rejected() {
        let err = EditorConfig::parse_ron(r#"(scene_id_prefix: "")"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_ron_rejected() {
        assert!(matches!(
            EditorConfig::parse_ron("(export_indent: )"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn load_fixture() {
        let path = std::path::PathBuf::from("tests/fixtures/editor.ron");
        let cfg = EditorConfig::load_from_ron(&path).unwrap();
        assert_eq!(cfg.scene_id_prefix, "chapter_");
        assert_eq!(cfg.export_indent, 2);
    }
}
