#![warn(missing_docs)]
//! `docedit-config` - data-driven configuration for `docedit-core`.
//!
//! This crate intentionally stays lightweight and does **not** depend on the document model. It
//! provides small structs that hosts can use to configure the indentation engine, the atomic tab
//! token, the undo history and pointer handling, either in code or from a JSON document.
//!
//! ```rust
//! use docedit_config::{BlockType, EditorConfig};
//!
//! let config = EditorConfig::from_json(r#"{ "indent": { "max_level": 4 } }"#).unwrap();
//! assert_eq!(config.indent.max_level, 4);
//! assert!(config.indent.allows(BlockType::Heading));
//! assert_eq!(config.tab.width, 8);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard upper bound for indent levels, regardless of configuration.
pub const MAX_INDENT_LEVEL: u8 = 9;

/// Default display width of an atomic tab token, in character-equivalents.
pub const DEFAULT_TAB_WIDTH: u8 = 8;

/// Text block kinds that can be named in the indentable allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    /// Plain paragraph.
    Paragraph,
    /// Heading (levels 1-6).
    Heading,
    /// Heading whose following content can be collapsed.
    CollapsibleHeading,
}

/// Indentation engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    /// Lowest indent level (inclusive).
    pub min_level: u8,
    /// Highest indent level (inclusive). Clamped to [`MAX_INDENT_LEVEL`].
    pub max_level: u8,
    /// Block types that carry indentation.
    pub types: Vec<BlockType>,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            min_level: 0,
            max_level: MAX_INDENT_LEVEL,
            types: vec![
                BlockType::Paragraph,
                BlockType::Heading,
                BlockType::CollapsibleHeading,
            ],
        }
    }
}

impl IndentConfig {
    /// Returns `true` if blocks of type `ty` are indentable.
    pub fn allows(&self, ty: BlockType) -> bool {
        self.types.contains(&ty)
    }

    /// Clamp `level` into `[min_level, max_level]`.
    pub fn clamp(&self, level: i32) -> u8 {
        let max = i32::from(self.max_level.min(MAX_INDENT_LEVEL));
        level.max(i32::from(self.min_level)).min(max) as u8
    }

    fn normalize(&mut self) {
        self.max_level = self.max_level.min(MAX_INDENT_LEVEL);
        self.min_level = self.min_level.min(self.max_level);
    }
}

/// Atomic tab token configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabConfig {
    /// Display width of a freshly inserted token, in character-equivalents (at least 1).
    pub width: u8,
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_TAB_WIDTH,
        }
    }
}

/// Default undo history configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept.
    pub depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { depth: 1000 }
    }
}

/// Pointer timing used for double-click detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Maximum delay between two presses of a double click, in milliseconds.
    pub double_click_ms: u64,
    /// Maximum distance between two presses of a double click, in positions.
    pub double_click_distance: usize,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            double_click_ms: 300,
            double_click_distance: 5,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Indentation engine settings.
    pub indent: IndentConfig,
    /// Tab token settings.
    pub tab: TabConfig,
    /// Undo history settings.
    pub history: HistoryConfig,
    /// Pointer settings.
    pub pointer: PointerConfig,
}

impl EditorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults, out-of-range values
    /// are clamped.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Clamp every field into its valid range.
    pub fn normalized(mut self) -> Self {
        self.indent.normalize();
        self.tab.width = self.tab.width.max(1);
        self.history.depth = self.history.depth.max(1);
        self
    }
}

/// Errors produced while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input was not valid JSON or did not match the schema.
    #[error("invalid editor configuration: {0}")]
    Json(#[from] serde_json::Error),
}
