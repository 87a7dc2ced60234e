//! entries::text_style
//!
//! Text styles.

use serde::{Deserialize, Serialize};

use crate::core::entry::{EntryCore, TableEntry};
use crate::core::types::EntryName;

/// Name of the reserved default text style.
pub const STANDARD: &str = "Standard";

/// A text style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    core: EntryCore,
    /// Font file the style renders with.
    pub font: String,
    /// Fixed text height; `0.0` leaves the height free per use.
    pub height: f64,
    /// Horizontal stretch factor.
    pub width_factor: f64,
}

impl TextStyle {
    /// Create a text style using the given font file.
    pub fn new(name: EntryName, font: impl Into<String>) -> Self {
        Self {
            core: EntryCore::new(name),
            font: font.into(),
            height: 0.0,
            width_factor: 1.0,
        }
    }

    /// The reserved `Standard` text style.
    pub fn standard() -> Self {
        Self {
            core: EntryCore::reserved(EntryName::known(STANDARD)),
            font: "simplex.shx".to_string(),
            height: 0.0,
            width_factor: 1.0,
        }
    }

    /// Whether the style fixes the text height.
    pub fn has_fixed_height(&self) -> bool {
        self.height != 0.0
    }
}

impl TableEntry for TextStyle {
    const CODE: &'static str = "STYLE";

    fn core(&self) -> &EntryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntryCore {
        &mut self.core
    }
}
