//! entries::line_type
//!
//! Line patterns.

use serde::{Deserialize, Serialize};

use crate::core::entry::{EntryCore, TableEntry};
use crate::core::types::EntryName;

/// Name of the reserved "by layer" line type.
pub const BY_LAYER: &str = "ByLayer";

/// Name of the reserved "by block" line type.
pub const BY_BLOCK: &str = "ByBlock";

/// Name of the reserved continuous (solid) line type.
pub const CONTINUOUS: &str = "Continuous";

/// A line pattern.
///
/// The pattern is a list of segment lengths: positive for dashes, negative
/// for gaps, zero for dots. An empty pattern draws a solid line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineType {
    core: EntryCore,
    /// Human-readable description shown in pattern listings.
    pub description: String,
    /// Segment lengths making up one pattern repetition.
    pub pattern: Vec<f64>,
}

impl LineType {
    /// Create a solid line type.
    pub fn new(name: EntryName) -> Self {
        Self {
            core: EntryCore::new(name),
            description: String::new(),
            pattern: Vec::new(),
        }
    }

    /// The reserved `ByLayer` line type.
    pub fn by_layer() -> Self {
        Self {
            core: EntryCore::reserved(EntryName::known(BY_LAYER)),
            description: String::new(),
            pattern: Vec::new(),
        }
    }

    /// The reserved `ByBlock` line type.
    pub fn by_block() -> Self {
        Self {
            core: EntryCore::reserved(EntryName::known(BY_BLOCK)),
            description: String::new(),
            pattern: Vec::new(),
        }
    }

    /// The reserved `Continuous` line type.
    pub fn continuous() -> Self {
        Self {
            core: EntryCore::reserved(EntryName::known(CONTINUOUS)),
            description: "Solid line".to_string(),
            pattern: Vec::new(),
        }
    }

    /// Total length of one pattern repetition.
    pub fn pattern_length(&self) -> f64 {
        self.pattern.iter().map(|segment| segment.abs()).sum()
    }
}

impl TableEntry for LineType {
    const CODE: &'static str = "LTYPE";

    fn core(&self) -> &EntryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntryCore {
        &mut self.core
    }
}
