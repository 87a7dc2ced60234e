//! entries::layer
//!
//! Drawing layers.

use serde::{Deserialize, Serialize};

use crate::core::entry::{EntryCore, TableEntry};
use crate::core::types::EntryName;

/// Name of the layer every drawing must contain.
pub const DEFAULT_LAYER: &str = "0";

/// A drawing layer.
///
/// Entities reference a layer for their display defaults; the layer table
/// tracks those references and refuses to remove a layer while any remain.
///
/// # Example
///
/// ```
/// use draftwork::core::entry::TableEntry;
/// use draftwork::core::types::EntryName;
/// use draftwork::entries::Layer;
///
/// let mut layer = Layer::new(EntryName::new("Walls").unwrap());
/// layer.color = 1;
/// layer.locked = true;
/// assert!(!layer.is_reserved());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    core: EntryCore,
    /// Color index applied to entities on this layer.
    pub color: i16,
    /// Name of the line type entities on this layer default to.
    pub line_type: EntryName,
    /// Whether entities on this layer are drawn.
    pub visible: bool,
    /// Whether entities on this layer are protected from editing.
    pub locked: bool,
}

impl Layer {
    /// Create a layer with default display settings.
    pub fn new(name: EntryName) -> Self {
        Self {
            core: EntryCore::new(name),
            color: 7,
            line_type: EntryName::known(crate::entries::line_type::CONTINUOUS),
            visible: true,
            locked: false,
        }
    }

    /// Layer `0`, the reserved layer every drawing contains.
    pub fn default_layer() -> Self {
        Self {
            core: EntryCore::reserved(EntryName::known(DEFAULT_LAYER)),
            color: 7,
            line_type: EntryName::known(crate::entries::line_type::CONTINUOUS),
            visible: true,
            locked: false,
        }
    }
}

impl TableEntry for Layer {
    const CODE: &'static str = "LAYER";

    fn core(&self) -> &EntryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntryCore {
        &mut self.core
    }
}
