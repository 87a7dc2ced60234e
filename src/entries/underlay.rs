//! entries::underlay
//!
//! Underlay definitions.

use serde::{Deserialize, Serialize};

use crate::core::entry::{EntryCore, TableEntry};
use crate::core::types::EntryName;

/// A definition of an underlay attached to the drawing.
///
/// The definition records where the underlay content comes from; entities
/// that place the underlay on the canvas reference it by name. Reading and
/// rendering the underlay file is the embedding application's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderlayDefinition {
    core: EntryCore,
    /// Path of the source file, as recorded in the drawing.
    pub file: String,
    /// Page of the source file the underlay shows.
    pub page: String,
}

impl UnderlayDefinition {
    /// Define an underlay showing the first page of `file`.
    pub fn new(name: EntryName, file: impl Into<String>) -> Self {
        Self {
            core: EntryCore::new(name),
            file: file.into(),
            page: "1".to_string(),
        }
    }

    /// Define an underlay showing a specific page of `file`.
    pub fn with_page(name: EntryName, file: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            core: EntryCore::new(name),
            file: file.into(),
            page: page.into(),
        }
    }
}

impl TableEntry for UnderlayDefinition {
    const CODE: &'static str = "UNDERLAYDEFINITION";

    fn core(&self) -> &EntryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntryCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let def = UnderlayDefinition::new(
            EntryName::new("SitePlan").unwrap(),
            "surveys/site-plan.pdf",
        );
        assert_eq!(def.page, "1");
        assert_eq!(def.file, "surveys/site-plan.pdf");
        assert!(!def.is_reserved());
    }

    #[test]
    fn explicit_page() {
        let def = UnderlayDefinition::with_page(
            EntryName::new("Detail").unwrap(),
            "surveys/site-plan.pdf",
            "4",
        );
        assert_eq!(def.page, "4");
    }
}
