//! document
//!
//! The document facade.
//!
//! # Architecture
//!
//! A [`Document`] owns one [`DocumentContext`] and the standard tables of a
//! drawing. Mutations go through the facade, which threads the context for
//! the caller and keeps the modification timestamp current. The `*_mut`
//! table accessors expose only context-free mutation (reference tracking,
//! domain field edits); add, remove, and rename always run through the
//! facade so the context cannot be forgotten.
//!
//! # Invariants
//!
//! - A fresh document always contains its reserved defaults: layer `0`,
//!   line types `ByLayer`/`ByBlock`/`Continuous`, text style `Standard`,
//!   and application id `ACAD`
//! - Handles are unique across all tables of the document
//!
//! # Example
//!
//! ```
//! use draftwork::core::types::EntryName;
//! use draftwork::document::Document;
//! use draftwork::entries::Layer;
//!
//! let mut doc = Document::new();
//! let handle = doc
//!     .add_layer(Layer::new(EntryName::new("Walls").unwrap()))
//!     .unwrap();
//!
//! let location = doc.resolve_handle(handle).unwrap();
//! assert_eq!(location.name.as_str(), "Walls");
//! assert!(doc.verify().ok);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::context::{DocumentContext, GlobalRef};
use crate::core::entry::TableEntry;
use crate::core::table::{Table, TableError};
use crate::core::types::{EntryName, Fingerprint, Handle, UtcTimestamp};
use crate::core::verify::{collect_table_errors, VerifyError, VerifyResult};
use crate::entries::{AppId, Layer, LineType, TextStyle, UnderlayDefinition};

/// Construction-time settings for a document.
///
/// Embedding applications can deserialize this from their own configuration;
/// the defaults produce an unbounded document whose first handle is `1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Capacity bound applied to every table. Clamped upward per table so
    /// the reserved defaults always fit.
    pub table_capacity: usize,
    /// First handle value the document issues. Zero is treated as one.
    pub handle_seed: u64,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            table_capacity: usize::MAX,
            handle_seed: 1,
        }
    }
}

/// A drawing's document model: one context, the standard tables, and the
/// reserved defaults every drawing carries.
#[derive(Debug)]
pub struct Document {
    ctx: DocumentContext,
    created: UtcTimestamp,
    modified: UtcTimestamp,
    layers: Table<Layer>,
    line_types: Table<LineType>,
    text_styles: Table<TextStyle>,
    app_ids: Table<AppId>,
    underlay_definitions: Table<UnderlayDefinition>,
}

impl Document {
    /// Create a document with default options.
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    /// Create a document with the given options.
    pub fn with_options(options: DocumentOptions) -> Self {
        let mut ctx = DocumentContext::with_handle_seed(options.handle_seed);
        let cap = options.table_capacity;

        let mut layers = Table::with_max_capacity(&mut ctx, cap.max(1));
        let mut line_types = Table::with_max_capacity(&mut ctx, cap.max(3));
        let mut text_styles = Table::with_max_capacity(&mut ctx, cap.max(1));
        let mut app_ids = Table::with_max_capacity(&mut ctx, cap.max(1));
        let underlay_definitions = Table::with_max_capacity(&mut ctx, cap);

        seed(&mut layers, &mut ctx, Layer::default_layer());
        seed(&mut line_types, &mut ctx, LineType::by_layer());
        seed(&mut line_types, &mut ctx, LineType::by_block());
        seed(&mut line_types, &mut ctx, LineType::continuous());
        seed(&mut text_styles, &mut ctx, TextStyle::standard());
        seed(&mut app_ids, &mut ctx, AppId::acad());

        let now = UtcTimestamp::now();
        Self {
            ctx,
            created: now.clone(),
            modified: now,
            layers,
            line_types,
            text_styles,
            app_ids,
            underlay_definitions,
        }
    }

    /// The document's context.
    pub fn context(&self) -> &DocumentContext {
        &self.ctx
    }

    /// When the document was created.
    pub fn created(&self) -> &UtcTimestamp {
        &self.created
    }

    /// When the document was last mutated through the facade.
    pub fn modified(&self) -> &UtcTimestamp {
        &self.modified
    }

    /// Resolve a handle to the entry's current location.
    pub fn resolve_handle(&self, handle: Handle) -> Option<&GlobalRef> {
        self.ctx.resolve(handle)
    }

    /// The layer table.
    pub fn layers(&self) -> &Table<Layer> {
        &self.layers
    }

    /// The layer table, for reference tracking and field edits.
    pub fn layers_mut(&mut self) -> &mut Table<Layer> {
        &mut self.layers
    }

    /// The line type table.
    pub fn line_types(&self) -> &Table<LineType> {
        &self.line_types
    }

    /// The line type table, for reference tracking and field edits.
    pub fn line_types_mut(&mut self) -> &mut Table<LineType> {
        &mut self.line_types
    }

    /// The text style table.
    pub fn text_styles(&self) -> &Table<TextStyle> {
        &self.text_styles
    }

    /// The text style table, for reference tracking and field edits.
    pub fn text_styles_mut(&mut self) -> &mut Table<TextStyle> {
        &mut self.text_styles
    }

    /// The application id table.
    pub fn app_ids(&self) -> &Table<AppId> {
        &self.app_ids
    }

    /// The application id table, for reference tracking and field edits.
    pub fn app_ids_mut(&mut self) -> &mut Table<AppId> {
        &mut self.app_ids
    }

    /// The underlay definition table.
    pub fn underlay_definitions(&self) -> &Table<UnderlayDefinition> {
        &self.underlay_definitions
    }

    /// The underlay definition table, for reference tracking and field edits.
    pub fn underlay_definitions_mut(&mut self) -> &mut Table<UnderlayDefinition> {
        &mut self.underlay_definitions
    }

    /// Add a layer. Returns the handle of the stored entry (the existing
    /// one on an idempotent add).
    pub fn add_layer(&mut self, layer: Layer) -> Result<Handle, TableError> {
        add_entry(&mut self.layers, &mut self.ctx, &mut self.modified, layer)
    }

    /// Remove a layer by name.
    pub fn remove_layer(&mut self, name: &str) -> bool {
        remove_entry(&mut self.layers, &mut self.ctx, &mut self.modified, name)
    }

    /// Rename a layer.
    pub fn rename_layer(&mut self, current: &str, new_name: EntryName) -> Result<(), TableError> {
        rename_entry(
            &mut self.layers,
            &mut self.ctx,
            &mut self.modified,
            current,
            new_name,
        )
    }

    /// Add a line type. Returns the handle of the stored entry.
    pub fn add_line_type(&mut self, line_type: LineType) -> Result<Handle, TableError> {
        add_entry(
            &mut self.line_types,
            &mut self.ctx,
            &mut self.modified,
            line_type,
        )
    }

    /// Remove a line type by name.
    pub fn remove_line_type(&mut self, name: &str) -> bool {
        remove_entry(&mut self.line_types, &mut self.ctx, &mut self.modified, name)
    }

    /// Rename a line type.
    pub fn rename_line_type(
        &mut self,
        current: &str,
        new_name: EntryName,
    ) -> Result<(), TableError> {
        rename_entry(
            &mut self.line_types,
            &mut self.ctx,
            &mut self.modified,
            current,
            new_name,
        )
    }

    /// Add a text style. Returns the handle of the stored entry.
    pub fn add_text_style(&mut self, style: TextStyle) -> Result<Handle, TableError> {
        add_entry(
            &mut self.text_styles,
            &mut self.ctx,
            &mut self.modified,
            style,
        )
    }

    /// Remove a text style by name.
    pub fn remove_text_style(&mut self, name: &str) -> bool {
        remove_entry(
            &mut self.text_styles,
            &mut self.ctx,
            &mut self.modified,
            name,
        )
    }

    /// Rename a text style.
    pub fn rename_text_style(
        &mut self,
        current: &str,
        new_name: EntryName,
    ) -> Result<(), TableError> {
        rename_entry(
            &mut self.text_styles,
            &mut self.ctx,
            &mut self.modified,
            current,
            new_name,
        )
    }

    /// Add an application id. Returns the handle of the stored entry.
    pub fn add_app_id(&mut self, app_id: AppId) -> Result<Handle, TableError> {
        add_entry(&mut self.app_ids, &mut self.ctx, &mut self.modified, app_id)
    }

    /// Remove an application id by name.
    pub fn remove_app_id(&mut self, name: &str) -> bool {
        remove_entry(&mut self.app_ids, &mut self.ctx, &mut self.modified, name)
    }

    /// Rename an application id.
    pub fn rename_app_id(&mut self, current: &str, new_name: EntryName) -> Result<(), TableError> {
        rename_entry(
            &mut self.app_ids,
            &mut self.ctx,
            &mut self.modified,
            current,
            new_name,
        )
    }

    /// Add an underlay definition. Returns the handle of the stored entry.
    pub fn add_underlay_definition(
        &mut self,
        definition: UnderlayDefinition,
    ) -> Result<Handle, TableError> {
        add_entry(
            &mut self.underlay_definitions,
            &mut self.ctx,
            &mut self.modified,
            definition,
        )
    }

    /// Remove an underlay definition by name.
    pub fn remove_underlay_definition(&mut self, name: &str) -> bool {
        remove_entry(
            &mut self.underlay_definitions,
            &mut self.ctx,
            &mut self.modified,
            name,
        )
    }

    /// Rename an underlay definition.
    pub fn rename_underlay_definition(
        &mut self,
        current: &str,
        new_name: EntryName,
    ) -> Result<(), TableError> {
        rename_entry(
            &mut self.underlay_definitions,
            &mut self.ctx,
            &mut self.modified,
            current,
            new_name,
        )
    }

    /// A deterministic digest over every table's `(name, handle)` state.
    ///
    /// The state is sorted before hashing, so map iteration order never
    /// affects the digest; any add, remove, or rename changes it.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut state = Vec::new();
        collect_state(&self.layers, &mut state);
        collect_state(&self.line_types, &mut state);
        collect_state(&self.text_styles, &mut state);
        collect_state(&self.app_ids, &mut state);
        collect_state(&self.underlay_definitions, &mut state);
        Fingerprint::compute(&state)
    }

    /// Verify every table's invariants and the global handle index.
    pub fn verify(&self) -> VerifyResult {
        let mut errors = Vec::new();

        collect_table_errors(&self.layers, &mut errors);
        collect_table_errors(&self.line_types, &mut errors);
        collect_table_errors(&self.text_styles, &mut errors);
        collect_table_errors(&self.app_ids, &mut errors);
        collect_table_errors(&self.underlay_definitions, &mut errors);

        let mut seen: HashMap<Handle, usize> = HashMap::new();
        check_entries_indexed(&self.layers, &self.ctx, &mut seen, &mut errors);
        check_entries_indexed(&self.line_types, &self.ctx, &mut seen, &mut errors);
        check_entries_indexed(&self.text_styles, &self.ctx, &mut seen, &mut errors);
        check_entries_indexed(&self.app_ids, &self.ctx, &mut seen, &mut errors);
        check_entries_indexed(&self.underlay_definitions, &self.ctx, &mut seen, &mut errors);

        for (handle, count) in seen {
            if count > 1 {
                errors.push(VerifyError::DuplicateHandle { handle });
            }
        }

        for (handle, location) in self.ctx.indexed() {
            if !self.location_live(location) {
                errors.push(VerifyError::StaleIndex { handle });
            }
        }

        VerifyResult::from_errors(errors)
    }

    /// Whether an indexed location still points at a live entry.
    fn location_live(&self, location: &GlobalRef) -> bool {
        let name = location.name.as_str();
        if location.table == self.layers.id() {
            self.layers.contains(name)
        } else if location.table == self.line_types.id() {
            self.line_types.contains(name)
        } else if location.table == self.text_styles.id() {
            self.text_styles.contains(name)
        } else if location.table == self.app_ids.id() {
            self.app_ids.contains(name)
        } else if location.table == self.underlay_definitions.id() {
            self.underlay_definitions.contains(name)
        } else {
            false
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed a reserved default into a freshly built table.
fn seed<T: TableEntry>(table: &mut Table<T>, ctx: &mut DocumentContext, entry: T) {
    // Capacities are clamped above the reserved set, so seeding cannot
    // overflow, and the names are fixed, so it cannot collide.
    let seeded = table.add(ctx, entry, true).is_ok();
    debug_assert!(seeded, "reserved defaults must fit the table capacity");
}

fn add_entry<T: TableEntry>(
    table: &mut Table<T>,
    ctx: &mut DocumentContext,
    modified: &mut UtcTimestamp,
    entry: T,
) -> Result<Handle, TableError> {
    let handle = table.add(ctx, entry, true)?.handle().unwrap_or(Handle::NULL);
    *modified = UtcTimestamp::now();
    Ok(handle)
}

fn remove_entry<T: TableEntry>(
    table: &mut Table<T>,
    ctx: &mut DocumentContext,
    modified: &mut UtcTimestamp,
    name: &str,
) -> bool {
    let removed = table.remove(ctx, name);
    if removed {
        *modified = UtcTimestamp::now();
    }
    removed
}

fn rename_entry<T: TableEntry>(
    table: &mut Table<T>,
    ctx: &mut DocumentContext,
    modified: &mut UtcTimestamp,
    current: &str,
    new_name: EntryName,
) -> Result<(), TableError> {
    table.rename(ctx, current, new_name)?;
    *modified = UtcTimestamp::now();
    Ok(())
}

fn collect_state<T: TableEntry>(table: &Table<T>, state: &mut Vec<(String, Handle)>) {
    for entry in table.iter() {
        state.push((
            format!("{}/{}", table.code_name(), entry.name().as_str()),
            entry.handle().unwrap_or(Handle::NULL),
        ));
    }
}

/// Check that every registered entry is indexed at its current location,
/// counting handle occurrences for the duplicate check.
fn check_entries_indexed<T: TableEntry>(
    table: &Table<T>,
    ctx: &DocumentContext,
    seen: &mut HashMap<Handle, usize>,
    errors: &mut Vec<VerifyError>,
) {
    for entry in table.iter() {
        // Missing handles are reported by the per-table checks.
        let Some(handle) = entry.handle() else {
            continue;
        };
        *seen.entry(handle).or_insert(0) += 1;

        let indexed_here = ctx
            .resolve(handle)
            .is_some_and(|location| location.table == table.id() && &location.name == entry.name());
        if !indexed_here {
            errors.push(VerifyError::UnindexedHandle {
                name: entry.name().as_str().to_string(),
                handle,
            });
        }
    }
}
