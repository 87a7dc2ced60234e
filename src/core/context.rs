//! core::context
//!
//! Document-scoped handle allocation and global indexing.
//!
//! # Architecture
//!
//! Every document owns exactly one [`DocumentContext`]. Tables receive a
//! `&mut DocumentContext` on every mutating call, so handle allocation and
//! the cross-table index are explicit collaborators rather than ambient
//! state. Independent documents carry independent contexts and never
//! interact.
//!
//! # Invariants
//!
//! - The handle counter only increases; a handle value is never issued twice,
//!   even after the entry it identified is removed
//! - The global index always points at an entry's current table and name;
//!   tables update it on add, remove, and rename

use std::collections::HashMap;

use super::types::{EntryName, Handle, TableId};

/// The document-wide location of a registered entry.
///
/// File-level code resolves handles found elsewhere in a document to a
/// `GlobalRef`, then looks the entry up in the identified table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalRef {
    /// The table the entry resides in.
    pub table: TableId,
    /// The entry's current name within that table.
    pub name: EntryName,
}

/// Document-scoped state shared by all tables of one document.
///
/// # Example
///
/// ```
/// use draftwork::core::context::DocumentContext;
///
/// let mut ctx = DocumentContext::new();
/// let first = ctx.next_handle();
/// let second = ctx.next_handle();
/// assert!(first < second);
/// ```
#[derive(Debug)]
pub struct DocumentContext {
    handle_counter: u64,
    table_counter: u32,
    index: HashMap<Handle, GlobalRef>,
}

impl DocumentContext {
    /// Create a context whose first issued handle is `1`.
    pub fn new() -> Self {
        Self::with_handle_seed(1)
    }

    /// Create a context whose first issued handle is `seed`.
    ///
    /// A seed of `0` is treated as `1`; the null handle is never issued.
    pub fn with_handle_seed(seed: u64) -> Self {
        Self {
            handle_counter: seed.max(1),
            table_counter: 0,
            index: HashMap::new(),
        }
    }

    /// Issue the next handle.
    ///
    /// Returns the current counter value and increments it. A previously
    /// issued value is never returned again, so a stale handle can never
    /// alias a live entry.
    pub fn next_handle(&mut self) -> Handle {
        let handle = Handle::new(self.handle_counter);
        self.handle_counter += 1;
        handle
    }

    /// Allocate an identity for a new table.
    pub fn next_table_id(&mut self) -> TableId {
        self.table_counter += 1;
        TableId::new(self.table_counter)
    }

    /// Record where a handle's entry resides.
    pub fn register(&mut self, handle: Handle, location: GlobalRef) {
        if self.index.insert(handle, location).is_some() {
            tracing::warn!(%handle, "handle re-registered over a live index entry");
        }
    }

    /// Drop a handle from the index, returning its last known location.
    pub fn unregister(&mut self, handle: Handle) -> Option<GlobalRef> {
        self.index.remove(&handle)
    }

    /// Resolve a handle to the entry's current location.
    pub fn resolve(&self, handle: Handle) -> Option<&GlobalRef> {
        self.index.get(&handle)
    }

    /// Update the indexed name for a handle after a rename.
    pub(crate) fn rebind(&mut self, handle: Handle, name: EntryName) {
        if let Some(location) = self.index.get_mut(&handle) {
            location.name = name;
        }
    }

    /// Iterate over every indexed handle and its location.
    pub fn indexed(&self) -> impl Iterator<Item = (Handle, &GlobalRef)> {
        self.index.iter().map(|(handle, location)| (*handle, location))
    }

    /// Number of handles currently indexed.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }
}

impl Default for DocumentContext {
    fn default() -> Self {
        Self::new()
    }
}
