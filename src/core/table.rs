//! core::table
//!
//! The generic named-object table registry.
//!
//! # Architecture
//!
//! A [`Table`] owns its entries, keyed by case-insensitive name, together
//! with one reference set per entry. Mutating operations take a
//! `&mut DocumentContext` so handle assignment and global indexing stay
//! explicit. Renames are requested through the table itself, which validates
//! the destination name before anything changes; a failed rename therefore
//! needs no rollback anywhere.
//!
//! # Invariants
//!
//! - `entries` and `references` always have identical key sets
//! - `entries.len() <= max_capacity`
//! - Every registered entry has a handle and names this table as its owner
//! - An entry with a non-empty reference set, or the reserved flag, cannot
//!   be removed
//!
//! # Example
//!
//! ```
//! use draftwork::core::context::DocumentContext;
//! use draftwork::core::table::Table;
//! use draftwork::core::types::{EntryName, RefToken};
//! use draftwork::entries::Layer;
//!
//! let mut ctx = DocumentContext::new();
//! let mut layers: Table<Layer> = Table::new(&mut ctx);
//!
//! let walls = Layer::new(EntryName::new("Walls").unwrap());
//! layers.add(&mut ctx, walls, true).unwrap();
//!
//! // Lookups are case-insensitive
//! assert!(layers.contains("WALLS"));
//!
//! // A referenced entry cannot be removed
//! let token = RefToken::new();
//! layers.add_reference("Walls", token).unwrap();
//! assert!(!layers.remove(&mut ctx, "Walls"));
//! layers.remove_reference("Walls", &token).unwrap();
//! assert!(layers.remove(&mut ctx, "Walls"));
//! ```

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::context::{DocumentContext, GlobalRef};
use super::entry::TableEntry;
use super::types::{EntryName, RefToken, TableId};

/// Errors from table operations.
///
/// "Not removable" conditions (absent, reserved, referenced) are not errors;
/// [`Table::remove`] reports them through its boolean result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// An add was attempted past the table's capacity bound.
    #[error("table {table} is full: the maximum number of entries is {max}")]
    CapacityExceeded {
        /// Code name of the table.
        table: &'static str,
        /// The capacity bound.
        max: usize,
    },

    /// A rename's destination name is already taken by another entry.
    #[error("an entry named \"{name}\" already exists")]
    DuplicateName {
        /// The colliding name.
        name: String,
    },

    /// A rename was requested while another rename on this table was in
    /// flight. This is a contract violation, surfaced rather than ignored.
    #[error("a rename on table {table} is already in progress")]
    ReentrantRename {
        /// Code name of the table.
        table: &'static str,
    },

    /// A rename or reference operation named an entry the table does not
    /// contain.
    #[error("no entry named \"{name}\"")]
    NotFound {
        /// The missing name.
        name: String,
    },
}

/// A registry of uniquely named, handle-identified entries.
///
/// Entries are owned by the table; ownership transfers in at [`Table::add`]
/// and back out at [`Table::take`]. Iteration order is unspecified.
#[derive(Debug)]
pub struct Table<T> {
    id: TableId,
    code_name: &'static str,
    entries: HashMap<EntryName, T>,
    references: HashMap<EntryName, HashSet<RefToken>>,
    max_capacity: usize,
    renaming: bool,
}

impl<T: TableEntry> Table<T> {
    /// Create an unbounded table registered with the document context.
    pub fn new(ctx: &mut DocumentContext) -> Self {
        Self::with_max_capacity(ctx, usize::MAX)
    }

    /// Create a table that will never hold more than `max_capacity` entries.
    pub fn with_max_capacity(ctx: &mut DocumentContext, max_capacity: usize) -> Self {
        Self {
            id: ctx.next_table_id(),
            code_name: T::CODE,
            entries: HashMap::new(),
            references: HashMap::new(),
            max_capacity,
            renaming: false,
        }
    }

    /// The table's identity within its document.
    pub fn id(&self) -> TableId {
        self.id
    }

    /// The table's code name.
    pub fn code_name(&self) -> &'static str {
        self.code_name
    }

    /// The table's capacity bound.
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Add an entry to the table.
    ///
    /// If an entry with the same name (case-insensitively) already exists,
    /// that existing entry is returned unchanged and `entry` is discarded;
    /// adds are idempotent per name. Otherwise the entry receives a handle
    /// (a fresh one if `assign_handle` is true or it has none, its existing
    /// one if a file loader preassigned it), is recorded in the document
    /// index, and is given an empty reference set.
    ///
    /// # Errors
    ///
    /// [`TableError::CapacityExceeded`] if the table is full. The capacity
    /// check runs before the duplicate-name check.
    pub fn add(
        &mut self,
        ctx: &mut DocumentContext,
        mut entry: T,
        assign_handle: bool,
    ) -> Result<&T, TableError> {
        if self.entries.len() >= self.max_capacity {
            return Err(TableError::CapacityExceeded {
                table: self.code_name,
                max: self.max_capacity,
            });
        }

        let name = entry.name().clone();
        match self.entries.entry(name.clone()) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => {
                let handle = match entry.handle() {
                    Some(preassigned) if !assign_handle => preassigned,
                    _ => {
                        let fresh = ctx.next_handle();
                        entry.core_mut().assign_handle(fresh);
                        fresh
                    }
                };

                ctx.register(
                    handle,
                    GlobalRef {
                        table: self.id,
                        name: name.clone(),
                    },
                );
                entry.core_mut().set_owner(Some(self.id));

                tracing::debug!(table = self.code_name, name = %name, %handle, "added table entry");

                self.references.insert(name, HashSet::new());
                Ok(slot.insert(entry))
            }
        }
    }

    /// Remove an entry by name.
    ///
    /// Returns `false`, with the table unchanged, when the entry is
    /// absent, reserved, or still referenced. These are expected
    /// "not removable" conditions, not faults.
    pub fn remove(&mut self, ctx: &mut DocumentContext, name: &str) -> bool {
        self.take(ctx, name).is_some()
    }

    /// Remove an entry by name and return it.
    ///
    /// Same removal rules as [`Table::remove`]. The returned entry has its
    /// handle and owner cleared; re-adding it anywhere treats it as brand
    /// new and assigns a fresh handle.
    pub fn take(&mut self, ctx: &mut DocumentContext, name: &str) -> Option<T> {
        let key = Self::lookup_key(name)?;

        {
            let entry = self.entries.get(&key)?;
            if entry.is_reserved() {
                return None;
            }
            if self.references.get(&key).is_some_and(|refs| !refs.is_empty()) {
                return None;
            }
        }

        let mut entry = self.entries.remove(&key)?;
        self.references.remove(&key);

        if let Some(handle) = entry.handle() {
            ctx.unregister(handle);
            tracing::debug!(table = self.code_name, name = %key, %handle, "removed table entry");
        }
        entry.core_mut().clear_handle();
        entry.core_mut().set_owner(None);

        Some(entry)
    }

    /// Rename an entry.
    ///
    /// The destination name is validated before anything changes; on success
    /// the entry, its reference set, and its document index binding move to
    /// the new name together. Renaming an entry to its own name (in any
    /// spelling) updates the stored spelling and succeeds.
    ///
    /// # Errors
    ///
    /// - [`TableError::ReentrantRename`] if a rename on this table is
    ///   already in flight
    /// - [`TableError::NotFound`] if `current` names no entry
    /// - [`TableError::DuplicateName`] if a different entry already uses
    ///   `new_name`; the table is left exactly as it was
    pub fn rename(
        &mut self,
        ctx: &mut DocumentContext,
        current: &str,
        new_name: EntryName,
    ) -> Result<(), TableError> {
        if self.renaming {
            return Err(TableError::ReentrantRename {
                table: self.code_name,
            });
        }

        self.renaming = true;
        let result = self.rename_inner(ctx, current, new_name);
        self.renaming = false;
        result
    }

    fn rename_inner(
        &mut self,
        ctx: &mut DocumentContext,
        current: &str,
        new_name: EntryName,
    ) -> Result<(), TableError> {
        let current_key = Self::lookup_key(current)
            .filter(|key| self.entries.contains_key(key))
            .ok_or_else(|| TableError::NotFound {
                name: current.to_string(),
            })?;

        let same_entry = current_key == new_name;
        if !same_entry && self.entries.contains_key(&new_name) {
            return Err(TableError::DuplicateName {
                name: new_name.as_str().to_string(),
            });
        }

        let Some(mut entry) = self.entries.remove(&current_key) else {
            return Err(TableError::NotFound {
                name: current.to_string(),
            });
        };
        let refs = self.references.remove(&current_key).unwrap_or_default();

        let handle = entry.handle();
        entry.core_mut().set_name(new_name.clone());

        self.entries.insert(new_name.clone(), entry);
        self.references.insert(new_name.clone(), refs);
        if let Some(handle) = handle {
            ctx.rebind(handle, new_name.clone());
        }

        tracing::debug!(
            table = self.code_name,
            from = %current_key,
            to = %new_name,
            "renamed table entry"
        );

        Ok(())
    }

    /// Record an external reference to an entry.
    ///
    /// Recording the same token twice is a no-op; the reference set has set
    /// semantics.
    ///
    /// # Errors
    ///
    /// [`TableError::NotFound`] if the entry is absent.
    pub fn add_reference(&mut self, name: &str, token: RefToken) -> Result<(), TableError> {
        let refs = self.reference_slot(name)?;
        refs.insert(token);
        tracing::trace!(table = self.code_name, name, %token, "added reference");
        Ok(())
    }

    /// Dissolve an external reference to an entry.
    ///
    /// Returns whether the token was present.
    ///
    /// # Errors
    ///
    /// [`TableError::NotFound`] if the entry is absent.
    pub fn remove_reference(&mut self, name: &str, token: &RefToken) -> Result<bool, TableError> {
        let refs = self.reference_slot(name)?;
        let removed = refs.remove(token);
        if removed {
            tracing::trace!(table = self.code_name, name, %token, "removed reference");
        }
        Ok(removed)
    }

    /// The reference set recorded for an entry.
    pub fn references(&self, name: &str) -> Option<&HashSet<RefToken>> {
        let key = Self::lookup_key(name)?;
        self.references.get(&key)
    }

    /// Whether an entry has at least one live reference.
    pub fn is_referenced(&self, name: &str) -> bool {
        self.references(name).is_some_and(|refs| !refs.is_empty())
    }

    /// Whether the table contains an entry with this name.
    pub fn contains(&self, name: &str) -> bool {
        Self::lookup_key(name).is_some_and(|key| self.entries.contains_key(&key))
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&T> {
        let key = Self::lookup_key(name)?;
        self.entries.get(&key)
    }

    /// Look up an entry by name for mutation.
    ///
    /// Domain fields are freely mutable; the entry's identity is not, so
    /// this cannot bypass the rename or removal protocol.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        let key = Self::lookup_key(name)?;
        self.entries.get_mut(&key)
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Iterate over the entry names. Order is unspecified.
    pub fn names(&self) -> impl Iterator<Item = &EntryName> {
        self.entries.keys()
    }

    /// Iterate over the names that hold a reference slot.
    ///
    /// Always the same set as [`Table::names`]; exposed for verification.
    pub fn reference_names(&self) -> impl Iterator<Item = &EntryName> {
        self.references.keys()
    }

    fn reference_slot(&mut self, name: &str) -> Result<&mut HashSet<RefToken>, TableError> {
        Self::lookup_key(name)
            .and_then(|key| self.references.get_mut(&key))
            .ok_or_else(|| TableError::NotFound {
                name: name.to_string(),
            })
    }

    /// Turn a raw name into a lookup key. Names that cannot be valid entry
    /// names cannot be in the table, so they resolve to no key.
    fn lookup_key(name: &str) -> Option<EntryName> {
        EntryName::new(name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::EntryCore;
    use crate::core::types::Handle;

    /// Minimal entry kind for exercising the registry.
    #[derive(Debug)]
    struct Probe {
        core: EntryCore,
    }

    impl Probe {
        fn new(name: &str) -> Self {
            Self {
                core: EntryCore::new(EntryName::new(name).unwrap()),
            }
        }

        fn reserved(name: &str) -> Self {
            Self {
                core: EntryCore::reserved(EntryName::new(name).unwrap()),
            }
        }
    }

    impl TableEntry for Probe {
        const CODE: &'static str = "PROBE";

        fn core(&self) -> &EntryCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut EntryCore {
            &mut self.core
        }
    }

    fn setup() -> (DocumentContext, Table<Probe>) {
        let mut ctx = DocumentContext::new();
        let table = Table::new(&mut ctx);
        (ctx, table)
    }

    mod add {
        use super::*;

        #[test]
        fn assigns_handle_and_owner() {
            let (mut ctx, mut table) = setup();

            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();

            let entry = table.get("Walls").unwrap();
            assert_eq!(entry.handle(), Some(Handle::new(1)));
            assert_eq!(entry.owner(), Some(table.id()));
        }

        #[test]
        fn registers_in_document_index() {
            let (mut ctx, mut table) = setup();

            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();

            let location = ctx.resolve(Handle::new(1)).unwrap();
            assert_eq!(location.table, table.id());
            assert_eq!(location.name.as_str(), "Walls");
        }

        #[test]
        fn is_idempotent_per_name() {
            let (mut ctx, mut table) = setup();

            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();
            let first_handle = table.get("Walls").unwrap().handle();

            // Same name in a different spelling: the stored entry wins.
            let existing = table.add(&mut ctx, Probe::new("WALLS"), true).unwrap();
            assert_eq!(existing.name().as_str(), "Walls");
            assert_eq!(existing.handle(), first_handle);
            assert_eq!(table.len(), 1);
        }

        #[test]
        fn enforces_capacity() {
            let mut ctx = DocumentContext::new();
            let mut table: Table<Probe> = Table::with_max_capacity(&mut ctx, 2);

            table.add(&mut ctx, Probe::new("A"), true).unwrap();
            table.add(&mut ctx, Probe::new("B"), true).unwrap();

            let err = table.add(&mut ctx, Probe::new("C"), true).unwrap_err();
            assert_eq!(
                err,
                TableError::CapacityExceeded {
                    table: "PROBE",
                    max: 2
                }
            );
            assert_eq!(table.len(), 2);
        }

        #[test]
        fn keeps_preassigned_handle_when_not_assigning() {
            let (mut ctx, mut table) = setup();

            let mut probe = Probe::new("Walls");
            probe.core_mut().assign_handle(Handle::new(0x40));

            table.add(&mut ctx, probe, false).unwrap();
            assert_eq!(table.get("Walls").unwrap().handle(), Some(Handle::new(0x40)));
            assert!(ctx.resolve(Handle::new(0x40)).is_some());
        }

        #[test]
        fn replaces_preassigned_handle_when_assigning() {
            let (mut ctx, mut table) = setup();

            let mut probe = Probe::new("Walls");
            probe.core_mut().assign_handle(Handle::new(0x40));

            table.add(&mut ctx, probe, true).unwrap();
            assert_eq!(table.get("Walls").unwrap().handle(), Some(Handle::new(1)));
        }

        #[test]
        fn creates_empty_reference_set() {
            let (mut ctx, mut table) = setup();

            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();
            assert_eq!(table.references("Walls").unwrap().len(), 0);
        }
    }

    mod remove {
        use super::*;

        #[test]
        fn absent_entry_reports_false() {
            let (mut ctx, mut table) = setup();
            assert!(!table.remove(&mut ctx, "Ghost"));
        }

        #[test]
        fn reserved_entry_is_protected() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::reserved("0"), true).unwrap();

            assert!(!table.remove(&mut ctx, "0"));
            assert!(table.contains("0"));
        }

        #[test]
        fn referenced_entry_is_protected() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();

            let token = RefToken::new();
            table.add_reference("Walls", token).unwrap();
            assert!(!table.remove(&mut ctx, "Walls"));
            assert!(table.contains("Walls"));

            table.remove_reference("Walls", &token).unwrap();
            assert!(table.remove(&mut ctx, "Walls"));
        }

        #[test]
        fn take_clears_identity() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();

            let removed = table.take(&mut ctx, "walls").unwrap();
            assert!(removed.handle().is_none());
            assert!(removed.owner().is_none());
            assert!(!table.contains("Walls"));
            assert!(table.references("Walls").is_none());
        }

        #[test]
        fn take_unregisters_from_index() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();

            table.take(&mut ctx, "Walls").unwrap();
            assert!(ctx.resolve(Handle::new(1)).is_none());
        }

        #[test]
        fn readding_taken_entry_gets_fresh_handle() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();

            let removed = table.take(&mut ctx, "Walls").unwrap();
            table.add(&mut ctx, removed, false).unwrap();

            // Handle 1 was spent on the first registration.
            assert_eq!(table.get("Walls").unwrap().handle(), Some(Handle::new(2)));
        }
    }

    mod rename {
        use super::*;

        #[test]
        fn moves_entry_and_references_together() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Old"), true).unwrap();

            let token = RefToken::new();
            table.add_reference("Old", token).unwrap();

            table
                .rename(&mut ctx, "Old", EntryName::new("New").unwrap())
                .unwrap();

            assert!(!table.contains("Old"));
            let entry = table.get("New").unwrap();
            assert_eq!(entry.name().as_str(), "New");
            assert_eq!(entry.handle(), Some(Handle::new(1)));
            assert!(table.references("New").unwrap().contains(&token));
            assert!(table.references("Old").is_none());
        }

        #[test]
        fn updates_document_index() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Old"), true).unwrap();

            table
                .rename(&mut ctx, "Old", EntryName::new("New").unwrap())
                .unwrap();

            let location = ctx.resolve(Handle::new(1)).unwrap();
            assert_eq!(location.name.as_str(), "New");
        }

        #[test]
        fn rejects_duplicate_destination() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("X"), true).unwrap();
            table.add(&mut ctx, Probe::new("Y"), true).unwrap();

            let err = table
                .rename(&mut ctx, "X", EntryName::new("y").unwrap())
                .unwrap_err();
            assert_eq!(err, TableError::DuplicateName { name: "y".into() });

            // Both entries exactly as they were.
            assert_eq!(table.get("X").unwrap().name().as_str(), "X");
            assert_eq!(table.get("Y").unwrap().name().as_str(), "Y");
        }

        #[test]
        fn missing_source_is_an_error() {
            let (mut ctx, mut table) = setup();
            let err = table
                .rename(&mut ctx, "Ghost", EntryName::new("New").unwrap())
                .unwrap_err();
            assert_eq!(err, TableError::NotFound { name: "Ghost".into() });
        }

        #[test]
        fn respelling_same_entry_is_allowed() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("walls"), true).unwrap();

            table
                .rename(&mut ctx, "walls", EntryName::new("Walls").unwrap())
                .unwrap();

            assert_eq!(table.len(), 1);
            assert_eq!(table.get("WALLS").unwrap().name().as_str(), "Walls");
        }

        #[test]
        fn reentrant_rename_is_rejected() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();

            // Simulate a rename left in flight by a re-entrant caller.
            table.renaming = true;
            let err = table
                .rename(&mut ctx, "Walls", EntryName::new("Roof").unwrap())
                .unwrap_err();
            assert_eq!(err, TableError::ReentrantRename { table: "PROBE" });

            table.renaming = false;
            assert!(table
                .rename(&mut ctx, "Walls", EntryName::new("Roof").unwrap())
                .is_ok());
        }
    }

    mod references {
        use super::*;

        #[test]
        fn add_reference_to_absent_entry_fails() {
            let (_ctx, mut table) = setup();
            let err = table.add_reference("Ghost", RefToken::new()).unwrap_err();
            assert_eq!(err, TableError::NotFound { name: "Ghost".into() });
        }

        #[test]
        fn duplicate_tokens_collapse() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();

            let token = RefToken::new();
            table.add_reference("Walls", token).unwrap();
            table.add_reference("Walls", token).unwrap();

            assert_eq!(table.references("Walls").unwrap().len(), 1);
        }

        #[test]
        fn remove_reference_reports_presence() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Walls"), true).unwrap();

            let token = RefToken::new();
            table.add_reference("Walls", token).unwrap();

            assert!(table.remove_reference("Walls", &token).unwrap());
            assert!(!table.remove_reference("Walls", &token).unwrap());
            assert!(!table.is_referenced("Walls"));
        }
    }

    mod accessors {
        use super::*;

        #[test]
        fn lookup_is_case_insensitive() {
            let (mut ctx, mut table) = setup();
            table.add(&mut ctx, Probe::new("Hidden Lines"), true).unwrap();

            assert!(table.contains("hidden lines"));
            assert!(table.get("HIDDEN LINES").is_some());
            assert!(table.get_mut("Hidden lines").is_some());
        }

        #[test]
        fn invalid_names_resolve_to_nothing() {
            let (_ctx, table) = setup();
            assert!(!table.contains("a|b"));
            assert!(table.get("").is_none());
        }

        #[test]
        fn len_and_iteration() {
            let (mut ctx, mut table) = setup();
            assert!(table.is_empty());

            table.add(&mut ctx, Probe::new("A"), true).unwrap();
            table.add(&mut ctx, Probe::new("B"), true).unwrap();

            assert_eq!(table.len(), 2);
            assert_eq!(table.iter().count(), 2);
            assert_eq!(table.names().count(), 2);
            assert_eq!(table.reference_names().count(), 2);
        }
    }
}
