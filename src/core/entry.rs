//! core::entry
//!
//! Entry identity and the table entry contract.
//!
//! # Architecture
//!
//! Every concrete table entry kind embeds an [`EntryCore`] carrying the
//! identity the registry manages: the validated name, the optional handle,
//! the owner back-reference, and the reserved flag. The [`TableEntry`] trait
//! exposes that core to the generic table.
//!
//! # Invariants
//!
//! - The name, handle, and owner of a registered entry are mutable only by
//!   the crate; callers change names through [`Table::rename`]
//! - The owner back-reference is a plain [`TableId`], never an ownership
//!   link, so entries and tables cannot form reference cycles
//!
//! [`Table::rename`]: crate::core::table::Table::rename

use serde::{Deserialize, Serialize};

use super::types::{EntryName, Handle, TableId};

/// The identity every table entry carries.
///
/// An `EntryCore` starts *unregistered*: no handle, no owner. Registration
/// through a table assigns both; removal clears both. A removed entry that
/// is re-added is treated as brand new and receives a fresh handle.
///
/// # Example
///
/// ```
/// use draftwork::core::entry::EntryCore;
/// use draftwork::core::types::EntryName;
///
/// let core = EntryCore::new(EntryName::new("Walls").unwrap());
/// assert_eq!(core.name().as_str(), "Walls");
/// assert!(core.handle().is_none());
/// assert!(core.owner().is_none());
/// assert!(!core.is_reserved());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCore {
    name: EntryName,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    handle: Option<Handle>,
    #[serde(skip, default)]
    owner: Option<TableId>,
    #[serde(default)]
    reserved: bool,
}

impl EntryCore {
    /// Create the identity of an ordinary, removable entry.
    pub fn new(name: EntryName) -> Self {
        Self {
            name,
            handle: None,
            owner: None,
            reserved: false,
        }
    }

    /// Create the identity of a reserved entry.
    ///
    /// Reserved entries can never be removed from their table.
    pub fn reserved(name: EntryName) -> Self {
        Self {
            name,
            handle: None,
            owner: None,
            reserved: true,
        }
    }

    /// The entry's name.
    pub fn name(&self) -> &EntryName {
        &self.name
    }

    /// The entry's handle, if it is registered.
    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    /// The id of the owning table, if the entry is registered.
    pub fn owner(&self) -> Option<TableId> {
        self.owner
    }

    /// Whether the entry is protected from removal.
    pub fn is_reserved(&self) -> bool {
        self.reserved
    }

    /// Whether the entry currently resides in a table.
    pub fn is_registered(&self) -> bool {
        self.owner.is_some()
    }

    pub(crate) fn set_name(&mut self, name: EntryName) {
        self.name = name;
    }

    pub(crate) fn assign_handle(&mut self, handle: Handle) {
        self.handle = Some(handle);
    }

    pub(crate) fn clear_handle(&mut self) {
        self.handle = None;
    }

    pub(crate) fn set_owner(&mut self, owner: Option<TableId>) {
        self.owner = owner;
    }
}

/// The contract between a concrete entry kind and the generic table.
///
/// Implementors embed an [`EntryCore`] and expose it through `core` and
/// `core_mut`; the provided accessors delegate to it.
///
/// # Example
///
/// ```
/// use draftwork::core::entry::{EntryCore, TableEntry};
/// use draftwork::core::types::EntryName;
///
/// struct ViewName {
///     core: EntryCore,
/// }
///
/// impl TableEntry for ViewName {
///     const CODE: &'static str = "VIEW";
///
///     fn core(&self) -> &EntryCore {
///         &self.core
///     }
///
///     fn core_mut(&mut self) -> &mut EntryCore {
///         &mut self.core
///     }
/// }
///
/// let view = ViewName {
///     core: EntryCore::new(EntryName::new("Plan").unwrap()),
/// };
/// assert_eq!(view.name().as_str(), "Plan");
/// ```
pub trait TableEntry {
    /// Table code name, used in diagnostics and log events.
    const CODE: &'static str;

    /// The entry's identity.
    fn core(&self) -> &EntryCore;

    /// Mutable access to the entry's identity.
    ///
    /// The identity's fields have no public setters, so exposing this does
    /// not let callers bypass the table's rename and removal protocol.
    fn core_mut(&mut self) -> &mut EntryCore;

    /// The entry's name.
    fn name(&self) -> &EntryName {
        self.core().name()
    }

    /// The entry's handle, if it is registered.
    fn handle(&self) -> Option<Handle> {
        self.core().handle()
    }

    /// The id of the owning table, if the entry is registered.
    fn owner(&self) -> Option<TableId> {
        self.core().owner()
    }

    /// Whether the entry is protected from removal.
    fn is_reserved(&self) -> bool {
        self.core().is_reserved()
    }
}
