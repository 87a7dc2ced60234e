//! core::verify
//!
//! Fast table and document invariant verification.
//!
//! # Checks
//!
//! - **Table verify**: entries and reference slots cover the same names,
//!   the capacity bound holds, every entry carries a handle, names its
//!   table as owner, and is stored under its own name
//!
//! - **Document verify** (see [`Document::verify`]): also validates the
//!   global handle index against every table
//!
//! # Invariants
//!
//! - Never mutates the table
//! - Must be deterministic
//!
//! [`Document::verify`]: crate::document::Document::verify

use std::collections::HashSet;

use thiserror::Error;

use super::entry::TableEntry;
use super::table::Table;
use super::types::Handle;

/// Errors from verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("entry {name} in table {table} has no reference slot")]
    MissingReferenceSlot { table: &'static str, name: String },

    #[error("reference slot {name} in table {table} has no entry")]
    OrphanReferenceSlot { table: &'static str, name: String },

    #[error("table {table} holds {len} entries, more than its capacity {max}")]
    OverCapacity {
        table: &'static str,
        len: usize,
        max: usize,
    },

    #[error("entry {name} in table {table} has no handle")]
    MissingHandle { table: &'static str, name: String },

    #[error("entry {name} in table {table} does not name it as owner")]
    NotOwned { table: &'static str, name: String },

    #[error("entry {name} in table {table} is stored under key {key}")]
    NameMismatch {
        table: &'static str,
        key: String,
        name: String,
    },

    #[error("handle {handle} is indexed but resolves to no live entry")]
    StaleIndex { handle: Handle },

    #[error("entry {name} has handle {handle} missing from the document index")]
    UnindexedHandle { name: String, handle: Handle },

    #[error("handle {handle} is assigned to more than one entry")]
    DuplicateHandle { handle: Handle },
}

/// Result of verification.
#[derive(Debug)]
pub struct VerifyResult {
    /// Whether verification passed
    pub ok: bool,
    /// Errors found during verification
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: vec![],
        }
    }

    /// Create a failed result with errors.
    pub fn failure(errors: Vec<VerifyError>) -> Self {
        Self { ok: false, errors }
    }

    /// Build a result from whatever errors were collected.
    pub fn from_errors(errors: Vec<VerifyError>) -> Self {
        if errors.is_empty() {
            Self::success()
        } else {
            Self::failure(errors)
        }
    }
}

/// Verify a single table's invariants.
pub fn verify_table<T: TableEntry>(table: &Table<T>) -> VerifyResult {
    let mut errors = Vec::new();
    collect_table_errors(table, &mut errors);
    VerifyResult::from_errors(errors)
}

pub(crate) fn collect_table_errors<T: TableEntry>(table: &Table<T>, errors: &mut Vec<VerifyError>) {
    let code = table.code_name();

    if table.len() > table.max_capacity() {
        errors.push(VerifyError::OverCapacity {
            table: code,
            len: table.len(),
            max: table.max_capacity(),
        });
    }

    let reference_names: HashSet<_> = table.reference_names().collect();
    for name in table.names() {
        if !reference_names.contains(name) {
            errors.push(VerifyError::MissingReferenceSlot {
                table: code,
                name: name.as_str().to_string(),
            });
        }
    }

    let entry_names: HashSet<_> = table.names().collect();
    for name in table.reference_names() {
        if !entry_names.contains(name) {
            errors.push(VerifyError::OrphanReferenceSlot {
                table: code,
                name: name.as_str().to_string(),
            });
        }
    }

    for key in table.names() {
        let Some(entry) = table.get(key.as_str()) else {
            continue;
        };
        if entry.handle().is_none() {
            errors.push(VerifyError::MissingHandle {
                table: code,
                name: key.as_str().to_string(),
            });
        }
        if entry.owner() != Some(table.id()) {
            errors.push(VerifyError::NotOwned {
                table: code,
                name: key.as_str().to_string(),
            });
        }
        if entry.name().as_str() != key.as_str() {
            errors.push(VerifyError::NameMismatch {
                table: code,
                key: key.as_str().to_string(),
                name: entry.name().as_str().to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::DocumentContext;
    use crate::core::entry::EntryCore;
    use crate::core::types::EntryName;

    #[derive(Debug)]
    struct Probe {
        core: EntryCore,
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

    fn probe(name: &str) -> Probe {
        Probe {
            core: EntryCore::new(EntryName::new(name).unwrap()),
        }
    }

    #[test]
    fn empty_table_verifies() {
        let mut ctx = DocumentContext::new();
        let table: Table<Probe> = Table::new(&mut ctx);

        let result = verify_table(&table);
        assert!(result.ok);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn populated_table_verifies() {
        let mut ctx = DocumentContext::new();
        let mut table = Table::new(&mut ctx);

        table.add(&mut ctx, probe("A"), true).unwrap();
        table.add(&mut ctx, probe("B"), true).unwrap();
        table
            .rename(&mut ctx, "B", EntryName::new("C").unwrap())
            .unwrap();
        table.remove(&mut ctx, "A");

        assert!(verify_table(&table).ok);
    }

    #[test]
    fn verify_error_display() {
        let err = VerifyError::OverCapacity {
            table: "PROBE",
            len: 3,
            max: 2,
        };
        assert!(err.to_string().contains("PROBE"));
        assert!(err.to_string().contains('3'));

        let err = VerifyError::StaleIndex {
            handle: Handle::new(0x2A),
        };
        assert!(err.to_string().contains("2A"));
    }
}
