//! entries::app_id
//!
//! Registered application ids.

use serde::{Deserialize, Serialize};

use crate::core::entry::{EntryCore, TableEntry};
use crate::core::types::EntryName;

/// Name of the reserved default application id.
pub const ACAD: &str = "ACAD";

/// A registered application id.
///
/// Applications that attach extended data to drawing objects register their
/// name here; the id carries no data of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppId {
    core: EntryCore,
}

impl AppId {
    /// Register an application name.
    pub fn new(name: EntryName) -> Self {
        Self {
            core: EntryCore::new(name),
        }
    }

    /// The reserved default application id.
    pub fn acad() -> Self {
        Self {
            core: EntryCore::reserved(EntryName::known(ACAD)),
        }
    }
}

impl TableEntry for AppId {
    const CODE: &'static str = "APPID";

    fn core(&self) -> &EntryCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntryCore {
        &mut self.core
    }
}
