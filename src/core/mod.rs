//! core
//!
//! Core domain types and the generic table registry for Draftwork.
//!
//! # Modules
//!
//! - [`types`] - Strong types: EntryName, Handle, TableId, RefToken, etc.
//! - [`entry`] - Entry identity and the [`entry::TableEntry`] contract
//! - [`table`] - The generic named-object table registry
//! - [`context`] - Document-scoped handle allocation and global indexing
//! - [`verify`] - Fast verification of table invariants
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Mutation requires `&mut` on both table and context, so one document has
//!   one logical writer at a time
//! - All verification is deterministic and read-only

pub mod context;
pub mod entry;
pub mod table;
pub mod types;
pub mod verify;
