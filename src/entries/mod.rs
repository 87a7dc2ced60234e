//! entries
//!
//! Concrete table entry kinds a drawing carries.
//!
//! # Modules
//!
//! - [`layer`] - Drawing layers
//! - [`line_type`] - Line patterns
//! - [`text_style`] - Text styles
//! - [`app_id`] - Registered application ids
//! - [`underlay`] - Underlay definitions
//!
//! Each kind embeds an [`EntryCore`](crate::core::entry::EntryCore) and
//! implements [`TableEntry`](crate::core::entry::TableEntry); the kinds that
//! every drawing must contain also provide their reserved defaults.

pub mod app_id;
pub mod layer;
pub mod line_type;
pub mod text_style;
pub mod underlay;

pub use app_id::AppId;
pub use layer::Layer;
pub use line_type::LineType;
pub use text_style::TextStyle;
pub use underlay::UnderlayDefinition;
