//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`EntryName`] - Validated table entry name, compared case-insensitively
//! - [`Handle`] - Document-scoped unique identifier for a registered entry
//! - [`TableId`] - Identifier of a table within one document
//! - [`RefToken`] - Opaque token recorded against an entry by its referents
//! - [`UtcTimestamp`] - RFC3339 timestamp
//! - [`Fingerprint`] - Document state hash for out-of-band change detection
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use draftwork::core::types::{EntryName, Handle};
//!
//! // Valid constructions
//! let name = EntryName::new("Dimension Lines").unwrap();
//! let handle = Handle::new(0x1F);
//! assert_eq!(handle.to_string(), "1F");
//!
//! // Invalid constructions fail at creation time
//! assert!(EntryName::new("").is_err());
//! assert!(EntryName::new("bad/name").is_err());
//! ```

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("invalid entry name: {0}")]
    InvalidEntryName(String),
}

/// A validated table entry name.
///
/// Entry names follow the rules drawing files impose on table entries:
/// - Cannot be empty or consist only of whitespace
/// - Cannot contain `\`, `<`, `>`, `/`, `?`, `"`, `:`, `;`, `*`, `|`, `,`,
///   `=`, or `` ` ``
/// - Cannot contain ASCII control characters
///
/// Names compare and hash **case-insensitively**, so `"Walls"` and `"WALLS"`
/// are the same name. The spelling given at construction is preserved for
/// display and round-tripping.
///
/// # Example
///
/// ```
/// use draftwork::core::types::EntryName;
///
/// let a = EntryName::new("Hidden Lines").unwrap();
/// let b = EntryName::new("HIDDEN LINES").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "Hidden Lines");
///
/// assert!(EntryName::new("").is_err());
/// assert!(EntryName::new("a*b").is_err());
/// assert!(EntryName::new("tab\there").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryName(String);

/// Characters a table entry name may not contain.
const INVALID_CHARS: [char; 13] = [
    '\\', '<', '>', '/', '?', '"', ':', ';', '*', '|', ',', '=', '`',
];

impl EntryName {
    /// Create a new validated entry name.
    ///
    /// # Errors
    ///
    /// Returns `NameError::InvalidEntryName` if the name violates the rules
    /// drawing tables impose on entry names.
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Construct from a name the crate itself defines.
    ///
    /// Safe because the fixed reserved names are valid by inspection.
    pub(crate) fn known(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Validate an entry name.
    fn validate(name: &str) -> Result<(), NameError> {
        if name.is_empty() {
            return Err(NameError::InvalidEntryName(
                "entry name cannot be empty".into(),
            ));
        }

        if name.chars().all(char::is_whitespace) {
            return Err(NameError::InvalidEntryName(
                "entry name cannot be blank".into(),
            ));
        }

        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(NameError::InvalidEntryName(format!(
                    "entry name cannot contain '{c}'"
                )));
            }
        }

        for c in name.chars() {
            if c.is_ascii_control() {
                return Err(NameError::InvalidEntryName(
                    "entry name cannot contain control characters".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the entry name as a string slice, in its original spelling.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded characters used for comparison and hashing.
    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars().flat_map(char::to_lowercase)
    }
}

impl PartialEq for EntryName {
    fn eq(&self, other: &Self) -> bool {
        self.folded().eq(other.folded())
    }
}

impl Eq for EntryName {}

impl Hash for EntryName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.folded() {
            c.hash(state);
        }
    }
}

impl PartialEq<str> for EntryName {
    fn eq(&self, other: &str) -> bool {
        self.folded().eq(other.chars().flat_map(char::to_lowercase))
    }
}

impl PartialEq<&str> for EntryName {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl TryFrom<String> for EntryName {
    type Error = NameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<EntryName> for String {
    fn from(name: EntryName) -> Self {
        name.0
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A document-scoped unique identifier for a registered entry.
///
/// Handles are assigned once by the document context, increase monotonically,
/// and are never reused, even after the entry they identified is removed.
/// They display as uppercase hexadecimal, the drawing-file convention.
///
/// # Example
///
/// ```
/// use draftwork::core::types::Handle;
///
/// let handle = Handle::new(0x2A);
/// assert_eq!(handle.get(), 42);
/// assert_eq!(handle.to_string(), "2A");
/// assert!(!handle.is_null());
/// assert!(Handle::NULL.is_null());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(u64);

impl Handle {
    /// The null handle. Never issued by a document context.
    pub const NULL: Handle = Handle(0);

    /// Create a handle from its raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Check if this is the null handle.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

/// Identifier of a table within one document.
///
/// Allocated by the document context when a table is constructed. An entry's
/// owner back-reference stores this identifier rather than any ownership
/// link, so tables and entries never form reference cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(u32);

impl TableId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw table id value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque reference token.
///
/// External collaborators record one token per relationship they create to a
/// table entry (an entity on a layer, text using a style). The table only
/// counts tokens; it never interprets them.
///
/// # Example
///
/// ```
/// use draftwork::core::types::RefToken;
///
/// let a = RefToken::new();
/// let b = RefToken::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefToken(Uuid);

impl RefToken {
    /// Create a fresh, unique token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RefToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RefToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp in RFC3339 format.
///
/// # Example
///
/// ```
/// use draftwork::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// println!("Current time: {}", now);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// A stable hash over table state for out-of-band change detection.
///
/// The fingerprint is computed over a set of `(key, handle)` pairs, one per
/// registered entry, where the key identifies the entry within its document
/// (the document facade uses `TABLE/name`). Pairs are sorted before hashing,
/// so the fingerprint is independent of insertion order.
///
/// # Example
///
/// ```
/// use draftwork::core::types::{Fingerprint, Handle};
///
/// let state = vec![
///     ("LAYER/Walls".to_string(), Handle::new(5)),
///     ("LTYPE/Dashed".to_string(), Handle::new(6)),
/// ];
///
/// let fp = Fingerprint::compute(&state);
///
/// // Same state produces the same fingerprint
/// assert_eq!(fp, Fingerprint::compute(&state));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from a set of `(key, handle)` pairs.
    ///
    /// The pairs are sorted by key, then handle, before hashing to ensure
    /// determinism regardless of input order.
    pub fn compute(state: &[(String, Handle)]) -> Self {
        let sorted: BTreeSet<_> = state.iter().collect();

        let mut hasher = Sha256::new();
        for (key, handle) in sorted {
            hasher.update(key.as_bytes());
            hasher.update(b"\0");
            hasher.update(handle.get().to_be_bytes());
            hasher.update(b"\n");
        }

        let result = hasher.finalize();
        Self(hex::encode(result))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod entry_name {
        use super::*;

        #[test]
        fn valid_entry_names() {
            assert!(EntryName::new("0").is_ok());
            assert!(EntryName::new("Walls").is_ok());
            assert!(EntryName::new("Dimension Lines").is_ok());
            assert!(EntryName::new("floor-2_annex").is_ok());
            assert!(EntryName::new("Überschrift").is_ok());
        }

        #[test]
        fn empty_name_rejected() {
            assert!(EntryName::new("").is_err());
        }

        #[test]
        fn blank_name_rejected() {
            assert!(EntryName::new("   ").is_err());
            assert!(EntryName::new("\u{a0}").is_err());
        }

        #[test]
        fn special_chars_rejected() {
            assert!(EntryName::new("a\\b").is_err());
            assert!(EntryName::new("a<b").is_err());
            assert!(EntryName::new("a>b").is_err());
            assert!(EntryName::new("a/b").is_err());
            assert!(EntryName::new("a?b").is_err());
            assert!(EntryName::new("a\"b").is_err());
            assert!(EntryName::new("a:b").is_err());
            assert!(EntryName::new("a;b").is_err());
            assert!(EntryName::new("a*b").is_err());
            assert!(EntryName::new("a|b").is_err());
            assert!(EntryName::new("a,b").is_err());
            assert!(EntryName::new("a=b").is_err());
            assert!(EntryName::new("a`b").is_err());
        }

        #[test]
        fn control_chars_rejected() {
            assert!(EntryName::new("has\ttab").is_err());
            assert!(EntryName::new("has\nnewline").is_err());
            assert!(EntryName::new("has\x7fDEL").is_err());
        }

        #[test]
        fn comparison_is_case_insensitive() {
            let a = EntryName::new("Layer1").unwrap();
            let b = EntryName::new("LAYER1").unwrap();
            let c = EntryName::new("layer2").unwrap();

            assert_eq!(a, b);
            assert_ne!(a, c);
            assert_eq!(a, "layer1");
            assert_ne!(a, "layer10");
        }

        #[test]
        fn hash_matches_equality() {
            use std::collections::HashSet;

            let mut set = HashSet::new();
            set.insert(EntryName::new("Walls").unwrap());
            assert!(set.contains(&EntryName::new("WALLS").unwrap()));
            assert!(!set.contains(&EntryName::new("Wall").unwrap()));
        }

        #[test]
        fn spelling_preserved() {
            let name = EntryName::new("HiDdEn").unwrap();
            assert_eq!(name.as_str(), "HiDdEn");
            assert_eq!(name.to_string(), "HiDdEn");
        }

        #[test]
        fn serde_roundtrip() {
            let name = EntryName::new("Centerlines").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            let parsed: EntryName = serde_json::from_str(&json).unwrap();
            assert_eq!(name, parsed);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<EntryName, _> = serde_json::from_str("\"a|b\"");
            assert!(result.is_err());
        }
    }

    mod handle {
        use super::*;

        #[test]
        fn displays_as_uppercase_hex() {
            assert_eq!(Handle::new(10).to_string(), "A");
            assert_eq!(Handle::new(0x1FF).to_string(), "1FF");
        }

        #[test]
        fn null_handle() {
            assert!(Handle::NULL.is_null());
            assert!(!Handle::new(1).is_null());
        }

        #[test]
        fn ordering_follows_raw_value() {
            assert!(Handle::new(1) < Handle::new(2));
            assert!(Handle::new(0xFF) < Handle::new(0x100));
        }

        #[test]
        fn serde_roundtrip() {
            let handle = Handle::new(77);
            let json = serde_json::to_string(&handle).unwrap();
            assert_eq!(json, "77");
            let parsed: Handle = serde_json::from_str(&json).unwrap();
            assert_eq!(handle, parsed);
        }
    }

    mod ref_token {
        use super::*;

        #[test]
        fn tokens_are_unique() {
            let a = RefToken::new();
            let b = RefToken::new();
            assert_ne!(a, b);
        }

        #[test]
        fn serde_roundtrip() {
            let token = RefToken::new();
            let json = serde_json::to_string(&token).unwrap();
            let parsed: RefToken = serde_json::from_str(&json).unwrap();
            assert_eq!(token, parsed);
        }
    }

    mod fingerprint {
        use super::*;

        fn pair(key: &str, handle: u64) -> (String, Handle) {
            (key.to_string(), Handle::new(handle))
        }

        #[test]
        fn deterministic() {
            let state = vec![pair("LAYER/Walls", 5), pair("LTYPE/Dashed", 6)];
            assert_eq!(Fingerprint::compute(&state), Fingerprint::compute(&state));
        }

        #[test]
        fn order_independent() {
            let forward = vec![pair("LAYER/Walls", 5), pair("LTYPE/Dashed", 6)];
            let reverse = vec![pair("LTYPE/Dashed", 6), pair("LAYER/Walls", 5)];
            assert_eq!(
                Fingerprint::compute(&forward),
                Fingerprint::compute(&reverse)
            );
        }

        #[test]
        fn different_state_different_fingerprint() {
            let a = vec![pair("LAYER/Walls", 5)];
            let b = vec![pair("LAYER/Walls", 6)];
            let c = vec![pair("LAYER/Roof", 5)];
            assert_ne!(Fingerprint::compute(&a), Fingerprint::compute(&b));
            assert_ne!(Fingerprint::compute(&a), Fingerprint::compute(&c));
        }

        #[test]
        fn empty_state() {
            let fp = Fingerprint::compute(&[]);
            assert!(!fp.as_str().is_empty());
        }
    }

    mod utc_timestamp {
        use super::*;

        #[test]
        fn now_works() {
            let ts = UtcTimestamp::now();
            assert!(ts.to_string().contains('T'));
        }

        #[test]
        fn serde_roundtrip() {
            let ts = UtcTimestamp::now();
            let json = serde_json::to_string(&ts).unwrap();
            let parsed: UtcTimestamp = serde_json::from_str(&json).unwrap();
            assert_eq!(ts, parsed);
        }
    }
}
