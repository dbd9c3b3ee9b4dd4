//! Service key types for the dependency injection container.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Prefix reserved for container meta-properties. No registered key may start with it.
pub const RESERVED_PREFIX: &str = "_";

/// Key for service storage and lookup.
///
/// Keys are opaque names. They are cheap to clone (the text is shared behind an
/// `Arc`) and borrow as `str`, so lookups never need to allocate.
///
/// # Examples
///
/// ```rust
/// use keyed_di::Key;
///
/// let key = Key::from("database");
/// assert_eq!(key.as_str(), "database");
/// assert!(!key.is_reserved());
///
/// assert!(Key::from("_scope").is_reserved());
/// assert!(Key::from("").is_reserved());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Arc<str>);

impl Key {
    /// Creates a key from any string-like value.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Key(name.into())
    }

    /// Returns the key text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key may not be registered: it is empty or begins with
    /// [`RESERVED_PREFIX`].
    pub fn is_reserved(&self) -> bool {
        self.0.is_empty() || self.0.starts_with(RESERVED_PREFIX)
    }
}

impl Borrow<str> for Key {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key(Arc::from(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key(Arc::from(name))
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key(Arc::from(name.as_str()))
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", &*self.0)
    }
}

/// Renders keys joined by ` -> `, as in resolution paths and cycles.
pub(crate) struct KeyPath<'a>(pub(crate) &'a [Key]);

impl fmt::Display for KeyPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            f.write_str(key.as_str())?;
        }
        Ok(())
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
