//! Component keys.
//!
//! A block names the component it renders by key (`"input"`, `"button"`).
//! The view owns the component registry; the core only compares keys and
//! ships them back and forth as JSON strings. Pages repeat the same few
//! keys on every block, so keys are interned once per process and a block
//! carries just the `Spur`.

use lasso::{Spur, ThreadedRodeo};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static KEYS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// The component type a block renders.
///
/// `ComponentKey::default()` is the empty key: a block whose component was
/// never set. Deserializing a block without `componentKey` yields it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKey(Spur);

impl ComponentKey {
    pub fn intern(key: &str) -> Self {
        Self(KEYS.get_or_intern(key))
    }

    pub fn as_str(&self) -> &'static str {
        KEYS.resolve(&self.0)
    }

    /// Whether this is the empty key.
    pub fn is_unset(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl Default for ComponentKey {
    fn default() -> Self {
        Self::intern("")
    }
}

impl fmt::Debug for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentKey").field(&self.as_str()).finish()
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct KeyVisitor;

impl Visitor<'_> for KeyVisitor {
    type Value = ComponentKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a component key string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ComponentKey, E> {
        Ok(ComponentKey::intern(v))
    }
}

impl<'de> Deserialize<'de> for ComponentKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(KeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_text_same_key() {
        let a = ComponentKey::intern("input");
        assert_eq!(a, ComponentKey::intern("input"));
        assert_eq!(a.as_str(), "input");
        assert_ne!(a, ComponentKey::intern("button"));
    }

    #[test]
    fn default_key_is_unset() {
        assert!(ComponentKey::default().is_unset());
        assert!(!ComponentKey::intern("select").is_unset());
        assert_eq!(format!("{:?}", ComponentKey::intern("select")), r#"ComponentKey("select")"#);
    }

    #[test]
    fn json_form_is_the_bare_string() {
        let key = ComponentKey::intern("select");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""select""#);
        let back: ComponentKey = serde_json::from_str(r#""select""#).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<ComponentKey>("42").is_err());
    }
}
