//! Keyboard binding strings.
//!
//! Commands declare bindings as `"ctrl+z"`, `"ctrl+shift+z"`, `"delete"`.
//! Modifiers may appear in any order and the base key is case-insensitive.
//! Key events from the view are assembled into the same `KeyCombo` so the
//! comparison is structural, not textual.
//!
//! | Modifier | Canonical name |
//! |----------|----------------|
//! | Ctrl / ⌘ | `ctrl`         |
//! | Shift    | `shift`        |
//! | Alt / ⌥  | `alt`          |

use crate::input::Modifiers;
use std::fmt;
use std::str::FromStr;

/// A parsed key binding: modifier flags plus a normalized base key name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub key: String,
}

impl KeyCombo {
    /// A bare key with no modifiers.
    pub fn key(key: &str) -> Self {
        Self {
            ctrl: false,
            shift: false,
            alt: false,
            key: normalize_key(key),
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Assemble a combo from a key event. `key` is the `KeyboardEvent.key`
    /// value (e.g. `"z"`, `"ArrowUp"`, `"Delete"`); `meta` folds into `ctrl`.
    pub fn from_event(key: &str, modifiers: Modifiers) -> Self {
        Self {
            ctrl: modifiers.command(),
            shift: modifiers.shift,
            alt: modifiers.alt,
            key: normalize_key(key),
        }
    }
}

/// Lowercase the key name and map the few DOM names that differ from the
/// binding vocabulary.
fn normalize_key(key: &str) -> String {
    if key == " " {
        return "space".to_string();
    }
    let lower = key.trim().to_ascii_lowercase();
    match lower.as_str() {
        "del" => "delete".to_string(),
        "esc" => "escape".to_string(),
        other => other.strip_prefix("arrow").unwrap_or(other).to_string(),
    }
}

impl FromStr for KeyCombo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut combo = KeyCombo::key("");
        let mut base = None;
        for part in s.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "meta" | "cmd" => combo.ctrl = true,
                "shift" => combo.shift = true,
                "alt" => combo.alt = true,
                "" => return Err(format!("empty key in {s:?}")),
                _ if base.is_some() => return Err(format!("more than one base key in {s:?}")),
                _ => base = Some(normalize_key(part)),
            }
        }
        combo.key = base.ok_or_else(|| format!("no base key in {s:?}"))?;
        Ok(combo)
    }
}

impl fmt::Display for KeyCombo {
    /// Canonical order: ctrl, shift, alt, base key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        f.write_str(&self.key)
    }
}
