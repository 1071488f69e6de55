//! The coercible scalar cell used for every script value.
//!
//! A cell keeps three representations of one scalar (text, integer, float)
//! with exactly one of them canonical at a time. Fresh cells are
//! text-canonical with empty text. A cell that has ever been explicitly
//! text-typed keeps presenting its textual identity even when numerically
//! updated; only `from_int`/`from_float` temporaries and numeric-on-numeric
//! writes skip the round-trip through text.

use std::borrow::Cow;

use super::num;

/// Resolves an identifier to a live object identity.
///
/// In text mode, numeric reads try this before parsing: `"Player"` coerces
/// to the Player object's id when one is registered. The object registry is
/// the real implementor; [`NoIdentities`] serves contexts without one.
pub trait IdentityLookup {
    fn identity_of(&self, name: &str) -> Option<i64>;
}

/// An [`IdentityLookup`] with no objects behind it.
pub struct NoIdentities;

impl IdentityLookup for NoIdentities {
    fn identity_of(&self, _name: &str) -> Option<i64> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Canon {
    Text,
    Int,
    Float,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueCell {
    canon: Canon,
    int: i64,
    float: f64,
    /// Cached text. Always present in text mode; absent in numeric mode
    /// until a text-mode transition recomputes it.
    text: Option<String>,
}

impl Default for ValueCell {
    fn default() -> Self {
        Self {
            canon: Canon::Text,
            int: 0,
            float: 0.0,
            text: Some(String::new()),
        }
    }
}

impl ValueCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let mut cell = Self::new();
        cell.set_text(text);
        cell
    }

    /// A fresh integer temporary: int-canonical, no text cached.
    pub fn from_int(v: i64) -> Self {
        Self {
            canon: Canon::Int,
            int: v,
            float: v as f64,
            text: None,
        }
    }

    /// A fresh float temporary: float-canonical, no text cached.
    pub fn from_float(v: f64) -> Self {
        Self {
            canon: Canon::Float,
            int: num::round_to_int(v),
            float: v,
            text: None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self.canon, Canon::Int | Canon::Float)
    }

    /// Integer view. Text mode resolves the text as an object name first,
    /// then falls back to a leading-integer parse; numeric mode returns the
    /// stored field directly. Never fails.
    pub fn int_value(&self, idents: &dyn IdentityLookup) -> i64 {
        if self.is_numeric() {
            return self.int;
        }
        let text = self.text.as_deref().unwrap_or("");
        if let Some(id) = idents.identity_of(text) {
            return id;
        }
        num::parse_int_prefix(text)
    }

    /// Float view, with the same identifier-first rule as [`int_value`].
    ///
    /// [`int_value`]: ValueCell::int_value
    pub fn float_value(&self, idents: &dyn IdentityLookup) -> f64 {
        if self.is_numeric() {
            return self.float;
        }
        let text = self.text.as_deref().unwrap_or("");
        if let Some(id) = idents.identity_of(text) {
            return id as f64;
        }
        num::parse_float_prefix(text)
    }

    /// Text view: verbatim stored text in text mode, the canonical numeric
    /// field formatted on demand otherwise.
    pub fn text_value(&self) -> Cow<'_, str> {
        match self.canon {
            Canon::Text => Cow::Borrowed(self.text.as_deref().unwrap_or("")),
            Canon::Int => Cow::Owned(num::format_int(self.int)),
            Canon::Float => Cow::Owned(num::format_float(self.float)),
        }
    }

    pub fn set_int(&mut self, v: i64) {
        if self.is_numeric() {
            self.canon = Canon::Int;
            self.int = v;
            self.float = v as f64;
            self.text = None;
        } else {
            // Text-canonical cells refresh their cached text eagerly so the
            // string read path stays consistent with the numeric fields.
            self.int = v;
            self.float = v as f64;
            self.text = Some(num::format_int(v));
        }
    }

    pub fn set_float(&mut self, v: f64) {
        if self.is_numeric() {
            self.canon = Canon::Float;
            self.float = v;
            self.int = num::round_to_int(v);
            self.text = None;
        } else {
            self.float = v;
            self.int = num::round_to_int(v);
            self.text = Some(num::format_float(v));
        }
    }

    /// Force text mode and reparse both numeric caches from the new text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.float = num::parse_float_prefix(&text);
        self.int = num::round_to_int(self.float);
        self.canon = Canon::Text;
        self.text = Some(text);
    }
}
