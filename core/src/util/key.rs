//! Case folding for script identifiers.
//!
//! Every name-keyed table in the runtime (object names, namespace keys,
//! function names, field keys) is case-insensitive. Keys are folded once on
//! the way in so lookups stay plain map hits.

/// Fold an identifier to its canonical lookup form.
#[inline]
pub fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// True when two identifiers fold to the same key.
#[inline]
pub fn eq_folded(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
