//! Chromosome label comparison.
//!
//! Every operation in the crate (sorting, grouping, overlap tests) compares
//! chromosome labels through this module. Comparison is case-insensitive and
//! ordinal: each character is upper-cased with the locale-independent Unicode
//! mapping and then compared by code point. Only one-to-one mappings apply; a
//! character whose upper case expands to several (`ß` -> `SS`) is compared
//! as written. Labels are never rewritten; the original casing always flows
//! through to the output.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

#[inline]
fn fold_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

#[inline]
fn folded(label: &str) -> impl Iterator<Item = char> + '_ {
    label.chars().map(fold_char)
}

/// Feed the case-folded form of `label` into `state`.
pub(crate) fn hash_label<H: Hasher>(label: &str, state: &mut H) {
    for c in folded(label) {
        state.write_u32(c as u32);
    }
    state.write_u8(0xff);
}

/// Compare two chromosome labels, ignoring case.
#[inline]
pub fn compare(a: &str, b: &str) -> Ordering {
    // Fast path: plain ASCII labels (chr1, chrX, scaffold_12...) fold byte-wise.
    if a.is_ascii() && b.is_ascii() {
        return a
            .bytes()
            .map(|c| c.to_ascii_uppercase())
            .cmp(b.bytes().map(|c| c.to_ascii_uppercase()));
    }
    folded(a).cmp(folded(b))
}

/// Returns true if two chromosome labels name the same chromosome.
#[inline]
pub fn same(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    compare(a, b) == Ordering::Equal
}

/// A chromosome label used as a map key.
///
/// `Eq`, `Ord` and `Hash` all go through the case-insensitive comparison, so
/// `chr1` and `CHR1` land in the same group. The first spelling seen is kept.
#[derive(Debug, Clone)]
pub struct ChromKey(String);

impl ChromKey {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The label as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for ChromKey {
    fn eq(&self, other: &Self) -> bool {
        same(&self.0, &other.0)
    }
}

impl Eq for ChromKey {}

impl PartialOrd for ChromKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChromKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.0, &other.0)
    }
}

impl Hash for ChromKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_label(&self.0, state);
    }
}

impl From<&str> for ChromKey {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}
