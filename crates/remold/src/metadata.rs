//! Per-call record of what a decode touched.
//!
//! Paths use the same rendering as error locations: dotted field names,
//! bracketed sequence indices and map keys (`Vbar.Vstring`, `Field[2]`,
//! `Extra[other]`). Squash-flattened fields record their flat effective
//! names, without an embedded-field prefix. Entries appear in recording
//! order and are never deduplicated; the `sorted_*` helpers exist for
//! order-insensitive assertions.

/// What one decode call consumed, ignored, and left unfilled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Paths successfully written, in decode order. The root path is never
    /// recorded.
    pub keys: Vec<String>,

    /// Source keys no field matched and no remainder field absorbed.
    pub unused: Vec<String>,

    /// Target fields no source key fed.
    pub unset: Vec<String>,
}

impl Metadata {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_key(&mut self, path: String) {
        self.keys.push(path);
    }

    pub(crate) fn record_unused(&mut self, path: String) {
        self.unused.push(path);
    }

    pub(crate) fn record_unset(&mut self, path: String) {
        self.unset.push(path);
    }

    /// Sorted copy of [`Metadata::keys`].
    pub fn sorted_keys(&self) -> Vec<String> {
        let mut keys = self.keys.clone();
        keys.sort();
        keys
    }

    /// Sorted copy of [`Metadata::unused`].
    pub fn sorted_unused(&self) -> Vec<String> {
        let mut unused = self.unused.clone();
        unused.sort();
        unused
    }

    /// Sorted copy of [`Metadata::unset`].
    pub fn sorted_unset(&self) -> Vec<String> {
        let mut unset = self.unset.clone();
        unset.sort();
        unset
    }
}
