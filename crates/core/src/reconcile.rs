//! Attachment Reconciler.
//!
//! Computes the next state of an attachment collection from its persisted
//! state and an edit's added/removed sets. Membership is decided by
//! `Attachment::semantic_key`, never by full-value equality. Result order is
//! by semantic key; callers must not rely on it.

use std::collections::BTreeMap;

use crate::attachment::Attachment;

/// Diff-apply: `(current \ removed) ∪ added`.
///
/// A key present in both `added` and `removed` ends up present. An added value
/// replaces a current value with the same key.
pub fn diff_apply<A: Attachment>(current: &[A], added: &[A], removed: &[A]) -> Vec<A> {
    let mut by_key = index(current);
    for value in removed {
        by_key.remove(&value.semantic_key());
    }
    for value in added {
        by_key.insert(value.semantic_key(), value.clone());
    }
    by_key.into_values().collect()
}

/// Union-apply: `(current ∪ added) \ removed`.
///
/// Existing values are never dropped for being absent from the edit. On a key
/// collision the current value is kept.
pub fn union_apply<A: Attachment>(current: &[A], added: &[A], removed: &[A]) -> Vec<A> {
    let mut by_key = index(current);
    for value in added {
        by_key
            .entry(value.semantic_key())
            .or_insert_with(|| value.clone());
    }
    for value in removed {
        by_key.remove(&value.semantic_key());
    }
    by_key.into_values().collect()
}

fn index<A: Attachment>(values: &[A]) -> BTreeMap<A::Key, A> {
    let mut by_key = BTreeMap::new();
    for value in values {
        by_key
            .entry(value.semantic_key())
            .or_insert_with(|| value.clone());
    }
    by_key
}
