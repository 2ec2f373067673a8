// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sorted, de-duplicated set of expanded item ids.

use alloc::vec::Vec;

use crate::error::TreeError;
use crate::types::ItemId;

/// The set of ids whose children are currently shown.
///
/// Storage is a sorted, de-duplicated `Vec`, so membership is a binary search and
/// the set can be handed to a persistence hook as a plain slice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpandedSet {
    ids: Vec<ItemId>,
}

impl ExpandedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from arbitrary ids, normalizing to sorted-unique.
    pub fn from_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        let mut ids: Vec<ItemId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// Number of expanded ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing is expanded.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Membership test, `O(log n)`.
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// The ids in ascending order.
    pub fn as_slice(&self) -> &[ItemId] {
        &self.ids
    }

    /// Insert a single id.
    ///
    /// Inserting an id that is already present is a caller bug and is reported
    /// as [`TreeError::AlreadyExpanded`].
    pub fn insert(&mut self, id: ItemId) -> Result<(), TreeError> {
        match self.ids.binary_search(&id) {
            Ok(_) => {
                tracing::warn!(%id, "expanded set: id inserted twice");
                Err(TreeError::AlreadyExpanded(id))
            }
            Err(pos) => {
                self.ids.insert(pos, id);
                Ok(())
            }
        }
    }

    /// Remove a single id, reporting [`TreeError::NotExpanded`] if absent.
    pub fn remove(&mut self, id: ItemId) -> Result<(), TreeError> {
        match self.ids.binary_search(&id) {
            Ok(pos) => {
                self.ids.remove(pos);
                Ok(())
            }
            Err(_) => {
                tracing::warn!(%id, "expanded set: removing an id that is not expanded");
                Err(TreeError::NotExpanded(id))
            }
        }
    }

    /// Union with `ids`. Returns `true` if the set changed.
    pub fn extend(&mut self, ids: &[ItemId]) -> bool {
        let before = self.ids.len();
        self.ids.extend_from_slice(ids);
        self.ids.sort_unstable();
        self.ids.dedup();
        self.ids.len() != before
    }

    /// Remove every id in `ids`. Returns `true` if the set changed.
    pub fn remove_all(&mut self, ids: &[ItemId]) -> bool {
        let mut doomed = ids.to_vec();
        doomed.sort_unstable();
        let before = self.ids.len();
        self.ids.retain(|id| doomed.binary_search(id).is_err());
        self.ids.len() != before
    }

    /// Replace the contents. Returns `true` if the set changed.
    pub fn replace(&mut self, ids: &[ItemId]) -> bool {
        let next = Self::from_ids(ids.iter().copied());
        if next == *self {
            return false;
        }
        *self = next;
        true
    }
}
