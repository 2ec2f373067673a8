// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory backend and matching drag/rename hooks.

use alloc::{format, string::String, vec, vec::Vec};
use hashbrown::HashMap;

use crate::backend::TreeBackend;
use crate::drag::{DragPolicy, DropOutcome, DropPosition, DropTarget};
use crate::error::TreeError;
use crate::rename::RenameHandler;
use crate::source::PendingItem;
use crate::types::{ItemId, ItemMeta};

#[derive(Clone, Debug)]
struct Entry {
    meta: ItemMeta,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    leaf_only: bool,
    single_select: bool,
}

impl Entry {
    fn new(meta: ItemMeta, parent: Option<ItemId>) -> Self {
        Self {
            meta,
            parent,
            children: Vec::new(),
            leaf_only: false,
            single_select: false,
        }
    }
}

/// A [`TreeBackend`] that keeps every item in a hash map.
///
/// Children keep their insertion order. Used by the tests and the demo, and a
/// reasonable starting point for hosts whose data already lives in memory.
/// [`MemoryHooks`] applies drops, renames, and creations to it.
#[derive(Clone, Debug)]
pub struct MemoryBackend {
    root: ItemId,
    entries: HashMap<ItemId, Entry>,
    next_id: i64,
}

impl MemoryBackend {
    /// Create a backend holding only a root.
    pub fn new(root: ItemId, meta: ItemMeta) -> Self {
        let mut entries = HashMap::new();
        entries.insert(root, Entry::new(meta, None));
        Self {
            root,
            entries,
            next_id: root.0.saturating_add(1).max(1),
        }
    }

    /// A balanced tree of `count` items (root included) where every item has
    /// up to `fanout` children. Ids are `0..count` in breadth-first order.
    pub fn synthetic(count: usize, fanout: usize) -> Self {
        let mut mem = Self::new(ItemId(0), ItemMeta::new("Root"));
        let fanout = fanout.max(1) as i64;
        for i in 1..count as i64 {
            let parent = ItemId((i - 1) / fanout);
            let inserted = mem.insert(ItemId(i), parent, ItemMeta::new(format!("Item {i}")));
            debug_assert!(inserted.is_ok(), "parents precede their children");
        }
        mem
    }

    /// Number of items, root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: there is at least a root.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add `id` as the last child of `parent`.
    pub fn insert(&mut self, id: ItemId, parent: ItemId, meta: ItemMeta) -> Result<(), TreeError> {
        if self.entries.contains_key(&id) {
            return Err(TreeError::DuplicateItem(id));
        }
        let parent_entry = self
            .entries
            .get_mut(&parent)
            .ok_or(TreeError::UnknownItem(parent))?;
        parent_entry.children.push(id);
        self.entries.insert(id, Entry::new(meta, Some(parent)));
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        Ok(())
    }

    /// Add an item with a fresh id as the last child of `parent`.
    pub fn push(&mut self, parent: ItemId, meta: ItemMeta) -> Result<ItemId, TreeError> {
        let id = ItemId(self.next_id);
        self.insert(id, parent, meta)?;
        Ok(id)
    }

    /// Remove `id` and its subtree, returning the removed ids.
    ///
    /// The root itself stays; removing it empties the tree below it.
    pub fn remove(&mut self, id: ItemId) -> Result<Vec<ItemId>, TreeError> {
        let entry = self.entries.get(&id).ok_or(TreeError::UnknownItem(id))?;
        let parent = entry.parent;
        let mut removed = Vec::new();
        let mut stack = if id == self.root {
            core::mem::take(&mut self.entries.get_mut(&id).ok_or(TreeError::UnknownItem(id))?.children)
        } else {
            vec![id]
        };
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.entries.remove(&current) {
                stack.extend(entry.children);
                removed.push(current);
            }
        }
        if let Some(parent) = parent
            && let Some(parent_entry) = self.entries.get_mut(&parent)
        {
            parent_entry.children.retain(|c| *c != id);
        }
        Ok(removed)
    }

    /// Change the label of `id`.
    pub fn rename(&mut self, id: ItemId, label: impl Into<String>) -> Result<(), TreeError> {
        let entry = self.entries.get_mut(&id).ok_or(TreeError::UnknownItem(id))?;
        entry.meta.label = label.into();
        Ok(())
    }

    /// Forbid (or allow) `id` to take children through a drop.
    pub fn set_leaf_only(&mut self, id: ItemId, leaf_only: bool) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.leaf_only = leaf_only;
        }
    }

    /// Forbid (or allow) `id` to take part in a multi-selection.
    pub fn set_single_select(&mut self, id: ItemId, single: bool) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.single_select = single;
        }
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Whether [`move_items`](Self::move_items) would succeed.
    pub fn can_move(&self, ids: &[ItemId], parent: ItemId) -> bool {
        self.entries.contains_key(&parent)
            && !ids.is_empty()
            && ids.iter().all(|id| {
                *id != self.root
                    && *id != parent
                    && self.entries.contains_key(id)
                    && !self.is_ancestor(*id, parent)
            })
    }

    /// Move `ids` under `parent`, after the child `after` (or appended when
    /// `after` is `None` or not a remaining child). Order of `ids` is kept.
    ///
    /// Returns `false` and changes nothing if the move would detach the root,
    /// create a cycle, or mention an unknown id.
    pub fn move_items(&mut self, ids: &[ItemId], parent: ItemId, after: Option<ItemId>) -> bool {
        if !self.can_move(ids, parent) {
            tracing::debug!(%parent, "refusing invalid move");
            return false;
        }
        for id in ids {
            let old_parent = self.entries.get(id).and_then(|e| e.parent);
            if let Some(old) = old_parent.and_then(|p| self.entries.get_mut(&p)) {
                old.children.retain(|c| c != id);
            }
            if let Some(entry) = self.entries.get_mut(id) {
                entry.parent = Some(parent);
            }
        }
        let Some(target) = self.entries.get_mut(&parent) else {
            return false;
        };
        let at = after
            .and_then(|a| target.children.iter().position(|c| *c == a))
            .map_or(target.children.len(), |i| i + 1);
        target.children.splice(at..at, ids.iter().copied());
        true
    }
}

impl TreeBackend for MemoryBackend {
    fn root(&self) -> ItemId {
        self.root
    }

    fn meta(&self, id: ItemId) -> Option<ItemMeta> {
        self.entries.get(&id).map(|e| e.meta.clone())
    }

    fn children(&self, id: ItemId) -> Vec<ItemId> {
        self.entries
            .get(&id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.entries.get(&id).and_then(|e| e.parent)
    }

    fn contains(&self, id: ItemId) -> bool {
        self.entries.contains_key(&id)
    }

    fn has_children(&self, id: ItemId) -> bool {
        self.entries.get(&id).is_some_and(|e| !e.children.is_empty())
    }

    fn can_be_multi_selected(&self, id: ItemId) -> bool {
        self.entries.get(&id).is_some_and(|e| !e.single_select)
    }

    fn can_be_parent(&self, id: ItemId) -> bool {
        self.entries.get(&id).is_some_and(|e| !e.leaf_only)
    }
}

/// Drag and rename hooks that edit a [`MemoryBackend`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryHooks;

impl DragPolicy<MemoryBackend> for MemoryHooks {
    fn accepts(&mut self, backend: &MemoryBackend, dragged: &[ItemId], target: &DropTarget) -> bool {
        backend.can_be_parent(target.parent) && backend.can_move(dragged, target.parent)
    }

    fn perform(
        &mut self,
        backend: &mut MemoryBackend,
        dragged: &[ItemId],
        target: &DropTarget,
    ) -> DropOutcome {
        let after = match target.position {
            DropPosition::Onto => None,
            DropPosition::After(sibling) => Some(sibling),
        };
        if backend.can_be_parent(target.parent) && backend.move_items(dragged, target.parent, after) {
            DropOutcome::Accepted {
                selection: dragged.to_vec(),
            }
        } else {
            DropOutcome::Rejected
        }
    }
}

impl RenameHandler<MemoryBackend> for MemoryHooks {
    fn rename(&mut self, backend: &mut MemoryBackend, id: ItemId, name: &str) -> bool {
        backend.rename(id, name).is_ok()
    }

    fn create(&mut self, backend: &mut MemoryBackend, pending: &PendingItem, name: &str) -> Option<ItemId> {
        let meta = ItemMeta {
            label: name.into(),
            icon: pending.meta.icon,
        };
        backend.push(pending.parent, meta).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(mem: &MemoryBackend, parent: ItemId) -> Vec<String> {
        mem.children(parent)
            .into_iter()
            .filter_map(|c| mem.meta(c).map(|m| m.label))
            .collect()
    }

    fn sample() -> MemoryBackend {
        let mut mem = MemoryBackend::new(ItemId(0), ItemMeta::new("root"));
        for (id, parent, label) in [(1, 0, "a"), (2, 0, "b"), (3, 0, "c"), (4, 1, "a1")] {
            mem.insert(ItemId(id), ItemId(parent), ItemMeta::new(label)).unwrap();
        }
        mem
    }

    #[test]
    fn insert_reports_misuse() {
        let mut mem = sample();
        assert_eq!(
            mem.insert(ItemId(1), ItemId(0), ItemMeta::new("dup")),
            Err(TreeError::DuplicateItem(ItemId(1)))
        );
        assert_eq!(
            mem.insert(ItemId(9), ItemId(77), ItemMeta::new("orphan")),
            Err(TreeError::UnknownItem(ItemId(77)))
        );
        assert_eq!(mem.push(ItemId(0), ItemMeta::new("d")), Ok(ItemId(5)));
    }

    #[test]
    fn move_after_sibling() {
        let mut mem = sample();
        assert!(mem.move_items(&[ItemId(3)], ItemId(0), Some(ItemId(1))));
        assert_eq!(labels(&mem, ItemId(0)), ["a", "c", "b"]);
        assert!(mem.move_items(&[ItemId(2)], ItemId(1), None));
        assert_eq!(labels(&mem, ItemId(1)), ["a1", "b"]);
        assert_eq!(mem.parent(ItemId(2)), Some(ItemId(1)));
    }

    #[test]
    fn cycles_are_refused() {
        let mut mem = sample();
        assert!(!mem.move_items(&[ItemId(1)], ItemId(4), None));
        assert!(!mem.move_items(&[ItemId(0)], ItemId(1), None));
        assert!(!mem.move_items(&[ItemId(1)], ItemId(1), None));
        assert_eq!(labels(&mem, ItemId(0)), ["a", "b", "c"]);
    }

    #[test]
    fn remove_takes_the_subtree() {
        let mut mem = sample();
        let mut removed = mem.remove(ItemId(1)).unwrap();
        removed.sort_unstable();
        assert_eq!(removed, [ItemId(1), ItemId(4)]);
        assert!(!mem.contains(ItemId(4)));
        assert_eq!(labels(&mem, ItemId(0)), ["b", "c"]);
        assert_eq!(mem.remove(ItemId(1)), Err(TreeError::UnknownItem(ItemId(1))));
    }

    #[test]
    fn synthetic_shape() {
        let mem = MemoryBackend::synthetic(10_000, 10);
        assert_eq!(mem.len(), 10_000);
        assert_eq!(mem.children(ItemId(0)).len(), 10);
        assert_eq!(mem.parents_above(ItemId(9_999)).last(), Some(&ItemId(0)));
    }

    #[test]
    fn hooks_apply_edits() {
        let mut mem = sample();
        mem.set_leaf_only(ItemId(2), true);
        let onto_leaf = DropTarget {
            parent: ItemId(2),
            position: DropPosition::Onto,
        };
        assert!(!MemoryHooks.accepts(&mem, &[ItemId(3)], &onto_leaf));
        assert_eq!(
            MemoryHooks.perform(&mut mem, &[ItemId(3)], &onto_leaf),
            DropOutcome::Rejected
        );

        assert!(MemoryHooks.rename(&mut mem, ItemId(3), "renamed"));
        assert!(!MemoryHooks.rename(&mut mem, ItemId(99), "ghost"));
        let pending = PendingItem {
            id: ItemId(-1),
            parent: ItemId(1),
            meta: ItemMeta::new("New"),
        };
        let created = MemoryHooks.create(&mut mem, &pending, "made").unwrap();
        assert_eq!(mem.meta(created).map(|m| m.label), Some("made".into()));
        assert_eq!(mem.parent(created), Some(ItemId(1)));
    }
}
