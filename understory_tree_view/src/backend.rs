// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host collaborator contracts: backend enumeration and expansion persistence.

use alloc::{rc::Rc, vec, vec::Vec};
use core::cell::RefCell;

use crate::types::{ItemId, ItemMeta};

/// Enumeration contract for the backing store behind a data source.
///
/// Only [`root`](TreeBackend::root), [`meta`](TreeBackend::meta),
/// [`children`](TreeBackend::children), and [`parent`](TreeBackend::parent) are
/// required. The structural queries have default implementations built on
/// those, but backends with their own indexes (a database, a scene graph)
/// should override [`parents_above`](TreeBackend::parents_above) and
/// [`parents_below`](TreeBackend::parents_below): the lazy data source relies
/// on them precisely because it cannot see the unexpanded parts of the tree.
///
/// Lookups on ids that no longer exist must not panic. Return `None` or an
/// empty list; callers treat that as "the item was deleted".
pub trait TreeBackend {
    /// Id of the root item.
    fn root(&self) -> ItemId;

    /// Display metadata, or `None` if the id does not exist.
    fn meta(&self, id: ItemId) -> Option<ItemMeta>;

    /// Direct children of `id`, in display order.
    fn children(&self, id: ItemId) -> Vec<ItemId>;

    /// Parent of `id`, or `None` for the root and unknown ids.
    fn parent(&self, id: ItemId) -> Option<ItemId>;

    /// Whether the id exists.
    fn contains(&self, id: ItemId) -> bool {
        self.meta(id).is_some()
    }

    /// Whether `id` currently has children.
    fn has_children(&self, id: ItemId) -> bool {
        !self.children(id).is_empty()
    }

    /// Ancestor chain of `id`, nearest parent first, ending at the root.
    fn parents_above(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// `id` (if it has children) and every descendant that itself has children.
    fn parents_below(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let children = self.children(current);
            if children.is_empty() {
                continue;
            }
            out.push(current);
            stack.extend(children);
        }
        out
    }

    /// Whether `id` may take part in a multi-selection.
    fn can_be_multi_selected(&self, id: ItemId) -> bool {
        let _ = id;
        true
    }

    /// Whether items may be dropped onto `id` to become its children.
    fn can_be_parent(&self, id: ItemId) -> bool {
        let _ = id;
        true
    }
}

/// Persistence hook for the expanded set.
///
/// The data source reads the stored set once on construction and writes the
/// full set after every change. Where and how it is stored is up to the host.
pub trait ExpansionStore {
    /// Read back a previously stored set. Order and duplicates do not matter.
    fn load(&mut self) -> Vec<ItemId>;

    /// Store the current set (sorted, de-duplicated).
    fn save(&mut self, expanded: &[ItemId]);
}

/// No persistence.
impl ExpansionStore for () {
    fn load(&mut self) -> Vec<ItemId> {
        Vec::new()
    }

    fn save(&mut self, _expanded: &[ItemId]) {}
}

/// Keeps the last saved set in memory.
impl ExpansionStore for Vec<ItemId> {
    fn load(&mut self) -> Vec<ItemId> {
        self.clone()
    }

    fn save(&mut self, expanded: &[ItemId]) {
        self.clear();
        self.extend_from_slice(expanded);
    }
}

/// Shared handle, so the host can keep observing the store it handed over.
impl<S: ExpansionStore> ExpansionStore for Rc<RefCell<S>> {
    fn load(&mut self) -> Vec<ItemId> {
        self.borrow_mut().load()
    }

    fn save(&mut self, expanded: &[ItemId]) {
        self.borrow_mut().save(expanded);
    }
}
