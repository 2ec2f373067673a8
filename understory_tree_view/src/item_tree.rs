// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Materialized item storage: the in-memory projection built by a fetch.

use alloc::{vec, vec::Vec};
use smallvec::SmallVec;

use crate::types::{IconHandle, ItemId, ItemMeta};

/// Handle to a materialized item.
///
/// Handles are tagged with the epoch of the fetch that created them. Every fetch
/// rebuilds the projection wholesale, so a handle kept across a fetch resolves
/// to `None` instead of aliasing an unrelated item.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeRef(pub(crate) u32, pub(crate) u32);

impl NodeRef {
    pub(crate) const fn new(idx: u32, epoch: u32) -> Self {
        Self(idx, epoch)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn epoch(self) -> u32 {
        self.1
    }
}

/// Children of a materialized item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Children {
    /// Children are loaded, in backend order. May be empty.
    Loaded(Vec<NodeRef>),
    /// The item has children in the backend that were not loaded.
    ///
    /// Lazy sources attach this to collapsed items so a disclosure affordance
    /// can be drawn without enumerating the subtree.
    Placeholder,
}

/// A single materialized item.
#[derive(Clone, Debug)]
pub struct TreeItem {
    id: ItemId,
    depth: u32,
    parent: Option<NodeRef>,
    children: Children,
    meta: ItemMeta,
}

impl TreeItem {
    /// The item's id.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Distance from the root; the root has depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Parent handle (traversal only), or `None` for the root.
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    /// The item's children.
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Loaded children. Empty for placeholders.
    pub fn child_refs(&self) -> &[NodeRef] {
        match &self.children {
            Children::Loaded(c) => c,
            Children::Placeholder => &[],
        }
    }

    /// Whether the item has children, loaded or not.
    pub fn has_children(&self) -> bool {
        match &self.children {
            Children::Loaded(c) => !c.is_empty(),
            Children::Placeholder => true,
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.meta.label
    }

    /// Display icon.
    pub fn icon(&self) -> Option<IconHandle> {
        self.meta.icon
    }

    /// Full display metadata.
    pub fn meta(&self) -> &ItemMeta {
        &self.meta
    }
}

/// Arena of materialized items with a single root.
///
/// Data sources own one of these and rebuild it from scratch on every fetch.
#[derive(Clone, Debug, Default)]
pub struct ItemTree {
    items: Vec<TreeItem>,
    root: Option<NodeRef>,
    epoch: u32,
}

impl ItemTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every item and invalidate all outstanding handles.
    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.root = None;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Current epoch. Bumped by every rebuild.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Number of materialized items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is materialized.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The root handle, if the tree has been built.
    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }

    fn alloc(&mut self, item: TreeItem) -> NodeRef {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeRef uses 32-bit indices by design."
        )]
        let node = NodeRef::new(self.items.len() as u32, self.epoch);
        self.items.push(item);
        node
    }

    /// Replace the contents with a lone root.
    pub(crate) fn set_root(&mut self, id: ItemId, meta: ItemMeta) -> NodeRef {
        self.clear();
        let root = self.alloc(TreeItem {
            id,
            depth: 0,
            parent: None,
            children: Children::Loaded(Vec::new()),
            meta,
        });
        self.root = Some(root);
        root
    }

    /// Append a child under `parent`. A placeholder on `parent` is replaced.
    pub(crate) fn push_child(&mut self, parent: NodeRef, id: ItemId, meta: ItemMeta) -> NodeRef {
        let depth = self.items[parent.idx()].depth + 1;
        let node = self.alloc(TreeItem {
            id,
            depth,
            parent: Some(parent),
            children: Children::Loaded(Vec::new()),
            meta,
        });
        let slot = &mut self.items[parent.idx()].children;
        match slot {
            Children::Loaded(c) => c.push(node),
            Children::Placeholder => *slot = Children::Loaded(vec![node]),
        }
        node
    }

    /// Mark `node` as having unloaded children.
    pub(crate) fn set_placeholder(&mut self, node: NodeRef) {
        if let Some(item) = self.get_mut(node) {
            debug_assert!(
                item.child_refs().is_empty(),
                "placeholder would orphan loaded children"
            );
            item.children = Children::Placeholder;
        }
    }

    /// Resolve a handle. Stale handles from an earlier fetch yield `None`.
    pub fn get(&self, node: NodeRef) -> Option<&TreeItem> {
        if node.epoch() != self.epoch {
            return None;
        }
        self.items.get(node.idx())
    }

    fn get_mut(&mut self, node: NodeRef) -> Option<&mut TreeItem> {
        if node.epoch() != self.epoch {
            return None;
        }
        self.items.get_mut(node.idx())
    }

    /// Depth-first search for `id` over the materialized items.
    pub fn find(&self, id: ItemId) -> Option<NodeRef> {
        self.iter_depth_first()
            .find(|(_, item)| item.id == id)
            .map(|(node, _)| node)
    }

    /// Parent of `node`, or `None` for the root and stale handles.
    pub fn parent_of(&self, node: NodeRef) -> Option<NodeRef> {
        self.get(node).and_then(|item| item.parent)
    }

    /// Ancestors of `node`, nearest first. Excludes `node` itself.
    pub fn ancestors(&self, node: NodeRef) -> SmallVec<[NodeRef; 16]> {
        let mut out = SmallVec::new();
        let mut current = self.parent_of(node);
        while let Some(p) = current {
            out.push(p);
            current = self.parent_of(p);
        }
        out
    }

    /// Ids of `node` and every materialized descendant that itself has children.
    pub fn descendants_with_children(&self, node: NodeRef) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let Some(item) = self.get(n) else {
                continue;
            };
            if item.has_children() {
                out.push(item.id);
            }
            stack.extend(item.child_refs().iter().rev().copied());
        }
        out
    }

    /// Pre-order traversal of every materialized item, starting at the root.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }
}

/// Pre-order iterator over an [`ItemTree`].
#[derive(Debug)]
pub struct DepthFirst<'a> {
    tree: &'a ItemTree,
    stack: Vec<NodeRef>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (NodeRef, &'a TreeItem);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let item = self.tree.get(node)?;
        self.stack.extend(item.child_refs().iter().rev().copied());
        Some((node, item))
    }
}
