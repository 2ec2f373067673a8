// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The data source abstraction: materialized tree, expanded set, and the
//! cached visible-row projection.

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use crate::backend::{ExpansionStore, TreeBackend};
use crate::error::TreeError;
use crate::expanded::ExpandedSet;
use crate::item_tree::{ItemTree, NodeRef, TreeItem};
use crate::types::{ItemId, ItemMeta};

/// Data source configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    /// Whether the root occupies a row.
    ///
    /// A hidden root still gates its children through the expanded set:
    /// collapsing it leaves zero rows.
    pub show_root: bool,
    /// Expand the root when the persisted expanded set is empty.
    pub expand_root_by_default: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            show_root: false,
            expand_root_by_default: true,
        }
    }
}

impl SourceConfig {
    /// Show or hide the root row.
    #[must_use]
    pub fn with_show_root(mut self, show_root: bool) -> Self {
        self.show_root = show_root;
        self
    }

    /// Whether the root starts expanded when nothing was persisted.
    #[must_use]
    pub fn with_expand_root_by_default(mut self, expand: bool) -> Self {
        self.expand_root_by_default = expand;
        self
    }
}

/// An uncommitted item spliced into the visible rows, used for
/// "create, then name it" flows. It never touches the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingItem {
    /// Ephemeral id. Must not collide with backend ids.
    pub id: ItemId,
    /// Committed parent the item will be created under.
    pub parent: ItemId,
    /// Initial label and icon.
    pub meta: ItemMeta,
}

/// One entry of the visible-row projection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Row {
    /// A materialized item.
    Committed {
        /// The item's id.
        id: ItemId,
        /// Handle into the data source's [`ItemTree`].
        node: NodeRef,
        /// Tree depth (root = 0).
        depth: u32,
    },
    /// The pending item, if one is inserted.
    Pending {
        /// The pending item.
        item: PendingItem,
        /// Tree depth it will have once created.
        depth: u32,
    },
}

impl Row {
    /// The row's id (ephemeral for pending rows).
    pub fn id(&self) -> ItemId {
        match self {
            Self::Committed { id, .. } => *id,
            Self::Pending { item, .. } => item.id,
        }
    }

    /// Tree depth of the row (root = 0).
    pub fn depth(&self) -> u32 {
        match self {
            Self::Committed { depth, .. } | Self::Pending { depth, .. } => *depth,
        }
    }

    /// The item handle, for committed rows.
    pub fn node(&self) -> Option<NodeRef> {
        match self {
            Self::Committed { node, .. } => Some(*node),
            Self::Pending { .. } => None,
        }
    }

    /// Returns `true` for the pending row.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// State shared by every data source implementation.
///
/// Holds the materialized tree, the expanded set and its persistence hook, the
/// pending item, and the cached rows together with two dirty flags:
/// `tree_stale` (the tree must be fetched again) and `rows_dirty` (only the row
/// projection must be recomputed). Both are pull-based: mutations set them and
/// the next [`DataSource::visible_rows`] call does the work once.
pub struct SourceCore {
    pub(crate) config: SourceConfig,
    pub(crate) tree: ItemTree,
    pub(crate) expanded: ExpandedSet,
    store: Box<dyn ExpansionStore>,
    rows: Vec<Row>,
    pending: Option<PendingItem>,
    tree_stale: bool,
    rows_dirty: bool,
    rows_generation: u64,
}

impl fmt::Debug for SourceCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCore")
            .field("config", &self.config)
            .field("items", &self.tree.len())
            .field("rows", &self.rows.len())
            .field("expanded", &self.expanded.len())
            .field("pending", &self.pending)
            .field("tree_stale", &self.tree_stale)
            .field("rows_dirty", &self.rows_dirty)
            .field("rows_generation", &self.rows_generation)
            .finish_non_exhaustive()
    }
}

impl SourceCore {
    /// Create the shared state, reading the persisted expanded set from `store`.
    pub fn new(config: SourceConfig, root: ItemId, mut store: Box<dyn ExpansionStore>) -> Self {
        let mut expanded = ExpandedSet::from_ids(store.load());
        if expanded.is_empty() && config.expand_root_by_default {
            expanded.extend(&[root]);
        }
        Self {
            config,
            tree: ItemTree::new(),
            expanded,
            store,
            rows: Vec::new(),
            pending: None,
            tree_stale: true,
            rows_dirty: true,
            rows_generation: 0,
        }
    }

    /// Configuration this source was built with.
    pub fn config(&self) -> SourceConfig {
        self.config
    }

    /// The materialized tree as of the last fetch.
    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    /// The expanded set.
    pub fn expanded(&self) -> &ExpandedSet {
        &self.expanded
    }

    /// The cached rows. May be stale; prefer [`DataSource::visible_rows`].
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The pending item, if any.
    pub fn pending(&self) -> Option<&PendingItem> {
        self.pending.as_ref()
    }

    /// Counter bumped every time the rows are recomputed.
    pub fn rows_generation(&self) -> u64 {
        self.rows_generation
    }

    /// Whether the next row request will fetch the tree again.
    pub fn is_tree_stale(&self) -> bool {
        self.tree_stale
    }

    /// Whether the next row request will recompute the rows.
    pub fn needs_refresh(&self) -> bool {
        self.tree_stale || self.rows_dirty
    }

    /// Request a full fetch on the next row request.
    pub fn mark_tree_stale(&mut self) {
        self.tree_stale = true;
        self.rows_dirty = true;
    }

    /// Request a row recomputation on the next row request.
    pub fn mark_rows_dirty(&mut self) {
        self.rows_dirty = true;
    }

    /// Write the expanded set through the persistence hook.
    pub fn persist(&mut self) {
        self.store.save(self.expanded.as_slice());
    }

    /// Call after a fetch has rebuilt [`ItemTree`]; recomputes the rows.
    pub fn finish_fetch(&mut self) {
        self.tree_stale = false;
        self.rebuild_rows();
    }

    /// Recompute the visible rows from the materialized tree.
    pub fn rebuild_rows(&mut self) {
        let mut rows = core::mem::take(&mut self.rows);
        rows.clear();

        if let Some(root) = self.tree.root()
            && let Some(root_item) = self.tree.get(root)
        {
            if self.config.show_root {
                rows.push(committed(root, root_item));
            }
            let mut stack: Vec<NodeRef> = Vec::new();
            if self.expanded.contains(root_item.id()) {
                stack.extend(root_item.child_refs().iter().rev().copied());
            }
            while let Some(node) = stack.pop() {
                let Some(item) = self.tree.get(node) else {
                    continue;
                };
                rows.push(committed(node, item));
                if self.expanded.contains(item.id()) {
                    stack.extend(item.child_refs().iter().rev().copied());
                }
            }
        }

        if let Some(pending) = &self.pending {
            splice_pending(&mut rows, pending, &self.tree, self.config.show_root);
        }

        self.rows = rows;
        self.rows_dirty = false;
        self.rows_generation += 1;
        tracing::trace!(
            rows = self.rows.len(),
            generation = self.rows_generation,
            "rebuilt visible rows"
        );
    }
}

fn committed(node: NodeRef, item: &TreeItem) -> Row {
    Row::Committed {
        id: item.id(),
        node,
        depth: item.depth(),
    }
}

/// Place the pending row as the first child of its parent's row.
fn splice_pending(rows: &mut Vec<Row>, pending: &PendingItem, tree: &ItemTree, show_root: bool) {
    let parent_row = rows.iter().position(|r| r.id() == pending.parent);
    let root_id = tree.root().and_then(|r| tree.get(r)).map(TreeItem::id);
    let (at, depth) = match parent_row {
        Some(i) => (i + 1, rows[i].depth() + 1),
        None if !show_root && root_id == Some(pending.parent) => (0, 1),
        None => {
            // Parent is not visible. Keep the row reachable at the end.
            tracing::debug!(parent = %pending.parent, "pending item parent is not visible");
            (rows.len(), 1)
        }
    };
    rows.insert(
        at,
        Row::Pending {
            item: pending.clone(),
            depth,
        },
    );
}

/// Remove expanded ids the backend no longer contains and persist the result.
///
/// Vanished ids have no materialized item, so the rows are unaffected.
fn prune_vanished<D: DataSource + ?Sized>(data: &mut D) {
    let backend = data.backend();
    let gone: Vec<ItemId> = data
        .core()
        .expanded()
        .as_slice()
        .iter()
        .copied()
        .filter(|id| !backend.contains(*id))
        .collect();
    if gone.is_empty() {
        return;
    }
    tracing::debug!(count = gone.len(), "dropped vanished ids from the expanded set");
    let core = data.core_mut();
    core.expanded.remove_all(&gone);
    core.persist();
}

/// A provider of tree items and the visible-row projection over them.
///
/// Implementors supply the three things that differ between strategies:
/// how the tree is fetched ([`fetch_data`](DataSource::fetch_data)) and how the
/// two structural queries are answered. Everything else (expansion
/// bookkeeping, row caching, pending items, reveal) is provided on top of the
/// shared [`SourceCore`].
///
/// Row access takes `&mut self` because it may lazily refresh the cache.
pub trait DataSource {
    /// Backend type the source reads from.
    type Backend: TreeBackend;

    /// Shared state.
    fn core(&self) -> &SourceCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut SourceCore;

    /// The backend.
    fn backend(&self) -> &Self::Backend;

    /// The backend, mutably. Call [`reload_data`](DataSource::reload_data)
    /// after structural changes.
    fn backend_mut(&mut self) -> &mut Self::Backend;

    /// Rebuild the materialized tree and the visible rows from the backend.
    ///
    /// Implementations finish with [`SourceCore::finish_fetch`].
    fn fetch_data(&mut self);

    /// Ancestor ids of `id`, nearest first.
    fn parents_above(&mut self, id: ItemId) -> Vec<ItemId>;

    /// `id` and all of its descendants that have children.
    fn parents_below(&mut self, id: ItemId) -> Vec<ItemId>;

    /// Invalidate whatever an expanded-set change affects.
    ///
    /// The default only dirties the rows, which suits sources that keep the
    /// whole tree in memory.
    fn expansion_changed(&mut self) {
        self.core_mut().mark_rows_dirty();
    }

    /// Bring the tree and rows up to date if any mutation marked them dirty.
    ///
    /// A fetch also drops expanded ids the backend no longer has.
    fn refresh(&mut self) {
        if self.core().is_tree_stale() {
            tracing::debug!("fetching tree data");
            self.fetch_data();
            prune_vanished(self);
        } else if self.core().needs_refresh() {
            self.core_mut().rebuild_rows();
        }
    }

    /// Fetch the tree on the next access.
    fn reload_data(&mut self) {
        self.core_mut().mark_tree_stale();
    }

    /// The visible rows, recomputed only if something changed.
    fn visible_rows(&mut self) -> &[Row] {
        self.refresh();
        self.core().rows()
    }

    /// Number of visible rows.
    fn row_count(&mut self) -> usize {
        self.visible_rows().len()
    }

    /// The row at `index`.
    fn row(&mut self, index: usize) -> Option<&Row> {
        self.visible_rows().get(index)
    }

    /// Row index of `id`, if it is visible.
    fn row_of(&mut self, id: ItemId) -> Option<usize> {
        self.visible_rows().iter().position(|r| r.id() == id)
    }

    /// Ids of the visible rows, in order.
    fn visible_ids(&mut self) -> Vec<ItemId> {
        self.visible_rows().iter().map(Row::id).collect()
    }

    /// The root handle, fetching first if needed.
    fn root(&mut self) -> Option<NodeRef> {
        if self.core().is_tree_stale() {
            self.refresh();
        }
        self.core().tree().root()
    }

    /// Id of the backend root.
    fn root_id(&self) -> ItemId {
        self.backend().root()
    }

    /// Locate a materialized item by id.
    fn find_item(&mut self, id: ItemId) -> Option<NodeRef> {
        if self.core().is_tree_stale() {
            self.refresh();
        }
        self.core().tree().find(id)
    }

    /// Resolve a handle from the current fetch.
    fn item(&self, node: NodeRef) -> Option<&TreeItem> {
        self.core().tree().get(node)
    }

    /// Whether `id` is in the expanded set.
    fn is_expanded(&self, id: ItemId) -> bool {
        self.core().expanded().contains(id)
    }

    /// Whether the materialized item `node` shows a disclosure affordance.
    fn is_expandable(&self, node: NodeRef) -> bool {
        self.item(node).is_some_and(TreeItem::has_children)
    }

    /// Expand or collapse one item. Returns `true` if the set changed.
    fn set_expanded(&mut self, id: ItemId, expand: bool) -> bool {
        let expanded = &mut self.core_mut().expanded;
        let changed = if expand == expanded.contains(id) {
            tracing::debug!(%id, expand, "expansion already in the requested state");
            false
        } else if expand {
            expanded.insert(id).is_ok()
        } else {
            expanded.remove(id).is_ok()
        };
        if changed {
            tracing::debug!(%id, expand, "expansion changed");
            self.expansion_changed();
            self.core_mut().persist();
        }
        changed
    }

    /// Expand or collapse `id` together with every descendant that has children.
    fn set_expanded_with_children(&mut self, id: ItemId, expand: bool) {
        let mut ids = self.parents_below(id);
        ids.push(id);
        let expanded = &mut self.core_mut().expanded;
        let changed = if expand {
            expanded.extend(&ids)
        } else {
            expanded.remove_all(&ids)
        };
        if changed {
            tracing::debug!(%id, expand, count = ids.len(), "bulk expansion changed");
            self.expansion_changed();
            self.core_mut().persist();
        }
    }

    /// The expanded ids, sorted and unique.
    fn expanded_ids(&self) -> &[ItemId] {
        self.core().expanded().as_slice()
    }

    /// Replace the expanded set. Input is normalized to sorted-unique.
    fn set_expanded_ids(&mut self, ids: &[ItemId]) {
        if self.core_mut().expanded.replace(ids) {
            self.expansion_changed();
            self.core_mut().persist();
        }
    }

    /// Expand every item that has children.
    fn expand_all(&mut self) {
        let root = self.root_id();
        self.set_expanded_with_children(root, true);
    }

    /// Collapse every item, the root included.
    fn collapse_all(&mut self) {
        self.set_expanded_ids(&[]);
    }

    /// Expand every ancestor of `id` and return its row index.
    ///
    /// Returns `None` when `id` does not exist.
    fn reveal(&mut self, id: ItemId) -> Option<usize> {
        let above = self.parents_above(id);
        if !above.is_empty() {
            let mut next = self.core().expanded().clone();
            if next.extend(&above) {
                self.set_expanded_ids(next.as_slice());
            }
        }
        self.row_of(id)
    }

    /// Policy hook: may `id` be part of a multi-selection?
    fn can_be_multi_selected(&self, id: ItemId) -> bool {
        self.backend().can_be_multi_selected(id)
    }

    /// Policy hook: may items be reparented under `id`?
    fn can_be_parent(&self, id: ItemId) -> bool {
        self.backend().can_be_parent(id)
    }

    /// Splice a pending item into the rows as the first child of its parent.
    ///
    /// The parent is expanded so the row is visible.
    fn insert_pending(&mut self, item: PendingItem) -> Result<(), TreeError> {
        if let Some(existing) = self.core().pending() {
            tracing::warn!(existing = %existing.id, "pending item inserted twice");
            return Err(TreeError::PendingItemExists(existing.id));
        }
        let parent = item.parent;
        self.core_mut().pending = Some(item);
        self.set_expanded(parent, true);
        self.core_mut().mark_rows_dirty();
        Ok(())
    }

    /// Remove the pending item, if any.
    fn remove_pending(&mut self) -> Option<PendingItem> {
        let core = self.core_mut();
        let pending = core.pending.take();
        if pending.is_some() {
            core.mark_rows_dirty();
        }
        pending
    }

    /// Whether a pending item is inserted.
    fn has_pending(&self) -> bool {
        self.core().pending().is_some()
    }
}

