// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data source that materializes only the expanded spine.

use alloc::{boxed::Box, vec, vec::Vec};

use crate::backend::{ExpansionStore, TreeBackend};
use crate::expanded::ExpandedSet;
use crate::item_tree::NodeRef;
use crate::source::{DataSource, SourceConfig, SourceCore};
use crate::types::ItemId;

/// A [`DataSource`] for backends too large to load whole.
///
/// A fetch walks down from the root and loads the children of expanded items
/// only. A collapsed item with children in the backend gets a
/// [`Children::Placeholder`](crate::Children::Placeholder), which is enough to
/// draw a disclosure affordance. Cost per fetch is proportional to the number of
/// visible rows, not to the size of the backend.
///
/// Because most of the tree is never in memory, the structural queries
/// ([`parents_above`](DataSource::parents_above),
/// [`parents_below`](DataSource::parents_below)) go to the backend, and every
/// expansion change forces a fetch.
///
/// ```
/// use understory_tree_view::{DataSource, ItemId, ItemMeta, LazyDataSource, MemoryBackend};
///
/// let mut mem = MemoryBackend::new(ItemId(0), ItemMeta::new("root"));
/// mem.insert(ItemId(1), ItemId(0), ItemMeta::new("folder")).unwrap();
/// mem.insert(ItemId(2), ItemId(1), ItemMeta::new("deep")).unwrap();
///
/// let mut source = LazyDataSource::new(mem);
/// assert_eq!(source.row_count(), 1);
/// assert_eq!(source.core().tree().len(), 2, "only root and folder are loaded");
///
/// // Looking up an unloaded id opens its ancestors.
/// assert!(source.find_item(ItemId(2)).is_some());
/// assert!(source.is_expanded(ItemId(1)));
/// ```
#[derive(Debug)]
pub struct LazyDataSource<B> {
    core: SourceCore,
    backend: B,
}

impl<B: TreeBackend> LazyDataSource<B> {
    /// Create a source with the default configuration and no persistence.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, SourceConfig::default(), ())
    }

    /// Create a source with an explicit configuration and expansion store.
    pub fn with_config(
        backend: B,
        config: SourceConfig,
        store: impl ExpansionStore + 'static,
    ) -> Self {
        let core = SourceCore::new(config, backend.root(), Box::new(store));
        Self { core, backend }
    }

    /// Consume the source, returning its backend.
    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: TreeBackend> DataSource for LazyDataSource<B> {
    type Backend = B;

    fn core(&self) -> &SourceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SourceCore {
        &mut self.core
    }

    fn backend(&self) -> &B {
        &self.backend
    }

    fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn fetch_data(&mut self) {
        let root_id = self.backend.root();
        let expanded: &ExpandedSet = &self.core.expanded;
        let tree = &mut self.core.tree;
        match self.backend.meta(root_id) {
            Some(meta) => {
                let root = tree.set_root(root_id, meta);
                let mut stack: Vec<(NodeRef, ItemId)> = vec![(root, root_id)];
                while let Some((node, id)) = stack.pop() {
                    if !expanded.contains(id) {
                        if self.backend.has_children(id) {
                            tree.set_placeholder(node);
                        }
                        continue;
                    }
                    for child in self.backend.children(id) {
                        let Some(meta) = self.backend.meta(child) else {
                            continue;
                        };
                        let child_node = tree.push_child(node, child, meta);
                        stack.push((child_node, child));
                    }
                }
            }
            None => {
                tracing::warn!(root = %root_id, "backend has no root item");
                tree.clear();
            }
        }
        tracing::trace!(items = tree.len(), "lazy fetch");
        self.core.finish_fetch();
    }

    fn parents_above(&mut self, id: ItemId) -> Vec<ItemId> {
        self.backend.parents_above(id)
    }

    fn parents_below(&mut self, id: ItemId) -> Vec<ItemId> {
        self.backend.parents_below(id)
    }

    fn expansion_changed(&mut self) {
        self.core.mark_tree_stale();
    }

    /// Open every ancestor of `id`, fetching again if that changed anything,
    /// then search the materialized tree.
    fn find_item(&mut self, id: ItemId) -> Option<NodeRef> {
        if !self.backend.contains(id) {
            return None;
        }
        let above = self.backend.parents_above(id);
        let mut next = self.core.expanded().clone();
        if next.extend(&above) {
            self.set_expanded_ids(next.as_slice());
        }
        self.refresh();
        self.core.tree().find(id)
    }
}
