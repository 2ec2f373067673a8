// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data source that materializes the whole backend on every fetch.

use alloc::{boxed::Box, vec, vec::Vec};

use crate::backend::{ExpansionStore, TreeBackend};
use crate::item_tree::NodeRef;
use crate::source::{DataSource, SourceConfig, SourceCore};
use crate::types::ItemId;

/// A [`DataSource`] that loads every item of the backend.
///
/// Structural queries are answered from memory, so expand/collapse only
/// recomputes the rows. Suited to trees of a few tens of thousands of items;
/// beyond that use [`LazyDataSource`](crate::LazyDataSource).
#[derive(Debug)]
pub struct EagerDataSource<B> {
    core: SourceCore,
    backend: B,
}

impl<B: TreeBackend> EagerDataSource<B> {
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

impl<B: TreeBackend> DataSource for EagerDataSource<B> {
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
        let tree = &mut self.core.tree;
        match self.backend.meta(root_id) {
            Some(meta) => {
                let root = tree.set_root(root_id, meta);
                let mut stack: Vec<(NodeRef, ItemId)> = vec![(root, root_id)];
                while let Some((node, id)) = stack.pop() {
                    for child in self.backend.children(id) {
                        // Ids listed by a parent but gone from the backend are skipped.
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
        tracing::trace!(items = tree.len(), "eager fetch");
        self.core.finish_fetch();
    }

    fn parents_above(&mut self, id: ItemId) -> Vec<ItemId> {
        let Some(node) = self.find_item(id) else {
            return Vec::new();
        };
        let tree = self.core.tree();
        tree.ancestors(node)
            .iter()
            .filter_map(|n| tree.get(*n).map(|item| item.id()))
            .collect()
    }

    fn parents_below(&mut self, id: ItemId) -> Vec<ItemId> {
        match self.find_item(id) {
            Some(node) => self.core.tree().descendants_with_children(node),
            None => Vec::new(),
        }
    }
}
