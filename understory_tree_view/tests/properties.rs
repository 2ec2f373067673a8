// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the row projection, reveal, selection, and row geometry.

use proptest::prelude::*;
use proptest::sample::Index;
use understory_tree_view::{
    ClickSelect, DataSource, EagerDataSource, ExpandedSet, ItemId, ItemMeta, LazyDataSource,
    MemoryBackend, Row, RowGeometry, RowHeight, Selection, TreeBackend, selection_after_click,
};

/// A random tree: item `i` (1-based) hangs under one of the items before it.
fn tree_strategy() -> impl Strategy<Value = MemoryBackend> {
    prop::collection::vec(any::<Index>(), 0..80).prop_map(|parents| {
        let mut mem = MemoryBackend::new(ItemId(0), ItemMeta::new("root"));
        for (i, parent) in parents.iter().enumerate() {
            let id = i as i64 + 1;
            let parent = parent.index(i + 1) as i64;
            mem.insert(ItemId(id), ItemId(parent), ItemMeta::new(format!("n{id}")))
                .unwrap();
        }
        mem
    })
}

fn tree_and_expanded() -> impl Strategy<Value = (MemoryBackend, Vec<ItemId>)> {
    tree_strategy().prop_flat_map(|mem| {
        let len = mem.len() as i64;
        let expanded = prop::collection::vec((0..len).prop_map(ItemId), 0..40);
        (Just(mem), expanded)
    })
}

/// Pre-order walk of the expanded part, root hidden.
fn reference_rows(mem: &MemoryBackend, expanded: &[ItemId]) -> Vec<ItemId> {
    fn walk(mem: &MemoryBackend, expanded: &[ItemId], id: ItemId, out: &mut Vec<ItemId>) {
        if !expanded.contains(&id) {
            return;
        }
        for child in mem.children(id) {
            out.push(child);
            walk(mem, expanded, child, out);
        }
    }
    let mut out = Vec::new();
    walk(mem, expanded, mem.root(), &mut out);
    out
}

proptest! {
    #[test]
    fn rows_are_the_expanded_pre_order((mem, expanded) in tree_and_expanded()) {
        let expected = reference_rows(&mem, &expanded);

        let mut eager = EagerDataSource::new(mem.clone());
        eager.set_expanded_ids(&expanded);
        prop_assert_eq!(eager.visible_ids(), expected.clone());

        let mut lazy = LazyDataSource::new(mem);
        lazy.set_expanded_ids(&expanded);
        prop_assert_eq!(lazy.visible_ids(), expected);
    }

    #[test]
    fn setting_expanded_ids_is_idempotent((mem, expanded) in tree_and_expanded()) {
        let mut source = EagerDataSource::new(mem);
        source.set_expanded_ids(&expanded);
        let once = source.visible_ids();
        source.set_expanded_ids(&expanded);
        prop_assert_eq!(source.visible_ids(), once);

        let mut normalized = expanded.clone();
        normalized.sort();
        normalized.dedup();
        prop_assert_eq!(source.expanded_ids(), normalized.as_slice());
    }

    #[test]
    fn membership_agrees_with_the_id_list(ops in prop::collection::vec((any::<bool>(), 0_i64..20), 0..100)) {
        let mut set = ExpandedSet::new();
        for (insert, id) in ops {
            let id = ItemId(id);
            // Misuse is reported but leaves the set consistent.
            let _ = if insert { set.insert(id) } else { set.remove(id) };
            for probe in (0..20).map(ItemId) {
                prop_assert_eq!(set.contains(probe), set.as_slice().contains(&probe));
            }
            prop_assert!(set.as_slice().windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn row_depth_is_parent_depth_plus_one((mem, expanded) in tree_and_expanded()) {
        let mut source = EagerDataSource::new(mem);
        source.set_expanded_ids(&expanded);
        let rows = source.visible_rows().to_vec();
        for row in &rows {
            let parent = source.backend().parent(row.id()).unwrap();
            let expected = if parent == ItemId(0) {
                1
            } else {
                let parent_row = rows.iter().find(|r| r.id() == parent).unwrap();
                parent_row.depth() + 1
            };
            prop_assert_eq!(row.depth(), expected, "depth of {}", row.id());
        }
    }

    #[test]
    fn reveal_shows_the_item((mem, _) in tree_and_expanded(), pick in any::<Index>()) {
        let target = ItemId(pick.index(mem.len()) as i64);
        let ancestors = mem.parents_above(target);

        let mut source = LazyDataSource::new(mem);
        source.collapse_all();
        let row = source.reveal(target);
        for ancestor in &ancestors {
            prop_assert!(source.is_expanded(*ancestor), "{} stays collapsed", ancestor);
        }
        if target == ItemId(0) {
            // The hidden root has no row of its own.
            prop_assert_eq!(row, None);
        } else {
            let row = row.unwrap();
            prop_assert_eq!(source.row(row).map(Row::id), Some(target));
        }
    }

    #[test]
    fn range_selection_is_a_contiguous_run(
        len in 1_usize..60,
        anchor in any::<Index>(),
        clicked in any::<Index>(),
    ) {
        let visible: Vec<ItemId> = (0..len as i64).map(ItemId).collect();
        let anchor = visible[anchor.index(len)];
        let clicked = visible[clicked.index(len)];
        let mut current = Selection::new();
        current.set(vec![anchor], Some(anchor));

        let range = ClickSelect { range: true, ..ClickSelect::default() };
        let next = selection_after_click(clicked, range, true, &current, &visible);
        let (lo, hi) = (anchor.0.min(clicked.0), anchor.0.max(clicked.0));
        let expected: Vec<ItemId> = (lo..=hi).map(ItemId).collect();
        prop_assert_eq!(next.ids(), expected.as_slice());
        prop_assert_eq!(next.anchor(), Some(anchor));
    }

    #[test]
    fn toggling_twice_restores_the_selection(
        picks in prop::collection::btree_set(0_i64..30, 0..10),
        clicked in 0_i64..30,
    ) {
        let visible: Vec<ItemId> = (0..30).map(ItemId).collect();
        let ids: Vec<ItemId> = picks.into_iter().map(ItemId).collect();
        let mut current = Selection::new();
        current.set(ids.clone(), ids.first().copied());

        let toggle = ClickSelect { keep_multi_selection: true, ..ClickSelect::default() };
        let once = selection_after_click(ItemId(clicked), toggle, true, &current, &visible);
        prop_assert_ne!(once.contains(ItemId(clicked)), current.contains(ItemId(clicked)));
        let twice = selection_after_click(ItemId(clicked), toggle, true, &once, &visible);
        let mut restored = twice.ids().to_vec();
        restored.sort();
        prop_assert_eq!(restored, ids);
    }

    #[test]
    fn hit_testing_inverts_row_offsets(count in 1_usize..50) {
        let mem = MemoryBackend::synthetic(count + 1, count + 1);
        let mut source = EagerDataSource::new(mem);
        let rows = source.visible_rows().to_vec();
        // Height derived from the id so the per-row function stays a plain `fn`.
        fn height(row: &Row) -> f64 {
            (row.id().0 * 7 % 39 + 1) as f64
        }
        let geometry = RowGeometry::build(&rows, RowHeight::PerRow(height));
        let mut top = 0.0;
        for (index, row) in rows.iter().enumerate() {
            prop_assert_eq!(geometry.row_top(index), top);
            prop_assert_eq!(geometry.row_at(top), Some(index));
            prop_assert_eq!(geometry.row_at(top + height(row) - 0.5), Some(index));
            top += height(row);
        }
        prop_assert_eq!(geometry.total_height(), top);
        prop_assert_eq!(geometry.row_at(top), None);
    }

    #[test]
    fn visible_range_covers_exactly_the_viewport(
        count in 1_usize..200,
        scroll in 0_u32..4000,
        viewport in 1_u32..500,
    ) {
        // Whole pixels keep the boundary comparisons exact.
        let (scroll, viewport) = (f64::from(scroll), f64::from(viewport));
        let mem = MemoryBackend::synthetic(count + 1, count + 1);
        let mut source = EagerDataSource::new(mem);
        let geometry = RowGeometry::build(source.visible_rows(), RowHeight::Uniform(20.0));
        let scroll = geometry.clamp_scroll(scroll, viewport);
        let range = geometry.visible_range(scroll, viewport).unwrap();
        for index in 0..count {
            let overlaps = geometry.row_bottom(index) > scroll
                && geometry.row_top(index) < scroll + viewport;
            prop_assert_eq!(range.contains(&index), overlaps, "row {}", index);
        }
    }
}
