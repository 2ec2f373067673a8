// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios driven through the public API.

use kurbo::{Point, Rect};
use understory_tree_view::{
    DataSource, DropIndicator, EagerDataSource, ItemId, ItemMeta, Key, LazyDataSource,
    MemoryBackend, MemoryHooks, Modifiers, PointerButton, RowPainter, RowVisual, ScrollAlign,
    SourceConfig, TreeBackend, TreeEvent, TreeInput, TreeView, TreeViewConfig,
};

/// A complete `FANOUT`-ary tree of `len` items computed on demand.
#[derive(Debug)]
struct Arithmetic {
    len: i64,
}

const FANOUT: i64 = 10;

impl TreeBackend for Arithmetic {
    fn root(&self) -> ItemId {
        ItemId(0)
    }

    fn meta(&self, id: ItemId) -> Option<ItemMeta> {
        (0..self.len)
            .contains(&id.0)
            .then(|| ItemMeta::new(format!("Node {}", id.0)))
    }

    fn children(&self, id: ItemId) -> Vec<ItemId> {
        let first = id.0 * FANOUT + 1;
        (first..(first + FANOUT).min(self.len)).map(ItemId).collect()
    }

    fn parent(&self, id: ItemId) -> Option<ItemId> {
        (id.0 > 0 && id.0 < self.len).then(|| ItemId((id.0 - 1) / FANOUT))
    }

    fn contains(&self, id: ItemId) -> bool {
        (0..self.len).contains(&id.0)
    }

    fn has_children(&self, id: ItemId) -> bool {
        id.0 * FANOUT + 1 < self.len
    }
}

#[derive(Default)]
struct CountingPainter {
    rows: usize,
    labels: Vec<String>,
    indicators: Vec<DropIndicator>,
}

impl RowPainter for CountingPainter {
    fn row(&mut self, row: &RowVisual<'_>) {
        self.rows += 1;
        self.labels.push(row.label.to_owned());
    }

    fn drop_indicator(&mut self, indicator: DropIndicator) {
        self.indicators.push(indicator);
    }
}

fn press(pos: Point) -> TreeInput {
    TreeInput::PointerDown {
        pos,
        button: PointerButton::Primary,
        click_count: 1,
        modifiers: Modifiers::empty(),
    }
}

fn release(pos: Point) -> TreeInput {
    TreeInput::PointerUp {
        pos,
        button: PointerButton::Primary,
    }
}

fn key(key: Key) -> TreeInput {
    TreeInput::Key {
        key,
        modifiers: Modifiers::empty(),
    }
}

#[test]
fn million_items_stay_lazy() {
    let mut source = LazyDataSource::new(Arithmetic { len: 1_000_000 });
    assert_eq!(source.row_count(), 10);

    let deep = ItemId(999_999);
    let row = source.reveal(deep).expect("deep item becomes visible");
    assert_eq!(source.row(row).map(|r| r.id()), Some(deep));
    // Only the spine and the children of expanded items are materialized.
    assert!(source.core().tree().len() < 100, "loaded {}", source.core().tree().len());
    assert!(source.row_count() < 60);

    let mut view = TreeView::new(source, TreeViewConfig::default());
    view.set_viewport(Rect::new(0.0, 0.0, 300.0, 200.0));
    assert!(view.frame(deep, false, 0));
    let mut painter = CountingPainter::default();
    view.draw(&mut painter, 0);
    assert!(painter.rows <= 11, "drew {} rows", painter.rows);
    assert!(painter.labels.iter().any(|l| l == "Node 999999"));
}

#[test]
fn ten_thousand_items_virtualize() {
    let mut view = TreeView::new(
        EagerDataSource::new(MemoryBackend::synthetic(10_000, 8)),
        TreeViewConfig::default(),
    );
    view.set_viewport(Rect::new(0.0, 0.0, 300.0, 400.0));
    view.data_mut().expand_all();
    assert_eq!(view.data_mut().row_count(), 9_999);
    assert_eq!(view.geometry().total_height(), 9_999.0 * 20.0);

    view.scroll_to_row(9_998, ScrollAlign::End);
    let mut painter = CountingPainter::default();
    view.draw(&mut painter, 0);
    assert_eq!(painter.rows, 20);

    view.handle_input(&key(Key::End), 0);
    view.handle_input(&key(Key::PageUp), 0);
    let selected = view.selection().ids()[0];
    let index = view.data_mut().row_of(selected).unwrap();
    assert_eq!(index, 9_998 - 20);
}

#[test]
fn collapsing_the_root_of_ten_thousand() {
    for show_root in [false, true] {
        let config = SourceConfig::default().with_show_root(show_root);
        let mut source =
            EagerDataSource::with_config(MemoryBackend::synthetic(10_000, 8), config, ());
        let root = source.root_id();
        let hidden_rows = usize::from(show_root);

        source.set_expanded(root, false);
        assert_eq!(source.row_count(), hidden_rows);
        source.set_expanded(root, true);
        assert_eq!(source.row_count(), hidden_rows + 8);
    }
}

#[test]
fn drag_cancel_restores_expansion() {
    let mut view = TreeView::with_hooks(
        EagerDataSource::new(MemoryBackend::synthetic(40, 3)),
        MemoryHooks,
        TreeViewConfig::default().with_auto_expand_delay(300),
    );
    view.set_viewport(Rect::new(0.0, 0.0, 300.0, 400.0));
    let before = view.data().expanded_ids().to_vec();

    // Rows: Item 1, Item 2, Item 3. Drag the third onto the first.
    let from = Point::new(150.0, 48.0);
    let over = Point::new(150.0, 6.0);
    view.handle_input(&press(from), 0);
    view.handle_input(&TreeInput::PointerMove { pos: over }, 10);
    assert!(view.drag().is_dragging());
    assert!(view.tick(400));
    assert!(view.data().is_expanded(ItemId(1)));

    // Hover a freshly revealed child long enough to open it too.
    let child = Point::new(150.0, 26.0);
    view.handle_input(&TreeInput::PointerMove { pos: child }, 410);
    assert!(view.tick(800));
    assert!(view.data().is_expanded(ItemId(4)));

    view.handle_input(&TreeInput::PointerLeave, 900);
    assert!(!view.drag().is_dragging());
    assert_eq!(view.data().expanded_ids(), before.as_slice());
    assert_eq!(
        view.drain_events().last(),
        Some(&TreeEvent::DragEnded {
            dragged: vec![ItemId(3)],
            accepted: false
        })
    );
}

#[test]
fn drop_through_the_view_moves_items() {
    let mut view = TreeView::with_hooks(
        LazyDataSource::new(MemoryBackend::synthetic(13, 3)),
        MemoryHooks,
        TreeViewConfig::default(),
    );
    view.set_viewport(Rect::new(0.0, 0.0, 300.0, 400.0));

    // Select Item 2 and Item 3, then drag both onto Item 1.
    view.set_selection(&[ItemId(2), ItemId(3)], false);
    view.drain_events();
    view.handle_input(&press(Point::new(150.0, 30.0)), 0);
    view.handle_input(&TreeInput::PointerMove { pos: Point::new(150.0, 5.0) }, 5);
    let mut painter = CountingPainter::default();
    view.draw(&mut painter, 5);
    assert_eq!(painter.indicators, vec![DropIndicator::Onto(Rect::new(0.0, 0.0, 300.0, 20.0))]);
    view.handle_input(&release(Point::new(150.0, 5.0)), 10);

    assert_eq!(view.data().backend().children(ItemId(1)).len(), 5);
    assert_eq!(view.selection().ids(), &[ItemId(2), ItemId(3)]);
    assert_eq!(
        view.data_mut().visible_ids(),
        [1, 4, 5, 6, 2, 3].map(ItemId).to_vec(),
        "target parent is expanded after the drop"
    );
}

#[test]
fn renaming_to_blank_reverts() {
    let mut view = TreeView::with_hooks(
        EagerDataSource::new(MemoryBackend::synthetic(5, 4)),
        MemoryHooks,
        TreeViewConfig::default(),
    );
    view.set_viewport(Rect::new(0.0, 0.0, 300.0, 400.0));
    view.begin_rename(ItemId(2)).unwrap();
    view.set_rename_text("   ").unwrap();
    view.handle_input(&key(Key::Commit), 0);
    assert_eq!(
        view.drain_events(),
        vec![TreeEvent::RenameEnded {
            id: ItemId(2),
            accepted: false
        }]
    );
    assert_eq!(view.data().backend().meta(ItemId(2)).unwrap().label, "Item 2");
}

#[test]
fn clicking_away_commits_a_rename() {
    let mut view = TreeView::with_hooks(
        EagerDataSource::new(MemoryBackend::synthetic(5, 4)),
        MemoryHooks,
        TreeViewConfig::default(),
    );
    view.set_viewport(Rect::new(0.0, 0.0, 300.0, 400.0));
    view.begin_rename(ItemId(1)).unwrap();
    view.set_rename_text("First").unwrap();
    // Press on the fourth row; the rename ends first, then the click selects.
    view.handle_input(&press(Point::new(150.0, 70.0)), 0);
    view.handle_input(&release(Point::new(150.0, 70.0)), 0);
    assert_eq!(
        view.drain_events(),
        vec![
            TreeEvent::RenameEnded {
                id: ItemId(1),
                accepted: true
            },
            TreeEvent::SelectionChanged(vec![ItemId(4)]),
        ]
    );
    assert_eq!(view.data().backend().meta(ItemId(1)).unwrap().label, "First");
}
