// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted session against a 10,000 item tree, painted as text.
//!
//! This example shows how a host wires up `understory_tree_view`:
//! - a `MemoryBackend` with `MemoryHooks` for drops, renames, and creations,
//! - a `RowPainter` that turns row visuals into lines of text,
//! - input and clock samples fed through `handle_input` and `tick`.
//!
//! Run:
//! - `cargo run -p understory_demos --example tree_view_demo`

use kurbo::{Point, Rect};
use understory_tree_view::{
    DataSource, DropIndicator, EagerDataSource, ItemId, ItemMeta, Key, MemoryBackend, MemoryHooks,
    Modifiers, PointerButton, RenameOverlay, RowHeight, RowPainter, RowVisual, TreeInput, TreeView,
    TreeViewConfig,
};

const ROW: f64 = 20.0;

/// Collects one text line per row.
#[derive(Default)]
struct TextPainter {
    lines: Vec<String>,
}

impl RowPainter for TextPainter {
    fn row(&mut self, row: &RowVisual<'_>) {
        let disclosure = match row.disclosure {
            Some(d) if d.expanded => "v ",
            Some(_) => "> ",
            None => "  ",
        };
        let mark = if row.selected { '*' } else { ' ' };
        let target = if row.drop_target { " <= drop" } else { "" };
        let label = if row.renaming { "" } else { row.label };
        self.lines.push(format!(
            "{mark} {:indent$}{disclosure}{label}{target}",
            "",
            indent = row.depth as usize * 2
        ));
    }

    fn drop_indicator(&mut self, indicator: DropIndicator) {
        self.lines.push(format!("  [drop] {indicator:?}"));
    }

    fn rename_overlay(&mut self, overlay: &RenameOverlay<'_>) {
        self.lines.push(format!("  [edit] \"{}|\"", overlay.text));
    }

    fn ping(&mut self, rect: Rect, intensity: f64) {
        self.lines
            .push(format!("  [ping] y={:.0} intensity={intensity:.2}", rect.y0));
    }
}

fn show<D: DataSource<Backend = MemoryBackend>>(view: &mut TreeView<D, MemoryHooks>, title: &str, now_ms: u64) {
    let mut painter = TextPainter::default();
    view.draw(&mut painter, now_ms);
    println!("== {title}");
    for line in painter.lines {
        println!("{line}");
    }
    for event in view.drain_events() {
        println!("  event: {event:?}");
    }
    println!();
}

/// Point inside the label area of visible row `index`.
fn row_point(index: usize) -> Point {
    Point::new(160.0, index as f64 * ROW + ROW / 2.0)
}

fn click(pos: Point, modifiers: Modifiers) -> [TreeInput; 2] {
    [
        TreeInput::PointerDown {
            pos,
            button: PointerButton::Primary,
            click_count: 1,
            modifiers,
        },
        TreeInput::PointerUp {
            pos,
            button: PointerButton::Primary,
        },
    ]
}

fn key(key: Key) -> TreeInput {
    TreeInput::Key {
        key,
        modifiers: Modifiers::empty(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let backend = MemoryBackend::synthetic(10_000, 6);
    let mut view = TreeView::with_hooks(
        EagerDataSource::new(backend),
        MemoryHooks,
        TreeViewConfig::default().with_row_height(RowHeight::Uniform(ROW)),
    );
    view.set_viewport(Rect::new(0.0, 0.0, 320.0, 10.0 * ROW));
    let mut now = 0;
    show(&mut view, "initial", now);

    // Keyboard: select the first row, open it, step into its first child.
    for input in [key(Key::Down), key(Key::Right), key(Key::Right)] {
        view.handle_input(&input, now);
    }
    show(&mut view, "keyboard navigation", now);

    // Shift-click extends the selection to the fifth row.
    for input in click(row_point(4), Modifiers::SHIFT) {
        view.handle_input(&input, now);
    }
    show(&mut view, "range selection", now);

    // Drag the eighth row onto the ninth, hovering long enough to open it.
    for input in click(row_point(7), Modifiers::empty()) {
        view.handle_input(&input, now);
    }
    view.handle_input(
        &TreeInput::PointerDown {
            pos: row_point(7),
            button: PointerButton::Primary,
            click_count: 1,
            modifiers: Modifiers::empty(),
        },
        now,
    );
    let over = Point::new(160.0, 8.0 * ROW + 4.0);
    now += 16;
    view.handle_input(&TreeInput::PointerMove { pos: over }, now);
    show(&mut view, "dragging", now);
    now += 800;
    view.tick(now);
    show(&mut view, "after hover auto-expand", now);
    view.handle_input(
        &TreeInput::PointerUp {
            pos: over,
            button: PointerButton::Primary,
        },
        now,
    );
    show(&mut view, "dropped", now);

    // Inline rename through typed input.
    view.handle_input(&key(Key::Rename), now);
    for _ in 0..8 {
        view.handle_input(&key(Key::Backspace), now);
    }
    for ch in "Renamed".chars() {
        view.handle_input(&TreeInput::Text(ch), now);
    }
    show(&mut view, "renaming", now);
    view.handle_input(&key(Key::Commit), now);
    show(&mut view, "renamed", now);

    // Create a child of the root, then name it.
    if let Ok(pending) = view.begin_create(ItemId(0), ItemMeta::new("New Item")) {
        show(&mut view, "pending row", now);
        println!("pending id {pending}");
        if view.set_rename_text("Notes").is_ok() && view.end_rename(true).is_ok() {
            show(&mut view, "created", now);
        }
    }

    // Jump to a deep item and ping it.
    view.frame(ItemId(9_999), true, now);
    show(&mut view, "framed Item 9999", now);
    now += 750;
    show(&mut view, "ping fading", now);
    now += 1_000;
    view.tick(now);
    show(&mut view, "ping expired", now);
}
