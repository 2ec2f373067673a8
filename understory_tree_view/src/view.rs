// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree view controller: input dispatch, selection, drag, rename, and drawing.

use alloc::{string::ToString, vec, vec::Vec};
use core::fmt;
use kurbo::{Point, Rect};

use crate::backend::TreeBackend;
use crate::config::TreeViewConfig;
use crate::drag::{DragController, DragPolicy, DragSession, DropMarker, DropOutcome, hover_zone, resolve_drop};
use crate::error::TreeError;
use crate::event::{TreeEvent, TreeInput};
use crate::geometry::{RowGeometry, ScrollAlign};
use crate::item_tree::TreeItem;
use crate::ping::Ping;
use crate::rename::{RenameHandler, RenameOverlay, RenameResolution, RenameSession, RenameTarget};
use crate::selection::{ClickSelect, Selection, selection_after_click};
use crate::source::{DataSource, PendingItem, Row};
use crate::surface::{Disclosure, DropIndicator, RowPainter, RowVisual, indent_x, layout_row};
use crate::types::{ItemId, ItemMeta, Key, Modifiers, PointerButton};

/// A tree view over a [`DataSource`].
///
/// The view owns the data source, the selection, and all gesture state. The host
/// feeds it [`TreeInput`] and a clock sample, asks it to [`draw`](Self::draw)
/// through a [`RowPainter`], and drains [`TreeEvent`]s afterwards. Everything
/// happens synchronously inside those calls.
///
/// `H` supplies the drop and rename commit hooks; the default `()` disables
/// both.
pub struct TreeView<D: DataSource, H = ()> {
    data: D,
    hooks: H,
    config: TreeViewConfig,
    selection: Selection,
    viewport: Rect,
    scroll: f64,
    geometry: RowGeometry,
    geometry_generation: Option<u64>,
    drag: DragController,
    deferred_click: Option<ItemId>,
    rename: Option<RenameSession>,
    ping: Option<Ping>,
    next_pending_id: i64,
    events: Vec<TreeEvent>,
}

impl<D: DataSource, H> fmt::Debug for TreeView<D, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeView")
            .field("data", self.data.core())
            .field("selection", &self.selection)
            .field("viewport", &self.viewport)
            .field("scroll", &self.scroll)
            .field("drag", &self.drag)
            .field("rename", &self.rename)
            .field("ping", &self.ping)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl<D: DataSource> TreeView<D> {
    /// Create a view without drop or rename hooks.
    pub fn new(data: D, config: TreeViewConfig) -> Self {
        Self::with_hooks(data, (), config)
    }
}

impl<D: DataSource, H> TreeView<D, H> {
    /// Create a view with commit hooks.
    pub fn with_hooks(data: D, hooks: H, config: TreeViewConfig) -> Self {
        Self {
            data,
            hooks,
            config,
            selection: Selection::new(),
            viewport: Rect::ZERO,
            scroll: 0.0,
            geometry: RowGeometry::default(),
            geometry_generation: None,
            drag: DragController::new(),
            deferred_click: None,
            rename: None,
            ping: None,
            next_pending_id: -1,
            events: Vec::new(),
        }
    }

    /// The data source.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// The data source, mutably. Changes are picked up on the next call.
    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    /// The commit hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// The commit hooks, mutably.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Current configuration.
    pub fn config(&self) -> &TreeViewConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: TreeViewConfig) {
        self.config = config;
        self.geometry_generation = None;
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The viewport rect, in host coordinates.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Set the viewport rect.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.scroll = self.geometry.clamp_scroll(self.scroll, viewport.height());
    }

    /// Current scroll offset.
    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    /// Set the scroll offset, clamped to the content.
    pub fn set_scroll(&mut self, offset: f64) {
        self.sync();
        self.scroll = self.geometry.clamp_scroll(offset, self.viewport.height());
    }

    /// Scroll by `delta` pixels.
    pub fn scroll_by(&mut self, delta: f64) {
        self.set_scroll(self.scroll + delta);
    }

    /// Row geometry for the current rows.
    pub fn geometry(&mut self) -> &RowGeometry {
        self.sync();
        &self.geometry
    }

    /// The drag gesture state.
    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// The active rename, if any.
    pub fn rename_session(&self) -> Option<&RenameSession> {
        self.rename.as_ref()
    }

    /// The active ping, if any.
    pub fn active_ping(&self) -> Option<&Ping> {
        self.ping.as_ref()
    }

    /// Notifications produced since the last drain.
    pub fn events(&self) -> &[TreeEvent] {
        &self.events
    }

    /// Take the pending notifications.
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        core::mem::take(&mut self.events)
    }

    /// Bring rows and geometry up to date, and drop selected ids that no
    /// longer exist.
    pub fn sync(&mut self) {
        self.data.refresh();
        let generation = self.data.core().rows_generation();
        if self.geometry_generation == Some(generation) {
            return;
        }
        self.geometry = RowGeometry::build(self.data.core().rows(), self.config.row_height);
        self.geometry_generation = Some(generation);
        self.scroll = self.geometry.clamp_scroll(self.scroll, self.viewport.height());

        let backend = self.data.backend();
        let pending = self.data.core().pending().map(|p| p.id);
        if self
            .selection
            .retain(|id| Some(id) == pending || backend.contains(id))
        {
            tracing::debug!(remaining = self.selection.ids().len(), "pruned vanished ids from selection");
            self.events
                .push(TreeEvent::SelectionChanged(self.selection.ids().to_vec()));
        }
    }

    /// Rect of row `index`, in host coordinates.
    pub fn row_rect(&self, index: usize) -> Rect {
        let top = self.viewport.y0 + self.geometry.row_top(index) - self.scroll;
        Rect::new(
            self.viewport.x0,
            top,
            self.viewport.x1,
            top + self.geometry.row_height(index),
        )
    }

    /// Index of the row under `pos`, if any.
    pub fn row_at(&mut self, pos: Point) -> Option<usize> {
        self.sync();
        self.hit_row(pos)
    }

    fn hit_row(&self, pos: Point) -> Option<usize> {
        if !self.viewport.contains(pos) {
            return None;
        }
        self.geometry.row_at(pos.y - self.viewport.y0 + self.scroll)
    }

    fn display_depth(&self, depth: u32) -> u32 {
        if self.data.core().config().show_root {
            depth
        } else {
            depth.saturating_sub(1)
        }
    }

    fn set_selection_state(&mut self, ids: Vec<ItemId>, anchor: Option<ItemId>) -> bool {
        let changed = self.selection.set(ids, anchor);
        if changed {
            self.events
                .push(TreeEvent::SelectionChanged(self.selection.ids().to_vec()));
        }
        changed
    }

    /// Replace the selection. With `reveal`, every id is revealed and the
    /// last one scrolled into view.
    pub fn set_selection(&mut self, ids: &[ItemId], reveal: bool) {
        self.set_selection_state(ids.to_vec(), ids.last().copied());
        if reveal {
            let mut last_row = None;
            for id in ids {
                last_row = self.data.reveal(*id).or(last_row);
            }
            if let Some(index) = last_row {
                self.scroll_to_row(index, ScrollAlign::Nearest);
            }
        }
    }

    /// Select every visible row that allows multi-selection.
    pub fn select_all(&mut self) -> bool {
        if !self.config.multi_select {
            return false;
        }
        let ids: Vec<ItemId> = self
            .data
            .visible_rows()
            .iter()
            .filter(|r| !r.is_pending())
            .map(Row::id)
            .collect();
        let ids: Vec<ItemId> = ids
            .into_iter()
            .filter(|id| self.data.can_be_multi_selected(*id))
            .collect();
        let anchor = self.selection.anchor().or(ids.first().copied());
        self.set_selection_state(ids, anchor)
    }

    /// Expand every ancestor of `id` and return its row index.
    pub fn reveal(&mut self, id: ItemId) -> Option<usize> {
        self.data.reveal(id)
    }

    /// Scroll so row `index` is visible with `align`.
    pub fn scroll_to_row(&mut self, index: usize, align: ScrollAlign) {
        self.sync();
        self.scroll = self
            .geometry
            .scroll_to_row(index, align, self.scroll, self.viewport.height());
    }

    /// Reveal `id`, scroll it into view, and optionally ping it.
    pub fn frame(&mut self, id: ItemId, ping: bool, now_ms: u64) -> bool {
        let Some(index) = self.data.reveal(id) else {
            return false;
        };
        self.scroll_to_row(index, ScrollAlign::Nearest);
        if ping {
            self.ping(id, now_ms);
        }
        true
    }

    /// Start a ping highlight on `id`.
    pub fn ping(&mut self, id: ItemId, now_ms: u64) {
        self.ping = Some(Ping::new(id, now_ms, self.config.ping_duration_ms));
    }
}

impl<D, H> TreeView<D, H>
where
    D: DataSource,
    H: DragPolicy<D::Backend> + RenameHandler<D::Backend>,
{
    /// Process one input event. Returns `true` if the event was consumed.
    ///
    /// An active rename sees the event first.
    pub fn handle_input(&mut self, input: &TreeInput, now_ms: u64) -> bool {
        self.sync();
        if self.rename.is_some()
            && let Some(consumed) = self.rename_input(input)
        {
            return consumed;
        }
        match *input {
            TreeInput::PointerDown {
                pos,
                button,
                click_count,
                modifiers,
            } => self.pointer_down(pos, button, click_count, modifiers),
            TreeInput::PointerMove { pos } => self.pointer_move(pos, now_ms),
            TreeInput::PointerUp { pos, button } => self.pointer_up(pos, button),
            TreeInput::PointerLeave => {
                self.deferred_click = None;
                if self.drag.is_dragging() {
                    self.cancel_drag()
                } else {
                    self.drag.finish();
                    false
                }
            }
            TreeInput::Key { key, modifiers } => self.key(key, modifiers),
            TreeInput::Text(_) => false,
        }
    }

    /// Advance time-driven state: drag auto-expand and ping expiry.
    /// Returns `true` if anything changed that needs a redraw.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut changed = false;
        if let Some(id) = self.drag.auto_expand_due(now_ms, self.config.auto_expand_delay_ms)
            && !self.data.is_expanded(id)
            && self.is_row_expandable(id)
        {
            let before = self.data.expanded_ids().to_vec();
            self.data.set_expanded(id, true);
            self.drag.mark_auto_expanded(&before);
            tracing::debug!(%id, "drag auto-expanded row");
            self.sync();
            if let Some(pointer) = self.drag.session().map(DragSession::pointer) {
                self.update_drag(pointer, now_ms);
            }
            changed = true;
        }
        if self.ping.as_ref().is_some_and(|p| p.is_expired(now_ms)) {
            self.ping = None;
            changed = true;
        }
        changed
    }

    fn is_row_expandable(&mut self, id: ItemId) -> bool {
        let node = self
            .data
            .row_of(id)
            .and_then(|i| self.data.core().rows().get(i))
            .and_then(Row::node);
        node.is_some_and(|n| self.data.is_expandable(n))
    }

    fn pointer_down(
        &mut self,
        pos: Point,
        button: PointerButton,
        click_count: u8,
        modifiers: Modifiers,
    ) -> bool {
        self.deferred_click = None;
        let Some(index) = self.hit_row(pos) else {
            if !self.viewport.contains(pos) {
                return false;
            }
            return match button {
                PointerButton::Secondary => {
                    self.events.push(TreeEvent::ContextClick(None));
                    true
                }
                PointerButton::Primary if !modifiers.contains(Modifiers::ACTION) => {
                    if !self.selection.is_empty() {
                        self.set_selection_state(Vec::new(), None);
                    }
                    true
                }
                _ => false,
            };
        };
        let Some(row) = self.data.core().rows().get(index).cloned() else {
            return false;
        };
        let id = row.id();
        match button {
            PointerButton::Auxiliary => false,
            PointerButton::Secondary => {
                if !row.is_pending() && !self.selection.contains(id) {
                    self.set_selection_state(vec![id], Some(id));
                }
                self.events.push(TreeEvent::ContextClick(Some(id)));
                true
            }
            PointerButton::Primary => {
                if row.is_pending() {
                    return true;
                }
                let layout = layout_row(&self.config, self.row_rect(index), self.display_depth(row.depth()));
                let expandable = row.node().is_some_and(|n| self.data.is_expandable(n));
                if expandable && layout.disclosure.contains(pos) {
                    let expand = !self.data.is_expanded(id);
                    if modifiers.contains(Modifiers::ALT) {
                        self.data.set_expanded_with_children(id, expand);
                    } else {
                        self.data.set_expanded(id, expand);
                    }
                    return true;
                }
                if click_count >= 2 {
                    self.events.push(TreeEvent::DoubleClick(id));
                    return true;
                }
                let click = ClickSelect::from_modifiers(modifiers);
                if !click.is_modified() && self.selection.contains(id) {
                    // Keep a multi-selection intact in case this press becomes a drag.
                    self.deferred_click = Some(id);
                } else {
                    self.click_select(id, click);
                }
                self.drag.press(id, pos);
                true
            }
        }
    }

    fn click_select(&mut self, id: ItemId, click: ClickSelect) {
        let allow_multi = self.config.multi_select && self.data.can_be_multi_selected(id);
        let visible = self.data.visible_ids();
        let next = selection_after_click(id, click, allow_multi, &self.selection, &visible);
        self.set_selection_state(next.ids().to_vec(), next.anchor());
    }

    fn pointer_move(&mut self, pos: Point, now_ms: u64) -> bool {
        if let Some(pressed) = self.drag.pressed()
            && self.drag.exceeds_threshold(pos, self.config.drag_threshold)
        {
            let dragged = if self.selection.contains(pressed) {
                self.selection.ids().to_vec()
            } else {
                vec![pressed]
            };
            if self.hooks.can_start_drag(self.data.backend(), &dragged) {
                self.deferred_click = None;
                self.drag.start(dragged, pos);
            } else {
                self.drag.finish();
            }
        }
        if self.drag.is_dragging() {
            self.update_drag(pos, now_ms);
            return true;
        }
        false
    }

    fn update_drag(&mut self, pos: Point, now_ms: u64) {
        if !self.viewport.contains(pos) {
            self.drag.hover(None, pos, now_ms);
            if let Some(session) = self.drag.session_mut() {
                session.set_resolution(None, DropMarker::Rejected(None));
            }
            return;
        }
        let hovered = self.hit_row(pos).and_then(|index| {
            let row = self.data.core().rows().get(index)?;
            let id = row.id();
            let can_be_parent = !row.is_pending() && self.data.can_be_parent(id);
            let zone = hover_zone(self.row_rect(index), pos.y, self.config.between_band, can_be_parent);
            Some((id, zone))
        });
        self.drag.hover(hovered.map(|(id, _)| id), pos, now_ms);
        let Some(dragged) = self.drag.session().map(|s| s.dragged().to_vec()) else {
            return;
        };
        let (target, marker) = resolve_drop(&mut self.data, &mut self.hooks, &dragged, hovered);
        if let Some(session) = self.drag.session_mut() {
            session.set_resolution(target, marker);
        }
    }

    fn pointer_up(&mut self, pos: Point, button: PointerButton) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        if let Some(session) = self.drag.finish() {
            self.complete_drop(session);
            return true;
        }
        if let Some(id) = self.deferred_click.take()
            && self
                .hit_row(pos)
                .and_then(|i| self.data.core().rows().get(i))
                .is_some_and(|r| r.id() == id)
        {
            self.click_select(id, ClickSelect::default());
        }
        true
    }

    fn complete_drop(&mut self, session: DragSession) {
        let dragged = session.dragged().to_vec();
        let outcome = match session.target() {
            Some(target) => self.hooks.perform(self.data.backend_mut(), &dragged, &target),
            None => DropOutcome::Rejected,
        };
        match outcome {
            DropOutcome::Accepted { selection } => {
                tracing::debug!(count = dragged.len(), "drop accepted");
                self.data.reload_data();
                if let Some(target) = session.target() {
                    self.data.set_expanded(target.parent, true);
                }
                let anchor = selection.first().copied();
                self.set_selection_state(selection, anchor);
                self.events.push(TreeEvent::DragEnded {
                    dragged,
                    accepted: true,
                });
            }
            DropOutcome::Rejected => {
                tracing::debug!(count = dragged.len(), "drop rejected");
                self.restore_expansion(&session);
                self.events.push(TreeEvent::DragEnded {
                    dragged,
                    accepted: false,
                });
            }
        }
        self.sync();
    }

    fn restore_expansion(&mut self, session: &DragSession) {
        if let Some(snapshot) = session.expanded_snapshot() {
            self.data.set_expanded_ids(snapshot);
        }
    }

    /// Abort an active drag, restoring any rows it auto-expanded.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(session) = self.drag.finish() else {
            return false;
        };
        tracing::debug!("drag cancelled");
        self.restore_expansion(&session);
        self.events.push(TreeEvent::DragEnded {
            dragged: session.dragged().to_vec(),
            accepted: false,
        });
        true
    }

    fn key(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match key {
            Key::Up | Key::Down | Key::Home | Key::End | Key::PageUp | Key::PageDown => {
                self.navigate(key)
            }
            Key::Left => self.key_left(modifiers.contains(Modifiers::ALT)),
            Key::Right => self.key_right(modifiers.contains(Modifiers::ALT)),
            Key::Cancel => self.cancel_drag(),
            Key::Rename => match self.selection.ids() {
                [id] => {
                    let id = *id;
                    self.begin_rename(id).is_ok()
                }
                _ => false,
            },
            Key::SelectAll => self.select_all(),
            Key::Commit | Key::Backspace => false,
        }
    }

    fn anchor_row(&mut self) -> Option<usize> {
        let anchor = self.selection.anchor()?;
        self.data.row_of(anchor)
    }

    fn select_row(&mut self, index: usize) -> bool {
        let Some(id) = self.data.row(index).map(Row::id) else {
            return false;
        };
        self.set_selection_state(vec![id], Some(id));
        self.scroll_to_row(index, ScrollAlign::Nearest);
        true
    }

    fn navigate(&mut self, key: Key) -> bool {
        let count = self.data.row_count();
        if count == 0 {
            return false;
        }
        let last = count - 1;
        let current = self.anchor_row();
        let viewport = self.viewport.height();
        let target = match (key, current) {
            (Key::Home, _) => 0,
            (Key::End, _) => last,
            (Key::Up, Some(i)) => i.saturating_sub(1),
            (Key::Up, None) => last,
            (Key::Down, Some(i)) => (i + 1).min(last),
            (Key::Down, None) => 0,
            (Key::PageUp, i) => self.geometry.page_up(i.unwrap_or(0), viewport),
            (Key::PageDown, i) => self.geometry.page_down(i.unwrap_or(0), viewport),
            _ => return false,
        };
        self.select_row(target)
    }

    fn key_left(&mut self, alt: bool) -> bool {
        let Some(index) = self.anchor_row() else {
            return false;
        };
        let Some(row) = self.data.row(index).cloned() else {
            return false;
        };
        let id = row.id();
        let expandable = row.node().is_some_and(|n| self.data.is_expandable(n));
        if expandable && self.data.is_expanded(id) {
            if alt {
                self.data.set_expanded_with_children(id, false);
            } else {
                self.data.set_expanded(id, false);
            }
            return true;
        }
        if self.selection.ids().len() != 1 {
            return false;
        }
        let parent = match &row {
            Row::Committed { node, .. } => self
                .data
                .core()
                .tree()
                .parent_of(*node)
                .and_then(|p| self.data.item(p))
                .map(TreeItem::id),
            Row::Pending { item, .. } => Some(item.parent),
        };
        match parent.and_then(|p| self.data.row_of(p)) {
            Some(parent_row) => self.select_row(parent_row),
            None => false,
        }
    }

    fn key_right(&mut self, alt: bool) -> bool {
        let Some(index) = self.anchor_row() else {
            return false;
        };
        let Some(row) = self.data.row(index).cloned() else {
            return false;
        };
        let id = row.id();
        let expandable = row.node().is_some_and(|n| self.data.is_expandable(n));
        if !expandable {
            return false;
        }
        if alt {
            self.data.set_expanded_with_children(id, true);
            return true;
        }
        if !self.data.is_expanded(id) {
            self.data.set_expanded(id, true);
            return true;
        }
        if self.selection.ids().len() != 1 {
            return false;
        }
        let first_child = self
            .data
            .row(index + 1)
            .is_some_and(|next| next.depth() > row.depth());
        first_child && self.select_row(index + 1)
    }

    fn rename_input(&mut self, input: &TreeInput) -> Option<bool> {
        let session = self.rename.as_mut()?;
        match *input {
            TreeInput::Text(ch) => {
                session.insert_char(ch);
                Some(true)
            }
            TreeInput::Key { key, .. } => {
                match key {
                    Key::Backspace => session.backspace(),
                    Key::Commit => self.close_rename(true),
                    Key::Cancel => self.close_rename(false),
                    _ => {}
                }
                Some(true)
            }
            TreeInput::PointerDown { pos, .. } => {
                if self.rename_rect().is_some_and(|r| r.contains(pos)) {
                    return Some(true);
                }
                // Clicking elsewhere accepts the edit, then the click proceeds.
                self.close_rename(true);
                None
            }
            _ => None,
        }
    }

    fn rename_rect(&mut self) -> Option<Rect> {
        let id = self.rename.as_ref()?.target().id();
        let index = self.data.row_of(id)?;
        let depth = self.data.row(index)?.depth();
        let rect = self.row_rect(index);
        Some(layout_row(&self.config, rect, self.display_depth(depth)).label)
    }

    /// Start renaming the committed item `id`, revealing it first.
    pub fn begin_rename(&mut self, id: ItemId) -> Result<(), TreeError> {
        if self.rename.is_some() {
            return Err(TreeError::RenameInProgress);
        }
        if self.drag.is_dragging() {
            return Err(TreeError::DragInProgress);
        }
        let Some(label) = self
            .data
            .find_item(id)
            .and_then(|node| self.data.item(node))
            .map(|item| item.label().to_string())
        else {
            tracing::warn!(%id, "rename requested for unknown item");
            return Err(TreeError::UnknownItem(id));
        };
        if let Some(index) = self.data.reveal(id) {
            self.scroll_to_row(index, ScrollAlign::Nearest);
        }
        tracing::debug!(%id, "rename started");
        self.rename = Some(RenameSession::new(RenameTarget::Existing(id), label));
        Ok(())
    }

    /// Insert a pending child of `parent` and start renaming it.
    ///
    /// Accepting the rename calls [`RenameHandler::create`]; cancelling, or
    /// accepting an empty name, drops the pending row without touching the
    /// backend. Returns the pending row's ephemeral id.
    pub fn begin_create(&mut self, parent: ItemId, meta: ItemMeta) -> Result<ItemId, TreeError> {
        if self.rename.is_some() {
            return Err(TreeError::RenameInProgress);
        }
        if self.drag.is_dragging() {
            return Err(TreeError::DragInProgress);
        }
        if !self.data.backend().contains(parent) {
            tracing::warn!(%parent, "creation requested under unknown item");
            return Err(TreeError::UnknownItem(parent));
        }
        let id = ItemId(self.next_pending_id);
        let label = meta.label.clone();
        self.data.insert_pending(PendingItem { id, parent, meta })?;
        self.next_pending_id -= 1;
        self.data.reveal(parent);
        if let Some(index) = self.data.row_of(id) {
            self.scroll_to_row(index, ScrollAlign::Nearest);
        }
        tracing::debug!(%id, %parent, "creation started");
        self.rename = Some(RenameSession::new(RenameTarget::Creating(id), label));
        Ok(id)
    }

    /// Replace the text of the active rename.
    pub fn set_rename_text(&mut self, text: &str) -> Result<(), TreeError> {
        let session = self.rename.as_mut().ok_or(TreeError::NoActiveRename)?;
        session.set_text(text);
        Ok(())
    }

    /// Finish the active rename, accepting or cancelling it.
    ///
    /// Empty or unchanged names revert without calling the hooks and report
    /// `accepted: false`.
    pub fn end_rename(&mut self, accept: bool) -> Result<(), TreeError> {
        let session = self.rename.take().ok_or(TreeError::NoActiveRename)?;
        self.finish_rename(session, accept);
        Ok(())
    }

    fn close_rename(&mut self, accept: bool) {
        if let Some(session) = self.rename.take() {
            self.finish_rename(session, accept);
        }
    }

    fn finish_rename(&mut self, mut session: RenameSession, accept: bool) {
        let resolution = session.finish(accept);
        match session.target() {
            RenameTarget::Existing(id) => {
                let accepted = match resolution {
                    RenameResolution::Commit(name) => {
                        let ok = self.hooks.rename(self.data.backend_mut(), id, &name);
                        if ok {
                            self.data.reload_data();
                        }
                        ok
                    }
                    RenameResolution::Revert => false,
                };
                tracing::debug!(%id, accepted, "rename ended");
                self.events.push(TreeEvent::RenameEnded { id, accepted });
            }
            RenameTarget::Creating(pending_id) => {
                let pending = self.data.remove_pending();
                let created = match (resolution, pending) {
                    (RenameResolution::Commit(name), Some(pending)) => {
                        self.hooks.create(self.data.backend_mut(), &pending, &name)
                    }
                    _ => None,
                };
                if let Some(new_id) = created {
                    self.data.reload_data();
                    self.set_selection_state(vec![new_id], Some(new_id));
                }
                tracing::debug!(pending = %pending_id, created = ?created, "creation ended");
                self.events.push(TreeEvent::CreationEnded {
                    pending: pending_id,
                    id: created,
                });
            }
        }
        self.sync();
    }

    /// Paint the visible rows and overlays.
    pub fn draw(&mut self, painter: &mut impl RowPainter, now_ms: u64) {
        self.sync();
        let marker = self
            .drag
            .session()
            .map_or(DropMarker::None, DragSession::marker);
        let anchor = self.selection.anchor();
        let renaming = self.rename.as_ref().map(|s| s.target().id());
        let mut rename_rect = None;
        let mut indicator = match marker {
            DropMarker::Root => Some(DropIndicator::Root(self.viewport)),
            DropMarker::Rejected(None) => Some(DropIndicator::Rejected(None)),
            _ => None,
        };

        if let Some(range) = self.geometry.visible_range(self.scroll, self.viewport.height()) {
            let rows = self.data.core().rows();
            for index in range {
                let Some(row) = rows.get(index) else {
                    break;
                };
                let id = row.id();
                let rect = self.row_rect(index);
                let depth = self.display_depth(row.depth());
                let layout = layout_row(&self.config, rect, depth);
                let (label, icon, expandable) = match row {
                    Row::Committed { node, .. } => {
                        let item = self.data.item(*node);
                        (
                            item.map_or("", TreeItem::label),
                            item.and_then(TreeItem::icon),
                            item.is_some_and(TreeItem::has_children),
                        )
                    }
                    Row::Pending { item, .. } => (item.meta.label.as_str(), item.meta.icon, false),
                };
                let visual = RowVisual {
                    index,
                    id,
                    depth,
                    rect,
                    disclosure: expandable.then(|| Disclosure {
                        rect: layout.disclosure,
                        expanded: self.data.is_expanded(id),
                    }),
                    icon_rect: layout.icon,
                    label_rect: layout.label,
                    label,
                    icon,
                    selected: self.selection.contains(id),
                    focused: anchor == Some(id),
                    pending: row.is_pending(),
                    drop_target: marker == DropMarker::Onto(id),
                    renaming: renaming == Some(id),
                };
                painter.row(&visual);
                painter.row_overlay(&visual);

                if visual.renaming {
                    rename_rect = Some(layout.label);
                }
                if let Some(ping) = self.ping.as_mut()
                    && ping.id() == id
                {
                    ping.track(rect);
                }
                indicator = match marker {
                    DropMarker::Onto(target) if target == id => Some(DropIndicator::Onto(rect)),
                    DropMarker::Between { anchor } if anchor == id => {
                        Some(DropIndicator::Between {
                            from: Point::new(indent_x(&self.config, rect, depth), rect.y1),
                            to: Point::new(rect.x1, rect.y1),
                        })
                    }
                    DropMarker::Rejected(Some(hovered)) if hovered == id => {
                        Some(DropIndicator::Rejected(Some(rect)))
                    }
                    _ => indicator,
                };
            }
        }

        if let Some(indicator) = indicator {
            painter.drop_indicator(indicator);
        }
        if let (Some(session), Some(rect)) = (&self.rename, rename_rect) {
            painter.rename_overlay(&RenameOverlay {
                rect,
                text: session.text(),
                target: session.target(),
            });
        }
        if let Some(ping) = &self.ping
            && let (Some(rect), Some(intensity)) = (ping.rect(), ping.intensity(now_ms))
        {
            painter.ping(rect, intensity);
        }
    }
}
