// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tree View: a renderer-agnostic tree view core.
//!
//! It turns a hierarchical data source of any size into a virtualized list of
//! visible rows, and implements the interaction semantics around them:
//! expand/collapse with persistence, multi-selection, keyboard navigation,
//! drag and drop with auto-expand, inline rename and "create then name" flows,
//! and a short-lived ping highlight.
//!
//! The crate does not draw and does not own an event loop. The host feeds it
//! [`TreeInput`] values and a clock sample, paints through a [`RowPainter`], and
//! reacts to [`TreeEvent`]s.
//!
//! ## Layers
//!
//! - [`TreeBackend`]: host data, addressed by [`ItemId`]. [`MemoryBackend`] is a
//!   ready-made in-memory implementation.
//! - [`DataSource`]: materializes the backend into an [`ItemTree`] and projects
//!   the expanded part into [`Row`]s. [`EagerDataSource`] loads everything;
//!   [`LazyDataSource`] loads only expanded items and asks the backend for
//!   ancestry, which keeps reveal cheap on huge trees.
//! - [`RowGeometry`]: pixel offsets of rows for hit testing, culling, paging,
//!   and scrolling, with uniform or per-row heights.
//! - [`TreeView`]: the controller. It owns the data source, the [`Selection`],
//!   the [`DragController`], the [`RenameSession`], and the [`Ping`].
//!
//! Host policies plug in at two seams: [`DragPolicy`] decides and applies drops,
//! [`RenameHandler`] commits renames and creations. Both receive the backend
//! explicitly; `()` implements them by refusing everything.
//!
//! ## Time
//!
//! There are no timers. Drag auto-expand and ping decay are driven by
//! [`TreeView::tick`] with milliseconds of a monotonic host clock.
//!
//! ## Example
//!
//! ```
//! use kurbo::{Point, Rect};
//! use understory_tree_view::{
//!     EagerDataSource, ItemId, MemoryBackend, MemoryHooks, Modifiers, PointerButton,
//!     TreeEvent, TreeInput, TreeView, TreeViewConfig,
//! };
//!
//! let backend = MemoryBackend::synthetic(100, 4);
//! let mut view = TreeView::with_hooks(
//!     EagerDataSource::new(backend),
//!     MemoryHooks,
//!     TreeViewConfig::default(),
//! );
//! view.set_viewport(Rect::new(0.0, 0.0, 240.0, 200.0));
//!
//! // Click the second row.
//! view.handle_input(
//!     &TreeInput::PointerDown {
//!         pos: Point::new(100.0, 30.0),
//!         button: PointerButton::Primary,
//!         click_count: 1,
//!         modifiers: Modifiers::empty(),
//!     },
//!     0,
//! );
//! assert_eq!(
//!     view.drain_events(),
//!     [TreeEvent::SelectionChanged(vec![ItemId(2)])]
//! );
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod backend;
mod config;
mod drag;
mod eager;
mod error;
mod event;
mod expanded;
mod geometry;
mod item_tree;
mod lazy;
mod memory;
mod ping;
mod rename;
mod selection;
mod source;
mod surface;
mod types;
mod view;

pub use backend::{ExpansionStore, TreeBackend};
pub use config::TreeViewConfig;
pub use drag::{
    DragController, DragPolicy, DragSession, DropMarker, DropOutcome, DropPosition, DropTarget,
    HoverZone, hover_zone, resolve_drop,
};
pub use eager::EagerDataSource;
pub use error::TreeError;
pub use event::{TreeEvent, TreeInput};
pub use expanded::ExpandedSet;
pub use geometry::{RowGeometry, RowHeight, ScrollAlign};
pub use item_tree::{Children, DepthFirst, ItemTree, NodeRef, TreeItem};
pub use lazy::LazyDataSource;
pub use memory::{MemoryBackend, MemoryHooks};
pub use ping::Ping;
pub use rename::{RenameHandler, RenameOverlay, RenameResolution, RenameSession, RenameTarget};
pub use selection::{ClickSelect, Selection, selection_after_click};
pub use source::{DataSource, PendingItem, Row, SourceConfig, SourceCore};
pub use surface::{Disclosure, DropIndicator, RowLayout, RowPainter, RowVisual, indent_x, layout_row};
pub use types::{IconHandle, ItemId, ItemMeta, Key, Modifiers, PointerButton};
pub use view::TreeView;
