// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag and drop: hover zones, drop resolution, and the gesture state machine.
//!
//! The gesture moves through these phases:
//!
//! ```text
//! Idle --press--> Pressed --move past threshold--> Dragging
//!                    |                               | hover same collapsed row
//!                    |                               | for the delay: auto-expand
//!                  release                     release / cancel / leave
//!                    v                               v
//!                   Idle <------------------------- Idle
//! ```
//!
//! [`DragController`] only tracks the gesture. Resolving what a pointer position
//! means is [`resolve_drop`], which consults the data source and a
//! [`DragPolicy`].

use alloc::vec::Vec;
use hashbrown::HashSet;
use kurbo::{Point, Rect};

use crate::backend::TreeBackend as _;
use crate::source::DataSource;
use crate::types::ItemId;

/// Which part of a row the pointer is over.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HoverZone {
    /// Drop onto the row, making it the new parent.
    Onto,
    /// Drop after the row, as its next sibling.
    Between,
}

/// Classify a pointer at `y` over `row`.
///
/// The bottom `band` pixels of the row are [`HoverZone::Between`], boundary
/// included; the rest is [`HoverZone::Onto`]. A row that cannot take children is
/// `Between` everywhere.
pub fn hover_zone(row: Rect, y: f64, band: f64, can_be_parent: bool) -> HoverZone {
    if !can_be_parent || y >= row.y1 - band.max(0.0) {
        HoverZone::Between
    } else {
        HoverZone::Onto
    }
}

/// Where, under the target parent, dropped items go.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DropPosition {
    /// Appended as the last children.
    Onto,
    /// Inserted right after this sibling.
    After(ItemId),
}

/// A resolved drop destination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DropTarget {
    /// New parent of the dropped items.
    pub parent: ItemId,
    /// Position among the parent's children.
    pub position: DropPosition,
}

/// Result of performing a drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing changed.
    Rejected,
    /// The backend was mutated. `selection` holds the ids to select afterwards,
    /// which may differ from the dragged ids if the backend renumbered them.
    Accepted {
        /// Post-drop selection.
        selection: Vec<ItemId>,
    },
}

/// Per-backend drop semantics.
///
/// [`accepts`](DragPolicy::accepts) is called on every hover change to pick
/// between "onto" and "between" and must not mutate anything;
/// [`perform`](DragPolicy::perform) is called once on release.
pub trait DragPolicy<B: ?Sized> {
    /// Whether `dragged` may be dragged at all. Payload production for
    /// external drop targets also belongs here.
    fn can_start_drag(&mut self, backend: &B, dragged: &[ItemId]) -> bool {
        let _ = (backend, dragged);
        true
    }

    /// Whether dropping `dragged` at `target` would be accepted.
    fn accepts(&mut self, backend: &B, dragged: &[ItemId], target: &DropTarget) -> bool;

    /// Apply the drop.
    fn perform(&mut self, backend: &mut B, dragged: &[ItemId], target: &DropTarget) -> DropOutcome;
}

/// Disables dragging.
impl<B: ?Sized> DragPolicy<B> for () {
    fn can_start_drag(&mut self, _backend: &B, _dragged: &[ItemId]) -> bool {
        false
    }

    fn accepts(&mut self, _backend: &B, _dragged: &[ItemId], _target: &DropTarget) -> bool {
        false
    }

    fn perform(&mut self, _backend: &mut B, _dragged: &[ItemId], _target: &DropTarget) -> DropOutcome {
        DropOutcome::Rejected
    }
}

/// Visual cue for the current hover.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DropMarker {
    /// Not hovering anything yet.
    None,
    /// Highlight the row: items will become its children.
    Onto(ItemId),
    /// Insertion line below the row.
    Between {
        /// Row the line is drawn under.
        anchor: ItemId,
    },
    /// Empty space below the rows: items go under the root.
    Root,
    /// The drop would be refused. Carries the hovered row, if any.
    Rejected(Option<ItemId>),
}

fn is_dragged_or_inside<D: DataSource + ?Sized>(
    data: &mut D,
    dragged: &HashSet<ItemId>,
    parent: ItemId,
) -> bool {
    dragged.contains(&parent) || data.parents_above(parent).iter().any(|a| dragged.contains(a))
}

/// Resolve a hover into a drop target and a marker.
///
/// `hovered` is the row under the pointer and its zone, or `None` for empty
/// space below the last row. "Onto" is probed first (when the zone and the
/// item allow it), then "after, under the same parent". A parent that is one of
/// the dragged items, or lies inside one, is refused before `policy` is asked.
pub fn resolve_drop<D, P>(
    data: &mut D,
    policy: &mut P,
    dragged: &[ItemId],
    hovered: Option<(ItemId, HoverZone)>,
) -> (Option<DropTarget>, DropMarker)
where
    D: DataSource + ?Sized,
    P: DragPolicy<D::Backend> + ?Sized,
{
    let dragged_set: HashSet<ItemId> = dragged.iter().copied().collect();
    let mut valid = |data: &mut D, target: DropTarget| {
        !is_dragged_or_inside(data, &dragged_set, target.parent)
            && policy.accepts(data.backend(), dragged, &target)
    };

    let Some((id, zone)) = hovered else {
        let target = DropTarget {
            parent: data.root_id(),
            position: DropPosition::Onto,
        };
        return if valid(&mut *data, target) {
            (Some(target), DropMarker::Root)
        } else {
            (None, DropMarker::Rejected(None))
        };
    };

    if zone == HoverZone::Onto && data.can_be_parent(id) {
        let target = DropTarget {
            parent: id,
            position: DropPosition::Onto,
        };
        if valid(&mut *data, target) {
            return (Some(target), DropMarker::Onto(id));
        }
    }

    if !dragged_set.contains(&id)
        && let Some(parent) = data.backend().parent(id)
    {
        let target = DropTarget {
            parent,
            position: DropPosition::After(id),
        };
        if valid(&mut *data, target) {
            return (Some(target), DropMarker::Between { anchor: id });
        }
    }

    (None, DropMarker::Rejected(Some(id)))
}

#[derive(Clone, Debug, PartialEq)]
struct Hover {
    id: Option<ItemId>,
    since_ms: u64,
    auto_expanded: bool,
}

/// State of an active drag.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    dragged: Vec<ItemId>,
    expanded_snapshot: Option<Vec<ItemId>>,
    hover: Option<Hover>,
    target: Option<DropTarget>,
    marker: DropMarker,
    pointer: Point,
}

impl DragSession {
    /// The dragged ids, in selection order.
    pub fn dragged(&self) -> &[ItemId] {
        &self.dragged
    }

    /// Expanded set as it was before the first auto-expand, if one happened.
    pub fn expanded_snapshot(&self) -> Option<&[ItemId]> {
        self.expanded_snapshot.as_deref()
    }

    /// The hovered row, if any.
    pub fn hovered(&self) -> Option<ItemId> {
        self.hover.as_ref().and_then(|h| h.id)
    }

    /// Where a release would drop, if anywhere.
    pub fn target(&self) -> Option<DropTarget> {
        self.target
    }

    /// Visual cue for the current hover.
    pub fn marker(&self) -> DropMarker {
        self.marker
    }

    /// Last pointer position, in viewport coordinates.
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Record a resolved hover.
    pub fn set_resolution(&mut self, target: Option<DropTarget>, marker: DropMarker) {
        self.target = target;
        self.marker = marker;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Phase {
    #[default]
    Idle,
    Pressed {
        id: ItemId,
        origin: Point,
    },
    Dragging(DragSession),
}

/// Tracks a single drag gesture.
///
/// Time is sampled by the host once per tick and passed in as milliseconds of a
/// monotonic clock. There are no timers: a pending auto-expand is abandoned by
/// simply hovering something else.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragController {
    phase: Phase,
}

impl DragController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    /// Whether nothing is pressed or dragged.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// The pressed row, before the threshold is crossed.
    pub fn pressed(&self) -> Option<ItemId> {
        match self.phase {
            Phase::Pressed { id, .. } => Some(id),
            _ => None,
        }
    }

    /// The active session.
    pub fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            Phase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// The active session, mutably.
    pub fn session_mut(&mut self) -> Option<&mut DragSession> {
        match &mut self.phase {
            Phase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Arm a potential drag on `id`.
    pub fn press(&mut self, id: ItemId, origin: Point) {
        self.phase = Phase::Pressed { id, origin };
    }

    /// Whether the pointer at `pos` has left the press point by at least `threshold`.
    pub fn exceeds_threshold(&self, pos: Point, threshold: f64) -> bool {
        match self.phase {
            Phase::Pressed { origin, .. } => origin.distance(pos) >= threshold,
            _ => false,
        }
    }

    /// Begin dragging `dragged`.
    pub fn start(&mut self, dragged: Vec<ItemId>, pointer: Point) {
        tracing::debug!(count = dragged.len(), "drag started");
        self.phase = Phase::Dragging(DragSession {
            dragged,
            expanded_snapshot: None,
            hover: None,
            target: None,
            marker: DropMarker::None,
            pointer,
        });
    }

    /// Update the hovered row. The hover timer restarts when the row changes.
    pub fn hover(&mut self, hovered: Option<ItemId>, pointer: Point, now_ms: u64) {
        let Some(session) = self.session_mut() else {
            return;
        };
        session.pointer = pointer;
        if session.hover.as_ref().is_some_and(|h| h.id == hovered) {
            return;
        }
        session.hover = Some(Hover {
            id: hovered,
            since_ms: now_ms,
            auto_expanded: false,
        });
    }

    /// The hovered row if it has been hovered for at least `delay_ms` and has
    /// not been auto-expanded yet.
    pub fn auto_expand_due(&self, now_ms: u64, delay_ms: u64) -> Option<ItemId> {
        let hover = self.session()?.hover.as_ref()?;
        let id = hover.id?;
        (!hover.auto_expanded && now_ms.saturating_sub(hover.since_ms) >= delay_ms).then_some(id)
    }

    /// Record that the hovered row was auto-expanded. The first call in a
    /// session snapshots `expanded_before`.
    pub fn mark_auto_expanded(&mut self, expanded_before: &[ItemId]) {
        let Some(session) = self.session_mut() else {
            return;
        };
        if session.expanded_snapshot.is_none() {
            session.expanded_snapshot = Some(expanded_before.to_vec());
        }
        if let Some(hover) = &mut session.hover {
            hover.auto_expanded = true;
        }
    }

    /// End the gesture, returning the session if one was active.
    pub fn finish(&mut self) -> Option<DragSession> {
        match core::mem::take(&mut self.phase) {
            Phase::Dragging(session) => Some(session),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eager::EagerDataSource;
    use crate::memory::{MemoryBackend, MemoryHooks};
    use crate::types::ItemMeta;
    use alloc::vec;

    /// root(0) -> [a(1) -> [a1(3)], b(2), leaf(4, leaf-only)]
    fn source() -> EagerDataSource<MemoryBackend> {
        let mut mem = MemoryBackend::new(ItemId(0), ItemMeta::new("root"));
        mem.insert(ItemId(1), ItemId(0), ItemMeta::new("a")).unwrap();
        mem.insert(ItemId(2), ItemId(0), ItemMeta::new("b")).unwrap();
        mem.insert(ItemId(3), ItemId(1), ItemMeta::new("a1")).unwrap();
        mem.insert(ItemId(4), ItemId(0), ItemMeta::new("leaf")).unwrap();
        mem.set_leaf_only(ItemId(4), true);
        EagerDataSource::new(mem)
    }

    #[test]
    fn zone_band_is_inclusive() {
        let row = Rect::new(0.0, 20.0, 100.0, 40.0);
        assert_eq!(hover_zone(row, 33.9, 6.0, true), HoverZone::Onto);
        assert_eq!(hover_zone(row, 34.0, 6.0, true), HoverZone::Between);
        assert_eq!(hover_zone(row, 21.0, 6.0, false), HoverZone::Between);
    }

    #[test]
    fn onto_is_probed_first() {
        let mut data = source();
        let (target, marker) =
            resolve_drop(&mut data, &mut MemoryHooks, &[ItemId(2)], Some((ItemId(1), HoverZone::Onto)));
        assert_eq!(
            target,
            Some(DropTarget {
                parent: ItemId(1),
                position: DropPosition::Onto
            })
        );
        assert_eq!(marker, DropMarker::Onto(ItemId(1)));
    }

    #[test]
    fn leaf_only_falls_back_to_sibling() {
        let mut data = source();
        let (target, marker) =
            resolve_drop(&mut data, &mut MemoryHooks, &[ItemId(2)], Some((ItemId(4), HoverZone::Onto)));
        assert_eq!(
            target,
            Some(DropTarget {
                parent: ItemId(0),
                position: DropPosition::After(ItemId(4))
            })
        );
        assert_eq!(marker, DropMarker::Between { anchor: ItemId(4) });
    }

    #[test]
    fn dropping_into_own_subtree_is_rejected() {
        let mut data = source();
        let (target, marker) =
            resolve_drop(&mut data, &mut MemoryHooks, &[ItemId(1)], Some((ItemId(3), HoverZone::Onto)));
        assert_eq!(target, None);
        assert_eq!(marker, DropMarker::Rejected(Some(ItemId(3))));

        let (target, _) =
            resolve_drop(&mut data, &mut MemoryHooks, &[ItemId(1)], Some((ItemId(1), HoverZone::Between)));
        assert_eq!(target, None, "cannot insert after itself");
    }

    #[test]
    fn empty_space_targets_root() {
        let mut data = source();
        let (target, marker) = resolve_drop(&mut data, &mut MemoryHooks, &[ItemId(3)], None);
        assert_eq!(target.map(|t| t.parent), Some(ItemId(0)));
        assert_eq!(marker, DropMarker::Root);

        let (target, marker) = resolve_drop(&mut data, &mut (), &[ItemId(3)], None);
        assert_eq!(target, None);
        assert_eq!(marker, DropMarker::Rejected(None));
    }

    #[test]
    fn threshold_then_start() {
        let mut drag = DragController::new();
        drag.press(ItemId(2), Point::new(10.0, 10.0));
        assert_eq!(drag.pressed(), Some(ItemId(2)));
        assert!(!drag.exceeds_threshold(Point::new(12.0, 11.0), 4.0));
        assert!(drag.exceeds_threshold(Point::new(10.0, 14.0), 4.0));
        drag.start(vec![ItemId(2)], Point::new(10.0, 14.0));
        assert!(drag.is_dragging());
        assert_eq!(drag.pressed(), None);
        assert!(drag.finish().is_some());
        assert!(drag.is_idle());
    }

    #[test]
    fn auto_expand_timing() {
        let mut drag = DragController::new();
        drag.start(vec![ItemId(2)], Point::ZERO);
        drag.hover(Some(ItemId(1)), Point::ZERO, 1_000);
        assert_eq!(drag.auto_expand_due(1_699, 700), None);
        // Moving within the same row keeps the timer.
        drag.hover(Some(ItemId(1)), Point::new(0.0, 3.0), 1_500);
        assert_eq!(drag.auto_expand_due(1_700, 700), Some(ItemId(1)));

        drag.mark_auto_expanded(&[ItemId(0)]);
        assert_eq!(drag.auto_expand_due(3_000, 700), None, "fires once per hover");

        drag.hover(Some(ItemId(4)), Point::ZERO, 3_000);
        drag.mark_auto_expanded(&[ItemId(0), ItemId(1)]);
        let session = drag.finish().unwrap();
        assert_eq!(
            session.expanded_snapshot(),
            Some(&[ItemId(0)][..]),
            "snapshot is taken at the first auto-expand only"
        );
    }

    #[test]
    fn changing_rows_restarts_the_timer() {
        let mut drag = DragController::new();
        drag.start(vec![ItemId(2)], Point::ZERO);
        drag.hover(Some(ItemId(1)), Point::ZERO, 0);
        drag.hover(Some(ItemId(4)), Point::ZERO, 600);
        drag.hover(Some(ItemId(1)), Point::ZERO, 650);
        assert_eq!(drag.auto_expand_due(1_000, 700), None);
        assert_eq!(drag.auto_expand_due(1_350, 700), Some(ItemId(1)));
    }
}
