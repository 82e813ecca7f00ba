//! Ephemeral drag session state.
//!
//! A session exists from pointer-down to pointer-up or cancellation and is
//! never persisted. Renderers read it only through `DragVisuals`.

use crate::drag::timer::TimerSlot;
use crate::geometry::Point;
use crate::model::card::CardId;
use crate::model::column::ColumnId;
use crate::model::kind::CardKind;
use serde::{Deserialize, Serialize};

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "subject", rename_all = "snake_case")]
pub enum DragSubject {
    Card { card: CardId, source: ColumnId },
    /// Top-level or nested column, grabbed by its header.
    Column { column: ColumnId },
    /// Add-card palette icon opened from `column`'s header.
    Palette { column: ColumnId, kind: CardKind },
}

/// Lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    #[default]
    Idle,
    /// Long-press timer running, movement not yet confirmed as a drag.
    Pending,
    /// Proxy visible, targets recomputed on every move.
    Dragging,
}

/// Card currently hovered for a potential merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTarget {
    pub card: CardId,
    /// Host timestamp (ms) when hovering over `card` started.
    pub since_ms: u64,
    /// Set once the merge-hold elapsed; lingers until drop.
    pub armed: bool,
}

/// Side of an anchor element a drop lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropSide {
    Before,
    After,
}

/// Insertion point for a dragged card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum CardDropTarget {
    /// Next to an existing card.
    Anchor { card: CardId, side: DropSide },
    /// Directly into a column holding nothing but the placeholder.
    EmptyColumn { column: ColumnId },
}

/// Active half of a neighboring column while dragging a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDropZone {
    pub column: ColumnId,
    pub side: DropSide,
    /// Insertion gap in top-level order before the dragged column is removed.
    pub gap: usize,
}

/// Snapshot of every ephemeral visual; all `None` when idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DragVisuals {
    /// Floating proxy position.
    pub proxy: Option<Point>,
    /// Subject whose original slot shows the dashed placeholder.
    pub placeholder: Option<DragSubject>,
    /// Card highlighted as merge candidate.
    pub merge_candidate: Option<CardId>,
    /// Merge candidate whose hold elapsed.
    pub merge_armed: Option<CardId>,
    pub insertion: Option<CardDropTarget>,
    /// Drop-zone indicator, only while the pointer is inside a zone.
    pub drop_zone: Option<ColumnDropZone>,
}

impl DragVisuals {
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

/// Explicit drag context shared by card and column handling.
#[derive(Debug)]
pub(crate) struct DragSession {
    pub(crate) subject: DragSubject,
    pub(crate) origin: Point,
    pub(crate) current: Point,
    pub(crate) phase: DragPhase,
    pub(crate) press_timer: TimerSlot,
    pub(crate) merge_timer: TimerSlot,
    pub(crate) hover: Option<HoverTarget>,
    pub(crate) card_target: Option<CardDropTarget>,
    /// Last zone entered; kept for commit after the pointer leaves it.
    pub(crate) column_zone: Option<ColumnDropZone>,
    pub(crate) zone_active: bool,
}

impl DragSession {
    pub(crate) fn new(subject: DragSubject, origin: Point) -> Self {
        Self {
            subject,
            origin,
            current: origin,
            phase: DragPhase::Pending,
            press_timer: TimerSlot::default(),
            merge_timer: TimerSlot::default(),
            hover: None,
            card_target: None,
            column_zone: None,
            zone_active: false,
        }
    }

    pub(crate) fn visuals(&self) -> DragVisuals {
        if self.phase != DragPhase::Dragging {
            return DragVisuals::default();
        }
        DragVisuals {
            proxy: Some(self.current),
            placeholder: Some(self.subject),
            merge_candidate: self.hover.map(|hover| hover.card),
            merge_armed: self.hover.filter(|hover| hover.armed).map(|hover| hover.card),
            insertion: self.card_target,
            drop_zone: self.column_zone.filter(|_| self.zone_active),
        }
    }
}
