//! Drag session state machine.
//!
//! # Responsibility
//! - Recognize long-press drags of cards, columns and palette icons.
//! - Track hover-to-merge and drop targets while dragging.
//! - Resolve a drag into exactly one `DragOutcome` for the board.
//!
//! # Invariants
//! - At most one session exists; every exit path (`release`, `cancel`,
//!   pending-cancel) drops it and cancels every timer it still holds.
//! - The controller never mutates the board; it only reads board order and
//!   layout geometry.
//! - Timer expiries for handles the session no longer holds are ignored.
//! - A merge-hold runs only while its card stays hovered; leaving the card
//!   before the hold elapses cancels it, while an armed merge lingers.

use crate::config::CanvasConfig;
use crate::drag::session::{
    CardDropTarget, DragPhase, DragSession, DragSubject, DragVisuals, DropSide, HoverTarget,
};
use crate::drag::targeting;
use crate::drag::timer::{HandleAllocator, TimerHandle, TimerKind, TimerRequest};
use crate::geometry::{LayoutKey, LayoutRegistry, Point};
use crate::model::board::{Board, CardDestination};
use crate::model::card::CardId;
use crate::model::column::ColumnId;
use crate::model::kind::CardKind;
use log::{debug, trace};

/// Mutation a resolved drag asks the board to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Wrap `target` and `dragged` into a nested column.
    Merge { target: CardId, dragged: CardId },
    MoveCard {
        card: CardId,
        destination: CardDestination,
    },
    /// Relocate the card into a new top-level column.
    DragOut { card: CardId },
    /// Move a column to a top-level gap; nested columns leave their group.
    MoveColumn { column: ColumnId, gap: usize },
    /// Palette icon clicked: append a card of `kind` to `column`.
    AddCard { column: ColumnId, kind: CardKind },
    /// Palette icon dropped outside every column.
    CreateColumn { kind: CardKind },
    /// Drag completed without a valid target; board stays unchanged.
    NoOp,
    /// Press never became a drag, or the drag was aborted.
    Cancelled,
}

impl DragOutcome {
    pub fn mutates_board(&self) -> bool {
        !matches!(self, Self::NoOp | Self::Cancelled)
    }
}

/// Result of ending a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragResolution {
    pub outcome: DragOutcome,
    /// Cancellations for timers the session still held.
    pub timers: Vec<TimerRequest>,
}

/// Drag gesture recognizer and target tracker.
#[derive(Debug)]
pub struct DragController {
    config: CanvasConfig,
    allocator: HandleAllocator,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            allocator: HandleAllocator::default(),
            session: None,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn phase(&self) -> DragPhase {
        self.session
            .as_ref()
            .map_or(DragPhase::Idle, |session| session.phase)
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn subject(&self) -> Option<DragSubject> {
        self.session.as_ref().map(|session| session.subject)
    }

    pub fn hover(&self) -> Option<HoverTarget> {
        self.session.as_ref().and_then(|session| session.hover)
    }

    /// Current ephemeral visuals; cleared whenever no drag is visible.
    pub fn visuals(&self) -> DragVisuals {
        self.session
            .as_ref()
            .map(DragSession::visuals)
            .unwrap_or_default()
    }

    /// Starts a pending card drag (idle -> pending).
    pub fn press_card(&mut self, card: CardId, source: ColumnId, at: Point) -> Vec<TimerRequest> {
        let delay = self.config.card_press_ms;
        self.press(DragSubject::Card { card, source }, at, delay)
    }

    /// Starts a pending column drag (idle -> pending).
    pub fn press_column(&mut self, column: ColumnId, at: Point) -> Vec<TimerRequest> {
        let delay = self.config.column_press_ms;
        self.press(DragSubject::Column { column }, at, delay)
    }

    /// Starts a pending palette-icon press: a click adds a card, a
    /// long-press drag may create a column.
    pub fn press_palette(
        &mut self,
        column: ColumnId,
        kind: CardKind,
        at: Point,
    ) -> Vec<TimerRequest> {
        let delay = self.config.card_press_ms;
        self.press(DragSubject::Palette { column, kind }, at, delay)
    }

    fn press(&mut self, subject: DragSubject, at: Point, delay_ms: u64) -> Vec<TimerRequest> {
        let mut requests = self.cancel();
        let mut session = DragSession::new(subject, at);
        session
            .press_timer
            .arm(&mut self.allocator, TimerKind::Press, delay_ms, &mut requests);
        trace!("event=drag_pending module=drag status=ok subject={subject:?}");
        self.session = Some(session);
        requests
    }

    /// Handles pointer movement in any phase.
    pub fn pointer_move(
        &mut self,
        board: &Board,
        layout: &LayoutRegistry,
        at: Point,
        now_ms: u64,
    ) -> Vec<TimerRequest> {
        let mut requests = Vec::new();
        let threshold = self.config.move_threshold_px;
        let Some(session) = self.session.as_mut() else {
            return requests;
        };
        session.current = at;
        let phase = session.phase;
        let subject = session.subject;

        match phase {
            DragPhase::Idle => {}
            DragPhase::Pending => {
                if session.origin.axis_distance(at) > threshold {
                    session.press_timer.disarm(&mut requests);
                    debug!("event=drag_pending_cancelled module=drag status=noop reason=moved");
                    self.session = None;
                }
            }
            DragPhase::Dragging => match subject {
                DragSubject::Card { card, .. } => {
                    self.track_card(board, layout, card, at, now_ms, &mut requests);
                }
                DragSubject::Column { column } => {
                    self.track_column(board, layout, column, at);
                }
                DragSubject::Palette { .. } => {}
            },
        }
        requests
    }

    /// Handles expiry of a previously scheduled timer.
    pub fn timer_fired(&mut self, handle: TimerHandle) -> Vec<TimerRequest> {
        let Some(session) = self.session.as_mut() else {
            trace!("event=timer_stale module=drag status=noop handle={}", handle.raw());
            return Vec::new();
        };

        if session.press_timer.fire(handle) {
            if session.phase == DragPhase::Pending {
                session.phase = DragPhase::Dragging;
                debug!(
                    "event=drag_started module=drag status=ok subject={:?}",
                    session.subject
                );
            }
        } else if session.merge_timer.fire(handle) {
            if let Some(hover) = session.hover.as_mut() {
                hover.armed = true;
                debug!("event=merge_armed module=drag status=ok card_id={}", hover.card);
            }
        } else {
            trace!("event=timer_stale module=drag status=noop handle={}", handle.raw());
        }
        Vec::new()
    }

    /// Ends the session on pointer-up and computes the outcome.
    pub fn release(&mut self, board: &Board, layout: &LayoutRegistry, at: Point) -> DragResolution {
        let Some(mut session) = self.session.take() else {
            return DragResolution {
                outcome: DragOutcome::Cancelled,
                timers: Vec::new(),
            };
        };
        let mut timers = Vec::new();
        session.press_timer.disarm(&mut timers);
        session.merge_timer.disarm(&mut timers);

        let outcome = match (session.phase, session.subject) {
            (DragPhase::Dragging, DragSubject::Card { card, .. }) => {
                self.resolve_card(board, layout, &mut session, card, at)
            }
            (DragPhase::Dragging, DragSubject::Column { column }) => {
                let margin = self.config.column_drop_margin_px;
                targeting::column_zone(board, layout, at, column, margin)
                    .or(session.column_zone)
                    .map_or(DragOutcome::NoOp, |zone| DragOutcome::MoveColumn {
                        column,
                        gap: zone.gap,
                    })
            }
            (DragPhase::Dragging, DragSubject::Palette { kind, .. }) => {
                if layout.column_at(board, at).is_none() && in_viewport(layout, at) {
                    DragOutcome::CreateColumn { kind }
                } else {
                    DragOutcome::NoOp
                }
            }
            (DragPhase::Pending, DragSubject::Palette { column, kind }) => {
                DragOutcome::AddCard { column, kind }
            }
            _ => DragOutcome::Cancelled,
        };
        debug!("event=drag_resolved module=drag status=ok outcome={outcome:?}");
        DragResolution { outcome, timers }
    }

    /// Aborts any session (pointer left the window, capture lost).
    pub fn cancel(&mut self) -> Vec<TimerRequest> {
        let mut requests = Vec::new();
        if let Some(mut session) = self.session.take() {
            session.press_timer.disarm(&mut requests);
            session.merge_timer.disarm(&mut requests);
            debug!(
                "event=drag_cancelled module=drag status=noop phase={:?}",
                session.phase
            );
        }
        requests
    }

    fn track_card(
        &mut self,
        board: &Board,
        layout: &LayoutRegistry,
        dragged: CardId,
        at: Point,
        now_ms: u64,
        requests: &mut Vec<TimerRequest>,
    ) {
        let hold = self.config.merge_hold_ms;
        let tolerance = self.config.band_tolerance_px;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let hovered = targeting::card_under(board, layout, at, dragged);
        match (hovered, session.hover) {
            (Some(card), Some(hover)) if hover.card == card => {}
            (Some(card), _) => {
                session.hover = Some(HoverTarget {
                    card,
                    since_ms: now_ms,
                    armed: false,
                });
                session
                    .merge_timer
                    .arm(&mut self.allocator, TimerKind::MergeHold, hold, requests);
            }
            (None, Some(hover)) if !hover.armed => {
                session.merge_timer.disarm(requests);
                session.hover = None;
                trace!("event=hover_left module=drag status=ok card_id={}", hover.card);
            }
            (None, _) => {}
        }

        session.card_target = card_target_at(board, layout, at, dragged, hovered, tolerance);
    }

    fn track_column(
        &mut self,
        board: &Board,
        layout: &LayoutRegistry,
        dragged: ColumnId,
        at: Point,
    ) {
        let margin = self.config.column_drop_margin_px;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match targeting::column_zone(board, layout, at, dragged, margin) {
            Some(zone) => {
                session.column_zone = Some(zone);
                session.zone_active = true;
            }
            None => session.zone_active = false,
        }
    }

    fn resolve_card(
        &self,
        board: &Board,
        layout: &LayoutRegistry,
        session: &mut DragSession,
        card: CardId,
        at: Point,
    ) -> DragOutcome {
        if let Some(hover) = session.hover.filter(|hover| hover.armed) {
            return DragOutcome::Merge {
                target: hover.card,
                dragged: card,
            };
        }

        let over_placeholder = layout
            .rect(LayoutKey::Card(card))
            .is_some_and(|rect| rect.contains(at));
        if over_placeholder {
            return DragOutcome::NoOp;
        }

        let tolerance = self.config.band_tolerance_px;
        let hovered = targeting::card_under(board, layout, at, card);
        let target = card_target_at(board, layout, at, card, hovered, tolerance)
            .filter(|_| layout.column_at(board, at).is_some())
            .or_else(|| {
                layout
                    .column_at(board, at)
                    .map(|column| CardDropTarget::EmptyColumn { column })
            });
        session.card_target = target;

        match target {
            Some(CardDropTarget::Anchor { card: anchor, side }) => DragOutcome::MoveCard {
                card,
                destination: match side {
                    DropSide::Before => CardDestination::Before { anchor },
                    DropSide::After => CardDestination::After { anchor },
                },
            },
            Some(CardDropTarget::EmptyColumn { column }) => DragOutcome::MoveCard {
                card,
                destination: CardDestination::End { column },
            },
            None if in_viewport(layout, at) => DragOutcome::DragOut { card },
            None => DragOutcome::NoOp,
        }
    }
}

/// Drops outside the canvas are ignored; without a reported viewport every
/// point counts as inside.
fn in_viewport(layout: &LayoutRegistry, at: Point) -> bool {
    layout
        .rect(LayoutKey::Viewport)
        .map_or(true, |rect| rect.contains(at))
}

/// Insertion point for a card drag at `at`.
///
/// Priority: the hovered card's half, then an empty column under the
/// pointer, then the nearest card in the horizontal band.
fn card_target_at(
    board: &Board,
    layout: &LayoutRegistry,
    at: Point,
    dragged: CardId,
    hovered: Option<CardId>,
    tolerance: f64,
) -> Option<CardDropTarget> {
    hovered
        .and_then(|card| targeting::side_of(layout, card, at))
        .or_else(|| targeting::empty_column_under(board, layout, at, dragged))
        .or_else(|| targeting::nearest_in_band(board, layout, at, dragged, tolerance))
}
