//! Canvas session use-case service.
//!
//! # Responsibility
//! - Own the board, layout registry and gesture controllers of one canvas.
//! - Route pointer and timer events to either the pan or the drag controller.
//! - Commit drag outcomes and explicit edits to the board, then notify the
//!   observer.
//!
//! # Invariants
//! - This session is the only writer of its board.
//! - One gesture owns the pointer from down to up: pan and drag never run
//!   together.
//! - A refused mutation is a silent no-op: the board is unchanged and nothing
//!   reaches the observer.

use crate::config::CanvasConfig;
use crate::drag::controller::{DragController, DragOutcome};
use crate::drag::session::{DragPhase, DragVisuals};
use crate::drag::timer::{TimerHandle, TimerRequest};
use crate::geometry::{HitTarget, LayoutKey, LayoutRegistry, Point, Rect};
use crate::logging::log_canvas_config;
use crate::model::board::{Board, BoardError, BoardResult, CardDestination};
use crate::model::card::{CardBody, CardId};
use crate::model::column::ColumnId;
use crate::model::kind::{CardKind, KindRegistry};
use crate::pan::PanController;
use log::{debug, info};

/// Committed structural change, reported to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardChange {
    ColumnAdded { column: ColumnId },
    ColumnRemoved { column: ColumnId },
    ColumnRenamed { column: ColumnId },
    ColumnMoved { column: ColumnId, gap: usize },
    CardAdded { card: CardId, column: ColumnId },
    CardRemoved { card: CardId, column: ColumnId },
    CardBodyUpdated { card: CardId },
    CardMoved {
        card: CardId,
        destination: CardDestination,
    },
    CardsMerged {
        target: CardId,
        dragged: CardId,
        column: ColumnId,
    },
    CardDraggedOut { card: CardId, column: ColumnId },
}

/// Persistence hook for surrounding applications.
pub trait CanvasObserver {
    /// Called after every committed change with the updated board.
    fn board_changed(&mut self, board: &Board, change: &BoardChange);
}

impl CanvasObserver for () {
    fn board_changed(&mut self, _board: &Board, _change: &BoardChange) {}
}

/// Host-visible effects of one input event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventEffects {
    /// Timers to schedule or cancel.
    pub timers: Vec<TimerRequest>,
    /// New viewport scroll offset, when it changed.
    pub scroll_offset: Option<f64>,
    /// Board change committed by this event.
    pub change: Option<BoardChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Idle,
    Pan,
    Drag,
}

/// One interactive canvas: board state plus gesture coordination.
pub struct CanvasSession<O: CanvasObserver = ()> {
    board: Board,
    layout: LayoutRegistry,
    kinds: KindRegistry,
    drag: DragController,
    pan: PanController,
    gesture: Gesture,
    observer: O,
}

impl CanvasSession<()> {
    /// Creates a bootstrapped canvas without an observer.
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_observer(config, ())
    }
}

impl<O: CanvasObserver> CanvasSession<O> {
    pub fn with_observer(config: CanvasConfig, observer: O) -> Self {
        log_canvas_config(&config);
        Self {
            board: Board::bootstrap(),
            layout: LayoutRegistry::new(),
            kinds: KindRegistry::new(),
            pan: PanController::new(&config),
            drag: DragController::new(config),
            gesture: Gesture::Idle,
            observer,
        }
    }

    /// Replaces the board with a restored snapshot.
    ///
    /// Any gesture in flight is cancelled and all geometry is dropped.
    pub fn restore(&mut self, board: Board) -> BoardResult<Vec<TimerRequest>> {
        board.validate()?;
        let timers = self.drag.cancel();
        self.pan.stop();
        self.gesture = Gesture::Idle;
        self.layout.clear();
        self.board = board;
        info!(
            "event=board_restored module=canvas status=ok columns={} cards={}",
            self.board.columns().len(),
            self.board.total_card_count()
        );
        Ok(timers)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn layout(&self) -> &LayoutRegistry {
        &self.layout
    }

    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    pub fn kinds_mut(&mut self) -> &mut KindRegistry {
        &mut self.kinds
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn visuals(&self) -> DragVisuals {
        self.drag.visuals()
    }

    pub fn scroll_offset(&self) -> f64 {
        self.pan.offset()
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_panning()
    }

    /// Records a renderer-reported rectangle.
    pub fn report_layout(&mut self, key: LayoutKey, rect: Rect) {
        self.layout.report(key, rect);
    }

    pub fn forget_layout(&mut self, key: LayoutKey) {
        self.layout.forget(key);
    }

    /// Drops the icons of a closed add-card palette.
    pub fn close_palette(&mut self, column: ColumnId) {
        self.layout.forget_palette(column);
    }

    /// Sets the scrollable width beyond the viewport.
    pub fn set_max_scroll(&mut self, max_scroll: Option<f64>) {
        self.pan.set_max_scroll(max_scroll);
    }

    pub fn pointer_down(&mut self, at: Point) -> EventEffects {
        let mut effects = EventEffects {
            timers: self.drag.cancel(),
            ..EventEffects::default()
        };
        self.pan.stop();
        self.gesture = Gesture::Idle;

        match self.layout.hit_test(&self.board, at) {
            HitTarget::CardControl(_) | HitTarget::HeaderControl(_) => {}
            HitTarget::Card(card) => {
                if let Some(location) = self.board.locate_card(card) {
                    effects
                        .timers
                        .extend(self.drag.press_card(card, location.column_id, at));
                    self.gesture = Gesture::Drag;
                }
            }
            HitTarget::ColumnHeader(column) => {
                effects.timers.extend(self.drag.press_column(column, at));
                self.gesture = Gesture::Drag;
            }
            HitTarget::PaletteIcon { column, kind } => {
                effects
                    .timers
                    .extend(self.drag.press_palette(column, kind, at));
                self.gesture = Gesture::Drag;
            }
            HitTarget::Background => {
                self.pan.begin(at.x);
                self.gesture = Gesture::Pan;
            }
        }
        effects
    }

    pub fn pointer_move(&mut self, at: Point, now_ms: u64) -> EventEffects {
        let mut effects = EventEffects::default();
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Pan => effects.scroll_offset = self.pan.update(at.x),
            Gesture::Drag => {
                effects.timers = self
                    .drag
                    .pointer_move(&self.board, &self.layout, at, now_ms);
                if !self.drag.is_active() {
                    self.gesture = Gesture::Idle;
                }
            }
        }
        effects
    }

    pub fn pointer_up(&mut self, at: Point) -> EventEffects {
        let mut effects = EventEffects::default();
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Pan => {
                self.pan.end();
            }
            Gesture::Drag => {
                let resolution = self.drag.release(&self.board, &self.layout, at);
                effects.timers = resolution.timers;
                effects.change = self.commit(resolution.outcome);
            }
        }
        effects
    }

    /// Pointer left the canvas or capture was lost.
    ///
    /// A pan ends normally (inertia may follow); a drag is cancelled.
    pub fn pointer_leave(&mut self) -> EventEffects {
        let mut effects = EventEffects::default();
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Pan => {
                self.pan.end();
            }
            Gesture::Drag => effects.timers = self.drag.cancel(),
        }
        effects
    }

    pub fn timer_fired(&mut self, handle: TimerHandle) -> EventEffects {
        EventEffects {
            timers: self.drag.timer_fired(handle),
            ..EventEffects::default()
        }
    }

    /// Advances pan inertia by one animation frame.
    pub fn inertia_frame(&mut self) -> Option<f64> {
        self.pan.inertia_step()
    }

    pub fn add_column(&mut self) -> ColumnId {
        let column = self.board.add_column();
        self.notify(BoardChange::ColumnAdded { column });
        column
    }

    /// Removes a column; the last top-level column is kept.
    pub fn remove_column(&mut self, column: ColumnId) -> bool {
        let removed = self.board.remove_column(column);
        if removed {
            self.layout.forget_column(column);
            self.notify(BoardChange::ColumnRemoved { column });
        }
        removed
    }

    pub fn rename_column(&mut self, column: ColumnId, title: &str) -> BoardResult<()> {
        self.board.rename_column(column, title)?;
        self.notify(BoardChange::ColumnRenamed { column });
        Ok(())
    }

    /// Appends a card of `kind` using the registry's icon and label.
    pub fn add_card(&mut self, column: ColumnId, kind: CardKind) -> BoardResult<CardId> {
        let info = self.kinds.lookup(kind);
        let card = self.board.add_card_with(column, kind, &info)?;
        self.notify(BoardChange::CardAdded { card, column });
        Ok(card)
    }

    pub fn duplicate_card(&mut self, column: ColumnId, card: CardId) -> BoardResult<CardId> {
        let copy = self.board.duplicate_card(column, card)?;
        self.notify(BoardChange::CardAdded { card: copy, column });
        Ok(copy)
    }

    /// Removes a card owned directly by `column`. Absent ids are a no-op.
    pub fn remove_card(&mut self, column: ColumnId, card: CardId) -> bool {
        let removed = self.board.remove_card_from(column, card);
        if removed {
            self.layout.forget_card(card);
            self.notify(BoardChange::CardRemoved { card, column });
        }
        removed
    }

    /// Stores editor output for one card.
    pub fn set_card_body(&mut self, card: CardId, body: CardBody) -> BoardResult<()> {
        let len = body.len();
        self.board.set_card_body(card, body)?;
        debug!("event=card_body_updated module=canvas status=ok card_id={card} bytes={len}");
        self.notify(BoardChange::CardBodyUpdated { card });
        Ok(())
    }

    /// Moves a card without a gesture (keyboard or host command).
    pub fn move_card(&mut self, card: CardId, destination: CardDestination) -> BoardResult<()> {
        self.board.move_card(card, destination)?;
        self.notify(BoardChange::CardMoved { card, destination });
        Ok(())
    }

    pub fn move_column(&mut self, column: ColumnId, gap: usize) -> BoardResult<()> {
        self.board.move_column(column, gap)?;
        self.notify(BoardChange::ColumnMoved { column, gap });
        Ok(())
    }

    fn commit(&mut self, outcome: DragOutcome) -> Option<BoardChange> {
        let result: Result<BoardChange, BoardError> = match outcome {
            DragOutcome::Merge { target, dragged } => self
                .board
                .merge_cards(target, dragged)
                .map(|column| BoardChange::CardsMerged {
                    target,
                    dragged,
                    column,
                }),
            DragOutcome::MoveCard { card, destination } => self
                .board
                .move_card(card, destination)
                .map(|()| BoardChange::CardMoved { card, destination }),
            DragOutcome::DragOut { card } => self
                .board
                .drag_out_card(card)
                .map(|column| BoardChange::CardDraggedOut { card, column }),
            DragOutcome::MoveColumn { column, gap } => self
                .board
                .move_column(column, gap)
                .map(|()| BoardChange::ColumnMoved { column, gap }),
            DragOutcome::AddCard { column, kind } => {
                let info = self.kinds.lookup(kind);
                self.board
                    .add_card_with(column, kind, &info)
                    .map(|card| BoardChange::CardAdded { card, column })
            }
            DragOutcome::CreateColumn { kind } => Ok(BoardChange::ColumnAdded {
                column: self.board.add_kind_column(kind),
            }),
            DragOutcome::NoOp | DragOutcome::Cancelled => return None,
        };

        match result {
            Ok(change) => {
                info!("event=drag_committed module=canvas status=ok change={change:?}");
                self.notify(change);
                Some(change)
            }
            Err(err) => {
                debug!("event=drag_committed module=canvas status=noop reason=\"{err}\"");
                None
            }
        }
    }

    fn notify(&mut self, change: BoardChange) {
        self.observer.board_changed(&self.board, &change);
    }
}
