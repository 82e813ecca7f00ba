//! Logical geometry model for hit-testing.
//!
//! # Responsibility
//! - Store layout rectangles reported by renderers, keyed by element id.
//! - Answer pointer hit-tests without touching any rendering technology.
//!
//! # Invariants
//! - An element without a reported rectangle is absent from every candidate
//!   set; missing geometry is never an error.
//! - Hit-test scans follow board render order, so ties resolve to the first
//!   element in that order.

use crate::model::board::Board;
use crate::model::card::CardId;
use crate::model::column::ColumnId;
use crate::model::kind::{CardKind, ALL_CARD_KINDS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pointer position in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Largest per-axis distance, matching the press-cancel threshold check.
    pub fn axis_distance(self, other: Point) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Axis-aligned layout rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Inclusive containment on every edge.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// Whether `x` lies between the edges widened by `tolerance` on each side.
    pub fn in_horizontal_band(&self, x: f64, tolerance: f64) -> bool {
        x >= self.left - tolerance && x <= self.right() + tolerance
    }
}

/// Element whose rectangle a renderer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "element", content = "id", rename_all = "snake_case")]
pub enum LayoutKey {
    /// Scrollable canvas area.
    Viewport,
    /// Whole column box, content area included.
    Column(ColumnId),
    /// Draggable header strip of a column.
    ColumnHeader(ColumnId),
    /// Close/add buttons inside a column header.
    HeaderControls(ColumnId),
    Card(CardId),
    /// Delete button of a card.
    CardDelete(CardId),
    /// One icon of the add-card palette opened from a column header.
    PaletteIcon { column: ColumnId, kind: CardKind },
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A card's delete button.
    CardControl(CardId),
    /// A header button (close, palette toggle).
    HeaderControl(ColumnId),
    /// An open palette icon; pressing it adds a card or starts a drag.
    PaletteIcon { column: ColumnId, kind: CardKind },
    Card(CardId),
    ColumnHeader(ColumnId),
    /// Anything else: empty canvas or column body.
    Background,
}

/// Central registry of reported layout rectangles.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    rects: HashMap<LayoutKey, Rect>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records or replaces the rectangle for `key`.
    pub fn report(&mut self, key: LayoutKey, rect: Rect) {
        self.rects.insert(key, rect);
    }

    /// Drops the rectangle for an unmounted element.
    pub fn forget(&mut self, key: LayoutKey) {
        self.rects.remove(&key);
    }

    pub fn forget_card(&mut self, card_id: CardId) {
        self.forget(LayoutKey::Card(card_id));
        self.forget(LayoutKey::CardDelete(card_id));
    }

    pub fn forget_column(&mut self, column_id: ColumnId) {
        self.forget(LayoutKey::Column(column_id));
        self.forget(LayoutKey::ColumnHeader(column_id));
        self.forget(LayoutKey::HeaderControls(column_id));
        self.forget_palette(column_id);
    }

    /// Drops every icon of a closed palette.
    pub fn forget_palette(&mut self, column_id: ColumnId) {
        for kind in ALL_CARD_KINDS {
            self.forget(LayoutKey::PaletteIcon {
                column: column_id,
                kind,
            });
        }
    }

    pub fn rect(&self, key: LayoutKey) -> Option<Rect> {
        self.rects.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Classifies a pointer-down position.
    ///
    /// An open palette floats above everything. Controls win over the
    /// element that hosts them; cards win over the column header and body
    /// they sit in.
    pub fn hit_test(&self, board: &Board, point: Point) -> HitTarget {
        let cards = board.cards_in_order();
        let columns = board.columns_in_order();

        let contains = |key: LayoutKey| self.rect(key).is_some_and(|rect| rect.contains(point));

        for (column, _) in &columns {
            let icon = ALL_CARD_KINDS.into_iter().find(|kind| {
                contains(LayoutKey::PaletteIcon {
                    column: column.id,
                    kind: *kind,
                })
            });
            if let Some(kind) = icon {
                return HitTarget::PaletteIcon {
                    column: column.id,
                    kind,
                };
            }
        }

        if let Some((card, _)) = cards
            .iter()
            .find(|(card, _)| contains(LayoutKey::CardDelete(card.id)))
        {
            return HitTarget::CardControl(card.id);
        }
        if let Some((column, _)) = columns
            .iter()
            .find(|(column, _)| contains(LayoutKey::HeaderControls(column.id)))
        {
            return HitTarget::HeaderControl(column.id);
        }
        if let Some((card, _)) = cards
            .iter()
            .find(|(card, _)| contains(LayoutKey::Card(card.id)))
        {
            return HitTarget::Card(card.id);
        }
        // Deepest header wins so nested group headers shadow their parent body.
        if let Some((column, _)) = columns
            .iter()
            .filter(|(column, _)| contains(LayoutKey::ColumnHeader(column.id)))
            .max_by_key(|(_, depth)| *depth)
        {
            return HitTarget::ColumnHeader(column.id);
        }
        HitTarget::Background
    }

    /// Innermost column whose box contains `point`.
    pub fn column_at(&self, board: &Board, point: Point) -> Option<ColumnId> {
        board
            .columns_in_order()
            .into_iter()
            .filter(|(column, _)| {
                self.rect(LayoutKey::Column(column.id))
                    .is_some_and(|rect| rect.contains(point))
            })
            .fold(None::<(ColumnId, usize)>, |best, (column, depth)| match best {
                Some((_, best_depth)) if best_depth >= depth => best,
                _ => Some((column.id, depth)),
            })
            .map(|(column_id, _)| column_id)
    }
}
