//! Drop-target computation over the layout registry.
//!
//! # Invariants
//! - The dragged subject is never its own candidate.
//! - Elements without reported geometry are skipped.
//! - Scans follow board render order; the first minimal distance wins.

use crate::drag::session::{CardDropTarget, ColumnDropZone, DropSide};
use crate::geometry::{LayoutKey, LayoutRegistry, Point};
use crate::model::board::Board;
use crate::model::card::CardId;
use crate::model::column::ColumnId;

/// Card whose box contains the pointer, excluding the dragged one.
pub fn card_under(
    board: &Board,
    layout: &LayoutRegistry,
    at: Point,
    dragged: CardId,
) -> Option<CardId> {
    board
        .cards_in_order()
        .into_iter()
        .filter(|(card, _)| card.id != dragged)
        .find(|(card, _)| {
            layout
                .rect(LayoutKey::Card(card.id))
                .is_some_and(|rect| rect.contains(at))
        })
        .map(|(card, _)| card.id)
}

/// Insertion point relative to the card directly under the pointer.
pub fn side_of(layout: &LayoutRegistry, card: CardId, at: Point) -> Option<CardDropTarget> {
    let rect = layout.rect(LayoutKey::Card(card))?;
    Some(CardDropTarget::Anchor {
        card,
        side: half(at.y, rect.center_y()),
    })
}

/// Vertically nearest card whose widened horizontal band holds the pointer.
pub fn nearest_in_band(
    board: &Board,
    layout: &LayoutRegistry,
    at: Point,
    dragged: CardId,
    tolerance: f64,
) -> Option<CardDropTarget> {
    let mut best: Option<(CardId, f64, f64)> = None;
    for (card, _) in board.cards_in_order() {
        if card.id == dragged {
            continue;
        }
        let Some(rect) = layout.rect(LayoutKey::Card(card.id)) else {
            continue;
        };
        if !rect.in_horizontal_band(at.x, tolerance) {
            continue;
        }
        let distance = (at.y - rect.center_y()).abs();
        if best.map_or(true, |(_, best_distance, _)| distance < best_distance) {
            best = Some((card.id, distance, rect.center_y()));
        }
    }
    best.map(|(card, _, center_y)| CardDropTarget::Anchor {
        card,
        side: half(at.y, center_y),
    })
}

/// Innermost column under the pointer holding nothing but the dragged card.
pub fn empty_column_under(
    board: &Board,
    layout: &LayoutRegistry,
    at: Point,
    dragged: CardId,
) -> Option<CardDropTarget> {
    let column_id = layout.column_at(board, at)?;
    let column = board.column(column_id)?;
    column
        .is_empty_besides(dragged)
        .then_some(CardDropTarget::EmptyColumn { column: column_id })
}

/// Drop zone beside the nearest other top-level column.
///
/// A column qualifies when the pointer x lies within its box widened by
/// `margin`; the closest centre wins and the half picks the side.
pub fn column_zone(
    board: &Board,
    layout: &LayoutRegistry,
    at: Point,
    dragged: ColumnId,
    margin: f64,
) -> Option<ColumnDropZone> {
    let mut best: Option<(usize, ColumnId, f64, f64)> = None;
    for (index, column) in board.columns().iter().enumerate() {
        if column.id == dragged {
            continue;
        }
        let Some(rect) = layout.rect(LayoutKey::Column(column.id)) else {
            continue;
        };
        if !rect.in_horizontal_band(at.x, margin) {
            continue;
        }
        let distance = (at.x - rect.center_x()).abs();
        if best.map_or(true, |(_, _, best_distance, _)| distance < best_distance) {
            best = Some((index, column.id, distance, rect.center_x()));
        }
    }
    best.map(|(index, column, _, center_x)| {
        let side = half(at.x, center_x);
        let gap = match side {
            DropSide::Before => index,
            DropSide::After => index + 1,
        };
        ColumnDropZone { column, side, gap }
    })
}

fn half(value: f64, midpoint: f64) -> DropSide {
    if value < midpoint {
        DropSide::Before
    } else {
        DropSide::After
    }
}

#[cfg(test)]
mod tests {
    use super::{column_zone, nearest_in_band};
    use crate::drag::session::{CardDropTarget, DropSide};
    use crate::geometry::{LayoutKey, LayoutRegistry, Point, Rect};
    use crate::model::board::Board;
    use crate::model::kind::CardKind;

    #[test]
    fn nearest_in_band_ignores_cards_in_distant_columns() {
        let mut board = Board::bootstrap();
        let left = board.columns()[0].id;
        let right = board.add_column();
        let dragged = board.add_card(left, CardKind::Voice).unwrap();
        let left_card = board.columns()[0].cards().next().unwrap().id;
        let right_card = board.column(right).unwrap().cards().next().unwrap().id;

        let mut layout = LayoutRegistry::new();
        layout.report(LayoutKey::Card(left_card), Rect::new(0.0, 100.0, 200.0, 80.0));
        layout.report(LayoutKey::Card(right_card), Rect::new(400.0, 300.0, 200.0, 80.0));

        // x=230 is inside the left band (200 + 50) and outside the right one.
        let target = nearest_in_band(&board, &layout, Point::new(230.0, 320.0), dragged, 50.0);
        assert_eq!(
            target,
            Some(CardDropTarget::Anchor {
                card: left_card,
                side: DropSide::After
            })
        );
    }

    #[test]
    fn column_zone_reports_gap_for_each_half() {
        let mut board = Board::bootstrap();
        let a = board.columns()[0].id;
        let b = board.add_column();
        let c = board.add_column();

        let mut layout = LayoutRegistry::new();
        layout.report(LayoutKey::Column(a), Rect::new(0.0, 0.0, 300.0, 600.0));
        layout.report(LayoutKey::Column(b), Rect::new(320.0, 0.0, 300.0, 600.0));
        layout.report(LayoutKey::Column(c), Rect::new(640.0, 0.0, 300.0, 600.0));

        let zone = column_zone(&board, &layout, Point::new(900.0, 50.0), a, 100.0).unwrap();
        assert_eq!(zone.column, c);
        assert_eq!(zone.side, DropSide::After);
        assert_eq!(zone.gap, 3);

        let zone = column_zone(&board, &layout, Point::new(350.0, 50.0), c, 100.0).unwrap();
        assert_eq!(zone.column, b);
        assert_eq!(zone.side, DropSide::Before);
        assert_eq!(zone.gap, 1);

        assert!(column_zone(&board, &layout, Point::new(2000.0, 50.0), a, 100.0).is_none());
    }
}
