//! Board state and structural mutations.
//!
//! # Responsibility
//! - Own the ordered top-level columns of one canvas.
//! - Apply every structural change: add/remove/rename, move, merge, drag-out.
//!
//! # Invariants
//! - `columns` is never empty once bootstrapped.
//! - Every card id is owned by exactly one column sequence.
//! - A failed mutation leaves the board unchanged: all lookups that can fail
//!   run before the first write.
//! - Nesting is one level deep; merging onto a card that already lives in a
//!   nested column joins that group instead of nesting further.
//! - A nested column emptied by a move, merge or drag-out is dissolved.

use crate::model::card::{Card, CardBody, CardId};
use crate::model::column::{CardLocation, Column, ColumnEntry, ColumnId};
use crate::model::kind::{CardKind, KindInfo};
use chrono::Local;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by board mutations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Reasons a board mutation was refused. The board is unchanged in all cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Card id is not owned by any column.
    CardNotFound(CardId),
    /// Column id is neither top-level nor nested in this board.
    ColumnNotFound(ColumnId),
    /// Removing the column would leave the board without top-level columns.
    LastColumn(ColumnId),
    /// Card was asked to move relative to or merge with itself.
    SameCard(CardId),
    /// Title is blank after trim.
    InvalidTitle,
    /// Snapshot has no top-level column.
    EmptyBoard,
    /// Snapshot lists the same card id in more than one place.
    DuplicateCard(CardId),
    /// Snapshot lists the same column id in more than one place.
    DuplicateColumn(ColumnId),
    /// Snapshot nesting flag disagrees with position, or nests too deep.
    InvalidNesting(ColumnId),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CardNotFound(id) => write!(f, "card not found: {id}"),
            Self::ColumnNotFound(id) => write!(f, "column not found: {id}"),
            Self::LastColumn(id) => write!(f, "refusing to remove last top-level column: {id}"),
            Self::SameCard(id) => write!(f, "card cannot target itself: {id}"),
            Self::InvalidTitle => write!(f, "column title must not be blank"),
            Self::EmptyBoard => write!(f, "board must keep at least one top-level column"),
            Self::DuplicateCard(id) => write!(f, "card owned by more than one column: {id}"),
            Self::DuplicateColumn(id) => write!(f, "column listed more than once: {id}"),
            Self::InvalidNesting(id) => write!(f, "column nesting is inconsistent: {id}"),
        }
    }
}

impl Error for BoardError {}

/// Where a moved card lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "at", rename_all = "snake_case")]
pub enum CardDestination {
    /// Directly before the anchor card, in the anchor's column.
    Before { anchor: CardId },
    /// Directly after the anchor card, in the anchor's column.
    After { anchor: CardId },
    /// Appended to the column.
    End { column: ColumnId },
    /// At `index`, counted after the moved card left its source.
    Index { column: ColumnId, index: usize },
}

/// Top-level ordered collection of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    columns: Vec<Column>,
    /// Number of columns created through `add_column`, used for titles.
    columns_created: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::bootstrap()
    }
}

impl Board {
    /// Creates a board with one column holding one default text card.
    pub fn bootstrap() -> Self {
        let mut board = Self {
            columns: Vec::new(),
            columns_created: 0,
        };
        board.add_column();
        board
    }

    /// Checks the invariants a restored snapshot must satisfy.
    pub fn validate(&self) -> BoardResult<()> {
        if self.columns.is_empty() {
            return Err(BoardError::EmptyBoard);
        }
        let mut columns = HashSet::new();
        for (column, depth) in self.columns_in_order() {
            if !columns.insert(column.id) {
                return Err(BoardError::DuplicateColumn(column.id));
            }
            if depth > 1 || column.is_nested != (depth == 1) {
                return Err(BoardError::InvalidNesting(column.id));
            }
        }
        let mut cards = HashSet::new();
        for (card, _) in self.cards_in_order() {
            if !cards.insert(card.id) {
                return Err(BoardError::DuplicateCard(card.id));
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, column_id: ColumnId) -> Option<&Column> {
        self.columns
            .iter()
            .find_map(|column| column.find_column(column_id))
    }

    fn column_mut(&mut self, column_id: ColumnId) -> Option<&mut Column> {
        for column in &mut self.columns {
            if let Some(found) = column.find_column_mut(column_id) {
                return Some(found);
            }
        }
        None
    }

    pub fn top_level_index(&self, column_id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|column| column.id == column_id)
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.columns
            .iter()
            .find_map(|column| column.find_card(card_id))
    }

    pub fn locate_card(&self, card_id: CardId) -> Option<CardLocation> {
        self.columns
            .iter()
            .find_map(|column| column.locate_card(card_id))
    }

    /// Every card in render order with its owning column id.
    pub fn cards_in_order(&self) -> Vec<(&Card, ColumnId)> {
        let mut out = Vec::new();
        for column in &self.columns {
            column.visit_cards(&mut out);
        }
        out
    }

    /// Every column (nested included), parents first, with nesting depth.
    pub fn columns_in_order(&self) -> Vec<(&Column, usize)> {
        let mut out = Vec::new();
        for column in &self.columns {
            column.visit_columns(0, &mut out);
        }
        out
    }

    /// Counts cards recursively through nested columns.
    pub fn total_card_count(&self) -> usize {
        self.columns.iter().map(Column::total_card_count).sum()
    }

    /// Appends a numbered column seeded with one default text card.
    pub fn add_column(&mut self) -> ColumnId {
        self.columns_created += 1;
        let mut column = Column::new(format!("Column {}", self.columns_created));
        column
            .entries
            .push(ColumnEntry::Card(Card::new(CardKind::Text)));
        let column_id = column.id;
        self.columns.push(column);
        debug!("event=column_added module=board status=ok column_id={column_id}");
        column_id
    }

    /// Appends an unseeded top-level column.
    pub fn add_empty_column(&mut self, title: impl Into<String>) -> ColumnId {
        let column = Column::new(title);
        let column_id = column.id;
        self.columns.push(column);
        debug!("event=column_added module=board status=ok column_id={column_id} seeded=false");
        column_id
    }

    /// Appends an empty column titled after `kind`, e.g. "Mail Column".
    pub fn add_kind_column(&mut self, kind: CardKind) -> ColumnId {
        self.add_empty_column(kind_column_title(kind))
    }

    /// Removes a top-level or nested column with everything it holds.
    ///
    /// Returns `false` when the id is absent or it is the last top-level column.
    pub fn remove_column(&mut self, column_id: ColumnId) -> bool {
        if let Some(index) = self.top_level_index(column_id) {
            if self.columns.len() <= 1 {
                debug!("event=column_remove module=board status=noop reason=last_column");
                return false;
            }
            self.columns.remove(index);
            return true;
        }
        self.columns
            .iter_mut()
            .find_map(|column| column.remove_nested(column_id))
            .is_some()
    }

    pub fn rename_column(
        &mut self,
        column_id: ColumnId,
        title: impl Into<String>,
    ) -> BoardResult<()> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(BoardError::InvalidTitle);
        }
        let column = self
            .column_mut(column_id)
            .ok_or(BoardError::ColumnNotFound(column_id))?;
        column.title = trimmed.to_string();
        Ok(())
    }

    /// Appends a new card of `kind` with built-in affordances.
    pub fn add_card(&mut self, column_id: ColumnId, kind: CardKind) -> BoardResult<CardId> {
        self.add_card_with(column_id, kind, &kind.builtin_info())
    }

    /// Appends a new card using registry-supplied affordances.
    pub fn add_card_with(
        &mut self,
        column_id: ColumnId,
        kind: CardKind,
        info: &KindInfo,
    ) -> BoardResult<CardId> {
        let column = self
            .column_mut(column_id)
            .ok_or(BoardError::ColumnNotFound(column_id))?;
        let card = Card::with_info(kind, info, Local::now());
        let card_id = card.id;
        column.entries.push(ColumnEntry::Card(card));
        Ok(card_id)
    }

    /// Appends a duplicate of `card_id` to `column_id`.
    pub fn duplicate_card(&mut self, column_id: ColumnId, card_id: CardId) -> BoardResult<CardId> {
        let copy = self
            .card(card_id)
            .ok_or(BoardError::CardNotFound(card_id))?
            .duplicate();
        let column = self
            .column_mut(column_id)
            .ok_or(BoardError::ColumnNotFound(column_id))?;
        let copy_id = copy.id;
        column.entries.push(ColumnEntry::Card(copy));
        Ok(copy_id)
    }

    /// Stores editor output for one card.
    pub fn set_card_body(&mut self, card_id: CardId, body: CardBody) -> BoardResult<()> {
        let card = self
            .columns
            .iter_mut()
            .find_map(|column| column.find_card_mut(card_id))
            .ok_or(BoardError::CardNotFound(card_id))?;
        card.body = body;
        Ok(())
    }

    /// Detaches a card from wherever it lives. Absent ids are a no-op.
    pub fn remove_card(&mut self, card_id: CardId) -> Option<Card> {
        let location = self.locate_card(card_id)?;
        self.take_card_at(location)
    }

    /// Removes a card only if `column_id` owns it directly.
    pub fn remove_card_from(&mut self, column_id: ColumnId, card_id: CardId) -> bool {
        match self.locate_card(card_id) {
            Some(location) if location.column_id == column_id => {
                self.take_card_at(location).is_some()
            }
            _ => false,
        }
    }

    fn take_card_at(&mut self, location: CardLocation) -> Option<Card> {
        let column = self.column_mut(location.column_id)?;
        if location.index >= column.entries.len() {
            return None;
        }
        match column.entries.remove(location.index) {
            ColumnEntry::Card(card) => Some(card),
            entry @ ColumnEntry::Nested(_) => {
                column.entries.insert(location.index, entry);
                None
            }
        }
    }

    /// Moves a card to `destination`, transferring ownership.
    pub fn move_card(&mut self, card_id: CardId, destination: CardDestination) -> BoardResult<()> {
        if self.locate_card(card_id).is_none() {
            return Err(BoardError::CardNotFound(card_id));
        }
        match destination {
            CardDestination::Before { anchor } | CardDestination::After { anchor } => {
                if anchor == card_id {
                    return Err(BoardError::SameCard(card_id));
                }
                if self.locate_card(anchor).is_none() {
                    return Err(BoardError::CardNotFound(anchor));
                }
            }
            CardDestination::End { column } | CardDestination::Index { column, .. } => {
                if self.column(column).is_none() {
                    return Err(BoardError::ColumnNotFound(column));
                }
            }
        }

        let card = self
            .remove_card(card_id)
            .ok_or(BoardError::CardNotFound(card_id))?;
        let (column_id, index) = match destination {
            CardDestination::Before { anchor } | CardDestination::After { anchor } => {
                let anchor_at = self
                    .locate_card(anchor)
                    .ok_or(BoardError::CardNotFound(anchor))?;
                let offset = usize::from(matches!(destination, CardDestination::After { .. }));
                (anchor_at.column_id, Some(anchor_at.index + offset))
            }
            CardDestination::End { column } => (column, None),
            CardDestination::Index { column, index } => (column, Some(index)),
        };
        let column = self
            .column_mut(column_id)
            .ok_or(BoardError::ColumnNotFound(column_id))?;
        let index = index
            .map(|value| value.min(column.entries.len()))
            .unwrap_or(column.entries.len());
        column.entries.insert(index, ColumnEntry::Card(card));
        self.dissolve_empty_nested();
        debug!(
            "event=card_moved module=board status=ok card_id={card_id} column_id={column_id} index={index}"
        );
        Ok(())
    }

    /// Relocates a card into a new top-level column titled from its kind.
    pub fn drag_out_card(&mut self, card_id: CardId) -> BoardResult<ColumnId> {
        let card = self
            .remove_card(card_id)
            .ok_or(BoardError::CardNotFound(card_id))?;
        let mut column = Column::new(kind_column_title(card.kind));
        column.entries.push(ColumnEntry::Card(card));
        let column_id = column.id;
        self.columns.push(column);
        self.dissolve_empty_nested();
        debug!(
            "event=card_dragged_out module=board status=ok card_id={card_id} column_id={column_id}"
        );
        Ok(column_id)
    }

    /// Moves a column to the top-level insertion gap `gap`.
    ///
    /// `gap` is counted in the order before removal: `0` is before the first
    /// column, `len` is after the last one. A nested column leaves its group
    /// and becomes top-level.
    pub fn move_column(&mut self, column_id: ColumnId, gap: usize) -> BoardResult<()> {
        let from = match self.top_level_index(column_id) {
            Some(index) => index,
            None if self.column(column_id).is_some() => return self.unnest_column(column_id, gap),
            None => return Err(BoardError::ColumnNotFound(column_id)),
        };
        let mut to = gap.min(self.columns.len());
        if to > from {
            to -= 1;
        }
        if to == from {
            return Ok(());
        }
        let column = self.columns.remove(from);
        self.columns.insert(to, column);
        debug!("event=column_moved module=board status=ok column_id={column_id} from={from} to={to}");
        Ok(())
    }

    fn unnest_column(&mut self, column_id: ColumnId, gap: usize) -> BoardResult<()> {
        let to = gap.min(self.columns.len());
        let mut column = self
            .columns
            .iter_mut()
            .find_map(|parent| parent.remove_nested(column_id))
            .ok_or(BoardError::ColumnNotFound(column_id))?;
        column.is_nested = false;
        self.columns.insert(to, column);
        debug!("event=column_unnested module=board status=ok column_id={column_id} to={to}");
        Ok(())
    }

    /// Drops nested columns whose last card moved away.
    fn dissolve_empty_nested(&mut self) {
        for column in &mut self.columns {
            column.entries.retain(|entry| match entry {
                ColumnEntry::Nested(nested) if nested.is_empty() => {
                    debug!(
                        "event=nested_dissolved module=board status=ok column_id={}",
                        nested.id
                    );
                    false
                }
                _ => true,
            });
        }
    }

    /// Merges `dragged` onto `target`.
    ///
    /// Both cards leave their columns and become `[target, dragged]` of a new
    /// nested column inserted at `target`'s former index. When `target`
    /// already lives in a nested column, `dragged` joins it right after
    /// `target`. Returns the id of the column holding both cards.
    pub fn merge_cards(&mut self, target: CardId, dragged: CardId) -> BoardResult<ColumnId> {
        if target == dragged {
            return Err(BoardError::SameCard(target));
        }
        let target_at = self
            .locate_card(target)
            .ok_or(BoardError::CardNotFound(target))?;
        if self.locate_card(dragged).is_none() {
            return Err(BoardError::CardNotFound(dragged));
        }

        if target_at.in_nested {
            self.move_card(dragged, CardDestination::After { anchor: target })?;
            return Ok(target_at.column_id);
        }

        let dragged_card = self
            .remove_card(dragged)
            .ok_or(BoardError::CardNotFound(dragged))?;
        let target_at = self
            .locate_card(target)
            .ok_or(BoardError::CardNotFound(target))?;
        let target_card = self
            .take_card_at(target_at)
            .ok_or(BoardError::CardNotFound(target))?;

        let nested = Column::nested(vec![target_card, dragged_card]);
        let nested_id = nested.id;
        let parent = self
            .column_mut(target_at.column_id)
            .ok_or(BoardError::ColumnNotFound(target_at.column_id))?;
        let index = target_at.index.min(parent.entries.len());
        parent.entries.insert(index, ColumnEntry::Nested(nested));
        self.dissolve_empty_nested();
        debug!(
            "event=cards_merged module=board status=ok target={target} dragged={dragged} nested_id={nested_id}"
        );
        Ok(nested_id)
    }
}

fn kind_column_title(kind: CardKind) -> String {
    format!("{} Column", kind.title())
}
