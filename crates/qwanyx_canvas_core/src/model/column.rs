//! Column domain model.
//!
//! # Responsibility
//! - Hold one ordered sequence of entries, each a card or a nested column.
//! - Provide recursive lookup helpers used by board mutations.
//!
//! # Invariants
//! - Entry order is render order and hit-test scan order.
//! - A nested column lives only as a `ColumnEntry::Nested` of its parent.

use crate::model::card::{Card, CardId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable column identifier, shared by top-level and nested columns.
pub type ColumnId = Uuid;

/// Title given to merge-created columns.
pub const NESTED_COLUMN_TITLE: &str = "Nested Group";

/// One slot in a column sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum ColumnEntry {
    Card(Card),
    Nested(Column),
}

impl ColumnEntry {
    pub fn as_card(&self) -> Option<&Card> {
        match self {
            Self::Card(card) => Some(card),
            Self::Nested(_) => None,
        }
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Self::Card(_) => None,
            Self::Nested(column) => Some(column),
        }
    }

    fn card_count(&self) -> usize {
        match self {
            Self::Card(_) => 1,
            Self::Nested(column) => column.total_card_count(),
        }
    }
}

/// Position of one card inside its owning column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLocation {
    /// Owning column (top-level or nested).
    pub column_id: ColumnId,
    /// Index inside the owning column's entries.
    pub index: usize,
    /// Whether the owning column is nested.
    pub in_nested: bool,
}

/// Ordered, titled collection of cards and nested columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub entries: Vec<ColumnEntry>,
    pub is_nested: bool,
}

impl Column {
    /// Creates an empty top-level column.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            entries: Vec::new(),
            is_nested: false,
        }
    }

    /// Creates a nested column holding `cards` in order.
    pub fn nested(cards: Vec<Card>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: NESTED_COLUMN_TITLE.to_string(),
            entries: cards.into_iter().map(ColumnEntry::Card).collect(),
            is_nested: true,
        }
    }

    /// Direct child cards, skipping nested columns.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.entries.iter().filter_map(ColumnEntry::as_card)
    }

    /// Direct child nested columns.
    pub fn nested_columns(&self) -> impl Iterator<Item = &Column> {
        self.entries.iter().filter_map(ColumnEntry::as_column)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether this column holds nothing besides `card_id`.
    ///
    /// A column whose only entry is the live drag placeholder still counts
    /// as an empty drop target.
    pub fn is_empty_besides(&self, card_id: CardId) -> bool {
        match self.entries.as_slice() {
            [] => true,
            [ColumnEntry::Card(card)] => card.id == card_id,
            _ => false,
        }
    }

    /// Counts cards recursively through nested columns.
    pub fn total_card_count(&self) -> usize {
        self.entries.iter().map(ColumnEntry::card_count).sum()
    }

    pub fn find_column(&self, column_id: ColumnId) -> Option<&Column> {
        if self.id == column_id {
            return Some(self);
        }
        self.nested_columns()
            .find_map(|column| column.find_column(column_id))
    }

    pub fn find_column_mut(&mut self, column_id: ColumnId) -> Option<&mut Column> {
        if self.id == column_id {
            return Some(self);
        }
        for entry in &mut self.entries {
            if let ColumnEntry::Nested(column) = entry {
                if let Some(found) = column.find_column_mut(column_id) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_card(&self, card_id: CardId) -> Option<&Card> {
        self.entries.iter().find_map(|entry| match entry {
            ColumnEntry::Card(card) if card.id == card_id => Some(card),
            ColumnEntry::Card(_) => None,
            ColumnEntry::Nested(column) => column.find_card(card_id),
        })
    }

    pub fn find_card_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        for entry in &mut self.entries {
            match entry {
                ColumnEntry::Card(card) if card.id == card_id => return Some(card),
                ColumnEntry::Card(_) => {}
                ColumnEntry::Nested(column) => {
                    if let Some(found) = column.find_card_mut(card_id) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    pub fn locate_card(&self, card_id: CardId) -> Option<CardLocation> {
        self.entries
            .iter()
            .enumerate()
            .find_map(|(index, entry)| match entry {
                ColumnEntry::Card(card) if card.id == card_id => Some(CardLocation {
                    column_id: self.id,
                    index,
                    in_nested: self.is_nested,
                }),
                ColumnEntry::Card(_) => None,
                ColumnEntry::Nested(column) => column.locate_card(card_id),
            })
    }

    /// Removes a direct nested column child, searching recursively.
    pub(crate) fn remove_nested(&mut self, column_id: ColumnId) -> Option<Column> {
        let position = self.entries.iter().position(
            |entry| matches!(entry, ColumnEntry::Nested(column) if column.id == column_id),
        );
        if let Some(position) = position {
            return match self.entries.remove(position) {
                ColumnEntry::Nested(column) => Some(column),
                ColumnEntry::Card(_) => None,
            };
        }
        for entry in &mut self.entries {
            if let ColumnEntry::Nested(column) = entry {
                if let Some(removed) = column.remove_nested(column_id) {
                    return Some(removed);
                }
            }
        }
        None
    }

    /// Visits this column and every nested descendant, parents first.
    pub fn visit_columns<'a>(&'a self, depth: usize, out: &mut Vec<(&'a Column, usize)>) {
        out.push((self, depth));
        for column in self.nested_columns() {
            column.visit_columns(depth + 1, out);
        }
    }

    /// Visits every card in render order with its owning column.
    pub fn visit_cards<'a>(&'a self, out: &mut Vec<(&'a Card, ColumnId)>) {
        for entry in &self.entries {
            match entry {
                ColumnEntry::Card(card) => out.push((card, self.id)),
                ColumnEntry::Nested(column) => column.visit_cards(out),
            }
        }
    }
}
