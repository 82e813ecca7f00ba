//! Card domain model.
//!
//! # Responsibility
//! - Define the note unit placed inside columns.
//! - Provide creation and duplication helpers with generated identity.
//!
//! # Invariants
//! - `id` is generated at creation and never reused.
//! - `body` is opaque editor output; core never interprets it.
//! - Duplication regenerates `id` and label timestamp and resets `body`.

use crate::model::kind::{CardKind, KindInfo};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable card identifier.
pub type CardId = Uuid;

/// Opaque rich-text document handed to/from the embedded editor.
///
/// Stored verbatim and re-provided as the editor's initial content on remount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardBody(String);

impl CardBody {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Byte length, used for metadata-only logging.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Single note unit owned by exactly one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub kind: CardKind,
    /// Icon class resolved from the kind registry at creation.
    pub icon: String,
    pub label: String,
    pub body: CardBody,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
}

impl Card {
    /// Creates a card with built-in affordances stamped with the current time.
    pub fn new(kind: CardKind) -> Self {
        Self::with_info(kind, &kind.builtin_info(), Local::now())
    }

    /// Creates a card from explicit affordances and creation instant.
    ///
    /// Label format: `"<default label> - HH:MM"` in local time.
    pub fn with_info(kind: CardKind, info: &KindInfo, now: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            icon: info.icon.clone(),
            label: format!("{} - {}", info.label, now.format("%H:%M")),
            body: CardBody::default(),
            created_at: now.timestamp_millis(),
        }
    }

    /// Returns a fresh card of the same kind and icon.
    ///
    /// The body is intentionally not copied.
    pub fn duplicate(&self) -> Self {
        self.duplicate_at(Local::now())
    }

    pub fn duplicate_at(&self, now: DateTime<Local>) -> Self {
        let info = KindInfo {
            icon: self.icon.clone(),
            label: self.kind.builtin_info().label,
        };
        Self::with_info(self.kind, &info, now)
    }
}
