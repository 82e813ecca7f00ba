//! Card kind tags and the kind -> (icon, label) registry.
//!
//! # Responsibility
//! - Define the fixed set of semantic card tags shown in the add-card palette.
//! - Resolve display affordances (icon class, default label) for a kind.
//!
//! # Invariants
//! - Kinds carry no behavior; they only select an icon and a label.
//! - `KindRegistry::lookup` is total: unknown entries fall back to the
//!   built-in table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Semantic tag for one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Text,
    Voice,
    Photo,
    Comment,
    Mail,
    Learning,
    Contact,
    Group,
    Project,
    Agent,
    Search,
}

/// Palette order used by renderers.
pub const ALL_CARD_KINDS: [CardKind; 11] = [
    CardKind::Text,
    CardKind::Voice,
    CardKind::Photo,
    CardKind::Comment,
    CardKind::Mail,
    CardKind::Learning,
    CardKind::Contact,
    CardKind::Group,
    CardKind::Project,
    CardKind::Agent,
    CardKind::Search,
];

impl CardKind {
    /// Stable string id used in snapshots and host calls.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
            Self::Photo => "photo",
            Self::Comment => "comment",
            Self::Mail => "mail",
            Self::Learning => "learning",
            Self::Contact => "contact",
            Self::Group => "group",
            Self::Project => "project",
            Self::Agent => "agent",
            Self::Search => "search",
        }
    }

    /// Capitalized name used for kind-derived column titles.
    pub fn title(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    /// Built-in icon and label for the add-card palette.
    pub fn builtin_info(self) -> KindInfo {
        let (icon, label) = match self {
            Self::Text => ("fa-pen", "Text note"),
            Self::Voice => ("fa-microphone", "Voice note"),
            Self::Photo => ("fa-camera", "Photo"),
            Self::Comment => ("fa-comment", "Comment"),
            Self::Mail => ("fa-envelope", "Email"),
            Self::Learning => ("fa-graduation-cap", "Learning"),
            Self::Contact => ("fa-address-book", "Contact"),
            Self::Group => ("fa-users", "Group"),
            Self::Project => ("fa-project-diagram", "Project"),
            Self::Agent => ("fa-robot", "DH"),
            Self::Search => ("fa-search", "Search"),
        };
        KindInfo {
            icon: icon.to_string(),
            label: label.to_string(),
        }
    }
}

impl Display for CardKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for kind strings coming from hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCardKind(pub String);

impl Display for UnknownCardKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown card kind `{}`", self.0)
    }
}

impl Error for UnknownCardKind {}

impl FromStr for CardKind {
    type Err = UnknownCardKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        ALL_CARD_KINDS
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or(UnknownCardKind(normalized))
    }
}

/// Display affordances for one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindInfo {
    /// Icon class name, e.g. `fa-pen`.
    pub icon: String,
    /// Default label prefix used for new cards.
    pub label: String,
}

/// Externally supplied kind table with built-in fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindRegistry {
    overrides: BTreeMap<CardKind, KindInfo>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the affordances of one kind.
    pub fn register(&mut self, kind: CardKind, info: KindInfo) {
        self.overrides.insert(kind, info);
    }

    pub fn lookup(&self, kind: CardKind) -> KindInfo {
        self.overrides
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.builtin_info())
    }

    /// Palette entries in display order.
    pub fn palette(&self) -> Vec<(CardKind, KindInfo)> {
        ALL_CARD_KINDS
            .iter()
            .map(|kind| (*kind, self.lookup(*kind)))
            .collect()
    }
}
