//! Canvas domain model: cards, columns and the board that owns them.
//!
//! # Responsibility
//! - Define canonical data structures rendered by the canvas.
//! - Keep every structural mutation behind `Board` methods.
//!
//! # Invariants
//! - Every card and column is identified by a stable UUID.
//! - Nested columns are explicit `ColumnEntry::Nested` values, never a
//!   sentinel card kind.

pub mod board;
pub mod card;
pub mod column;
pub mod kind;
