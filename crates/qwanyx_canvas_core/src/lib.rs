//! Core drag-and-drop canvas logic for QWANYX workspaces.
//! This crate is the single source of truth for board invariants.

pub mod config;
pub mod drag;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod pan;
pub mod service;

pub use config::{CanvasConfig, ConfigError};
pub use drag::controller::{DragController, DragOutcome, DragResolution};
pub use drag::session::{
    CardDropTarget, ColumnDropZone, DragPhase, DragSubject, DragVisuals, DropSide, HoverTarget,
};
pub use drag::timer::{TimerHandle, TimerKind, TimerRequest};
pub use geometry::{HitTarget, LayoutKey, LayoutRegistry, Point, Rect};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::board::{Board, BoardError, BoardResult, CardDestination};
pub use model::card::{Card, CardBody, CardId};
pub use model::column::{CardLocation, Column, ColumnEntry, ColumnId, NESTED_COLUMN_TITLE};
pub use model::kind::{CardKind, KindInfo, KindRegistry, UnknownCardKind, ALL_CARD_KINDS};
pub use pan::PanController;
pub use service::canvas_service::{BoardChange, CanvasObserver, CanvasSession, EventEffects};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
