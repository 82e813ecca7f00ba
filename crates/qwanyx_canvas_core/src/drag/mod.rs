//! Drag-and-drop gesture handling for cards and columns.
//!
//! # Responsibility
//! - Turn pointer and timer events into drag sessions.
//! - Compute drop targets from the layout registry.
//! - Produce one board mutation per committed drag.
//!
//! # Invariants
//! - Phases move `idle -> pending -> dragging -> idle`; every exit clears all
//!   ephemeral visuals and timers.
//! - Only the canvas session applies outcomes to the board.

pub mod controller;
pub mod session;
pub mod targeting;
pub mod timer;
