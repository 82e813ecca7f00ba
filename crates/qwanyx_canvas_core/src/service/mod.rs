//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate model mutations and gesture controllers into use-case APIs.
//! - Keep FFI/CLI layers decoupled from controller internals.

pub mod canvas_service;
