//! Flutter-facing bridge for the QWANYX canvas core.

pub mod api;
