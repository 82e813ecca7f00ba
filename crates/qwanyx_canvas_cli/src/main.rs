//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `qwanyx_canvas_core` linkage.
//! - Print a bootstrapped board, optionally tuned by a config file path.

use qwanyx_canvas_core::{CanvasConfig, CanvasSession};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("qwanyx_canvas_core ping={}", qwanyx_canvas_core::ping());
    println!(
        "qwanyx_canvas_core version={}",
        qwanyx_canvas_core::core_version()
    );

    let config = match std::env::args().nth(1) {
        Some(path) => match CanvasConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => CanvasConfig::default(),
    };
    println!(
        "qwanyx_canvas_core card_press_ms={} column_press_ms={} merge_hold_ms={}",
        config.card_press_ms, config.column_press_ms, config.merge_hold_ms
    );

    let canvas = CanvasSession::new(config);
    match serde_json::to_string_pretty(canvas.board()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to serialize board: {err}");
            ExitCode::FAILURE
        }
    }
}
