use qwanyx_canvas_core::{CanvasConfig, ConfigError, PanController};
use std::fs;

#[test]
fn load_reads_overrides_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canvas.json");
    fs::write(
        &path,
        r#"{ "card_press_ms": 150, "pan_factor": 3.0, "band_tolerance_px": 20 }"#,
    )
    .unwrap();

    let config = CanvasConfig::load(&path).unwrap();

    assert_eq!(config.card_press_ms, 150);
    assert_eq!(config.pan_factor, 3.0);
    assert_eq!(config.band_tolerance_px, 20.0);
    assert_eq!(config.merge_hold_ms, 1500);
}

#[test]
fn empty_object_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canvas.json");
    fs::write(&path, "{}").unwrap();

    assert_eq!(CanvasConfig::load(&path).unwrap(), CanvasConfig::default());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = CanvasConfig::load(dir.path().join("absent.json")).unwrap_err();

    assert!(matches!(err, ConfigError::Io(_)));
    assert!(err.to_string().contains("failed to read canvas config"));
}

#[test]
fn invalid_values_name_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canvas.json");
    fs::write(&path, r#"{ "column_press_ms": 0 }"#).unwrap();

    let err = CanvasConfig::load(&path).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid canvas config `column_press_ms`: must be greater than zero"
    );
}

#[test]
fn loaded_pan_factor_drives_pan_controller() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canvas.json");
    fs::write(&path, r#"{ "pan_factor": 1.0 }"#).unwrap();
    let config = CanvasConfig::load(&path).unwrap();

    let mut pan = PanController::new(&config);
    pan.set_offset(100.0);
    pan.begin(50.0);
    assert_eq!(pan.update(40.0), Some(110.0));
}
