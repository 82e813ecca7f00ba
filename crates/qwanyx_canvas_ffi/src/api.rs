//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level canvas functions to Dart via FRB.
//! - Translate pointer, timer and layout reports into core events.
//! - Hand timer requests and board snapshots back as plain envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One process-wide canvas session; every call holds its lock briefly.
//! - Ids cross the boundary as UUID strings, kinds as snake_case tags.

use once_cell::sync::Lazy;
use qwanyx_canvas_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Board, BoardChange, CanvasConfig, CanvasSession, CardBody, CardKind, EventEffects, LayoutKey,
    Point, Rect, TimerHandle, TimerKind, TimerRequest,
};
use std::sync::Mutex;
use uuid::Uuid;

static CANVAS: Lazy<Mutex<CanvasSession>> =
    Lazy::new(|| Mutex::new(CanvasSession::new(CanvasConfig::default())));

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Timer effect the Dart side must schedule or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasTimerRequest {
    /// `schedule` or `cancel`.
    pub op: String,
    pub handle: u64,
    /// `press` or `merge_hold`; set for `schedule` only.
    pub kind: Option<String>,
    /// Delay in milliseconds; set for `schedule` only.
    pub delay_ms: Option<u64>,
}

/// Response envelope for pointer, timer and layout events.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasEventResponse {
    pub ok: bool,
    pub timers: Vec<CanvasTimerRequest>,
    /// New scroll offset when the event panned the viewport.
    pub scroll_offset: Option<f64>,
    /// Whether the board changed; re-read the snapshot when set.
    pub board_changed: bool,
    /// JSON of the current drag visuals (proxy, placeholder, highlights).
    pub visuals_json: String,
    pub message: String,
}

impl CanvasEventResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            timers: Vec::new(),
            scroll_offset: None,
            board_changed: false,
            visuals_json: String::new(),
            message: message.into(),
        }
    }
}

/// Response envelope for explicit board edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasActionResponse {
    pub ok: bool,
    /// Created entity id (column or card), when the action creates one.
    pub id: Option<String>,
    pub message: String,
}

impl CanvasActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Board snapshot envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasSnapshotResponse {
    pub ok: bool,
    pub board_json: String,
    pub message: String,
}

/// One add-card palette entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasPaletteItem {
    pub kind: String,
    pub icon: String,
    pub label: String,
}

/// Replaces gesture tuning with a JSON config; the board is kept.
///
/// # FFI contract
/// - Missing fields keep defaults; invalid values are rejected.
/// - Cancels any gesture in flight; returned timers must be cancelled.
/// - Layout and scroll extent must be reported again afterwards.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_configure(config_json: String) -> CanvasEventResponse {
    let config = match CanvasConfig::from_json(config_json.as_str()) {
        Ok(config) => config,
        Err(err) => return CanvasEventResponse::failure(format!("canvas_configure failed: {err}")),
    };
    with_canvas(|canvas| {
        let board = canvas.board().clone();
        let mut next = CanvasSession::new(config);
        let mut timers = canvas.pointer_leave().timers;
        match next.restore(board) {
            Ok(cancelled) => timers.extend(cancelled),
            Err(err) => {
                return CanvasEventResponse::failure(format!("canvas_configure failed: {err}"))
            }
        }
        *canvas = next;
        event_response(
            canvas,
            EventEffects {
                timers,
                ..EventEffects::default()
            },
        )
    })
    .unwrap_or_else(CanvasEventResponse::failure)
}

/// Returns the current board as JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_snapshot() -> CanvasSnapshotResponse {
    let result = with_canvas(|canvas| serde_json::to_string(canvas.board()))
        .and_then(|json| json.map_err(|err| format!("canvas_snapshot failed: {err}")));
    match result {
        Ok(board_json) => CanvasSnapshotResponse {
            ok: true,
            board_json,
            message: String::new(),
        },
        Err(message) => CanvasSnapshotResponse {
            ok: false,
            board_json: String::new(),
            message,
        },
    }
}

/// Restores a board previously produced by `canvas_snapshot`.
///
/// All layout must be reported again after a restore.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_restore(board_json: String) -> CanvasEventResponse {
    let board: Board = match serde_json::from_str(board_json.as_str()) {
        Ok(board) => board,
        Err(err) => return CanvasEventResponse::failure(format!("canvas_restore failed: {err}")),
    };
    with_canvas(|canvas| match canvas.restore(board) {
        Ok(timers) => {
            let mut response = event_response(
                canvas,
                EventEffects {
                    timers,
                    ..EventEffects::default()
                },
            );
            response.board_changed = true;
            response
        }
        Err(err) => CanvasEventResponse::failure(format!("canvas_restore failed: {err}")),
    })
    .unwrap_or_else(CanvasEventResponse::failure)
}

/// Add-card palette in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_palette() -> Vec<CanvasPaletteItem> {
    with_canvas(|canvas| {
        canvas
            .kinds()
            .palette()
            .into_iter()
            .map(|(kind, info)| CanvasPaletteItem {
                kind: kind.as_str().to_string(),
                icon: info.icon,
                label: info.label,
            })
            .collect()
    })
    .unwrap_or_default()
}

#[flutter_rust_bridge::frb(sync)]
pub fn canvas_add_column() -> CanvasActionResponse {
    with_canvas(|canvas| {
        let column = canvas.add_column();
        CanvasActionResponse::success("Column added.", Some(column.to_string()))
    })
    .unwrap_or_else(CanvasActionResponse::failure)
}

/// Removes a column; the last top-level column is refused.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_remove_column(column_id: String) -> CanvasActionResponse {
    let column = match parse_id(column_id.as_str(), "column_id") {
        Ok(column) => column,
        Err(err) => return CanvasActionResponse::failure(err),
    };
    with_canvas(|canvas| {
        if canvas.remove_column(column) {
            CanvasActionResponse::success("Column removed.", None)
        } else {
            CanvasActionResponse::failure("Column not removed.")
        }
    })
    .unwrap_or_else(CanvasActionResponse::failure)
}

#[flutter_rust_bridge::frb(sync)]
pub fn canvas_rename_column(column_id: String, title: String) -> CanvasActionResponse {
    let column = match parse_id(column_id.as_str(), "column_id") {
        Ok(column) => column,
        Err(err) => return CanvasActionResponse::failure(err),
    };
    with_canvas(|canvas| match canvas.rename_column(column, title.as_str()) {
        Ok(()) => CanvasActionResponse::success("Column renamed.", None),
        Err(err) => CanvasActionResponse::failure(format!("canvas_rename_column failed: {err}")),
    })
    .unwrap_or_else(CanvasActionResponse::failure)
}

/// Appends a card of `kind` (snake_case tag) to a column.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_add_card(column_id: String, kind: String) -> CanvasActionResponse {
    let column = match parse_id(column_id.as_str(), "column_id") {
        Ok(column) => column,
        Err(err) => return CanvasActionResponse::failure(err),
    };
    let kind = match kind.parse::<CardKind>() {
        Ok(kind) => kind,
        Err(err) => return CanvasActionResponse::failure(format!("canvas_add_card failed: {err}")),
    };
    with_canvas(|canvas| match canvas.add_card(column, kind) {
        Ok(card) => CanvasActionResponse::success("Card added.", Some(card.to_string())),
        Err(err) => CanvasActionResponse::failure(format!("canvas_add_card failed: {err}")),
    })
    .unwrap_or_else(CanvasActionResponse::failure)
}

#[flutter_rust_bridge::frb(sync)]
pub fn canvas_duplicate_card(column_id: String, card_id: String) -> CanvasActionResponse {
    let ids = parse_id(column_id.as_str(), "column_id")
        .and_then(|column| parse_id(card_id.as_str(), "card_id").map(|card| (column, card)));
    let (column, card) = match ids {
        Ok(ids) => ids,
        Err(err) => return CanvasActionResponse::failure(err),
    };
    with_canvas(|canvas| match canvas.duplicate_card(column, card) {
        Ok(copy) => CanvasActionResponse::success("Card duplicated.", Some(copy.to_string())),
        Err(err) => CanvasActionResponse::failure(format!("canvas_duplicate_card failed: {err}")),
    })
    .unwrap_or_else(CanvasActionResponse::failure)
}

/// Removes a card owned directly by `column_id`. Absent ids are a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_remove_card(column_id: String, card_id: String) -> CanvasActionResponse {
    let ids = parse_id(column_id.as_str(), "column_id")
        .and_then(|column| parse_id(card_id.as_str(), "card_id").map(|card| (column, card)));
    let (column, card) = match ids {
        Ok(ids) => ids,
        Err(err) => return CanvasActionResponse::failure(err),
    };
    with_canvas(|canvas| {
        let message = if canvas.remove_card(column, card) {
            "Card removed."
        } else {
            "Card not found."
        };
        CanvasActionResponse::success(message, None)
    })
    .unwrap_or_else(CanvasActionResponse::failure)
}

/// Stores serialized editor output for a card.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_set_card_body(card_id: String, body: String) -> CanvasActionResponse {
    let card = match parse_id(card_id.as_str(), "card_id") {
        Ok(card) => card,
        Err(err) => return CanvasActionResponse::failure(err),
    };
    with_canvas(|canvas| match canvas.set_card_body(card, CardBody::new(body)) {
        Ok(()) => CanvasActionResponse::success("Card saved.", None),
        Err(err) => CanvasActionResponse::failure(format!("canvas_set_card_body failed: {err}")),
    })
    .unwrap_or_else(CanvasActionResponse::failure)
}

/// Records a rendered rectangle.
///
/// `element`: `viewport|column|column_header|header_controls|card|card_delete`;
/// `id` is required for every element except `viewport`.
/// Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_report_layout(
    element: String,
    id: Option<String>,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> String {
    let key = match parse_layout_key(element.as_str(), id.as_deref()) {
        Ok(key) => key,
        Err(err) => return err,
    };
    let rect = match parse_rect(left, top, width, height) {
        Ok(rect) => rect,
        Err(err) => return format!("canvas_report_layout failed: {err}"),
    };
    with_canvas(|canvas| canvas.report_layout(key, rect))
        .err()
        .unwrap_or_default()
}

/// Records one icon of the add-card palette opened from `column_id`.
///
/// Pressing the icon adds a card of `kind`; long-press dragging it outside
/// every column creates a column titled after the kind.
/// Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_report_palette_icon(
    column_id: String,
    kind: String,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
) -> String {
    let column = match parse_id(column_id.as_str(), "column_id") {
        Ok(column) => column,
        Err(err) => return err,
    };
    let kind = match kind.parse::<CardKind>() {
        Ok(kind) => kind,
        Err(err) => return format!("canvas_report_palette_icon failed: {err}"),
    };
    let rect = match parse_rect(left, top, width, height) {
        Ok(rect) => rect,
        Err(err) => return format!("canvas_report_palette_icon failed: {err}"),
    };
    with_canvas(|canvas| canvas.report_layout(LayoutKey::PaletteIcon { column, kind }, rect))
        .err()
        .unwrap_or_default()
}

/// Drops every palette icon of `column_id` once the palette closes.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_close_palette(column_id: String) -> String {
    let column = match parse_id(column_id.as_str(), "column_id") {
        Ok(column) => column,
        Err(err) => return err,
    };
    with_canvas(|canvas| canvas.close_palette(column))
        .err()
        .unwrap_or_default()
}

/// Drops the rectangle of an unmounted element.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_forget_layout(element: String, id: Option<String>) -> String {
    let key = match parse_layout_key(element.as_str(), id.as_deref()) {
        Ok(key) => key,
        Err(err) => return err,
    };
    with_canvas(|canvas| canvas.forget_layout(key))
        .err()
        .unwrap_or_default()
}

/// Sets the scrollable width beyond the viewport (`None` when unknown).
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_set_max_scroll(max_scroll: Option<f64>) -> String {
    with_canvas(|canvas| canvas.set_max_scroll(max_scroll))
        .err()
        .unwrap_or_default()
}

#[flutter_rust_bridge::frb(sync)]
pub fn canvas_pointer_down(x: f64, y: f64) -> CanvasEventResponse {
    dispatch(|canvas| canvas.pointer_down(Point::new(x, y)))
}

/// `now_ms` is the host's monotonic clock, used for hover bookkeeping.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_pointer_move(x: f64, y: f64, now_ms: u64) -> CanvasEventResponse {
    dispatch(|canvas| canvas.pointer_move(Point::new(x, y), now_ms))
}

#[flutter_rust_bridge::frb(sync)]
pub fn canvas_pointer_up(x: f64, y: f64) -> CanvasEventResponse {
    dispatch(|canvas| canvas.pointer_up(Point::new(x, y)))
}

/// Pointer left the canvas or capture was lost.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_pointer_leave() -> CanvasEventResponse {
    dispatch(|canvas| canvas.pointer_leave())
}

/// Reports expiry of a timer scheduled from an earlier response.
///
/// Stale handles are accepted and ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_timer_fired(handle: u64) -> CanvasEventResponse {
    dispatch(|canvas| canvas.timer_fired(TimerHandle::from_raw(handle)))
}

/// Advances pan inertia by one frame; `None` once settled.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_inertia_frame() -> Option<f64> {
    with_canvas(|canvas| canvas.inertia_frame()).ok().flatten()
}

fn dispatch(event: impl FnOnce(&mut CanvasSession) -> EventEffects) -> CanvasEventResponse {
    with_canvas(|canvas| {
        let effects = event(canvas);
        event_response(canvas, effects)
    })
    .unwrap_or_else(CanvasEventResponse::failure)
}

fn with_canvas<T>(f: impl FnOnce(&mut CanvasSession) -> T) -> Result<T, String> {
    let mut canvas = CANVAS
        .lock()
        .map_err(|_| "canvas session lock poisoned".to_string())?;
    Ok(f(&mut canvas))
}

fn event_response(canvas: &CanvasSession, effects: EventEffects) -> CanvasEventResponse {
    let visuals_json = match serde_json::to_string(&canvas.visuals()) {
        Ok(json) => json,
        Err(err) => {
            log::error!("event=ffi_visuals module=ffi status=error error={err}");
            String::new()
        }
    };
    CanvasEventResponse {
        ok: true,
        timers: effects.timers.into_iter().map(to_timer_request).collect(),
        scroll_offset: effects.scroll_offset,
        board_changed: effects.change.is_some(),
        visuals_json,
        message: effects.change.map(change_label).unwrap_or_default(),
    }
}

fn to_timer_request(request: TimerRequest) -> CanvasTimerRequest {
    match request {
        TimerRequest::Schedule {
            handle,
            kind,
            delay_ms,
        } => CanvasTimerRequest {
            op: "schedule".to_string(),
            handle: handle.raw(),
            kind: Some(timer_kind_label(kind).to_string()),
            delay_ms: Some(delay_ms),
        },
        TimerRequest::Cancel { handle } => CanvasTimerRequest {
            op: "cancel".to_string(),
            handle: handle.raw(),
            kind: None,
            delay_ms: None,
        },
    }
}

fn timer_kind_label(kind: TimerKind) -> &'static str {
    match kind {
        TimerKind::Press => "press",
        TimerKind::MergeHold => "merge_hold",
    }
}

fn change_label(change: BoardChange) -> String {
    match change {
        BoardChange::CardsMerged { .. } => "Cards merged.",
        BoardChange::CardMoved { .. } => "Card moved.",
        BoardChange::CardDraggedOut { .. } => "Card moved to a new column.",
        BoardChange::ColumnMoved { .. } => "Column moved.",
        BoardChange::ColumnAdded { .. } => "Column added.",
        BoardChange::ColumnRemoved { .. } => "Column removed.",
        BoardChange::ColumnRenamed { .. } => "Column renamed.",
        BoardChange::CardAdded { .. } => "Card added.",
        BoardChange::CardRemoved { .. } => "Card removed.",
        BoardChange::CardBodyUpdated { .. } => "Card saved.",
    }
    .to_string()
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid {field} `{raw}`: {err}"))
}

fn parse_rect(left: f64, top: f64, width: f64, height: f64) -> Result<Rect, String> {
    if !(left.is_finite() && top.is_finite()) {
        return Err("position must be finite".to_string());
    }
    if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
        return Err("width and height must be non-negative".to_string());
    }
    Ok(Rect::new(left, top, width, height))
}

fn parse_layout_key(element: &str, id: Option<&str>) -> Result<LayoutKey, String> {
    let element = element.trim().to_ascii_lowercase();
    if element == "viewport" {
        return Ok(LayoutKey::Viewport);
    }
    let id = id.ok_or_else(|| format!("layout element `{element}` requires an id"))?;
    let id = parse_id(id, "layout id")?;
    match element.as_str() {
        "column" => Ok(LayoutKey::Column(id)),
        "column_header" => Ok(LayoutKey::ColumnHeader(id)),
        "header_controls" => Ok(LayoutKey::HeaderControls(id)),
        "card" => Ok(LayoutKey::Card(id)),
        "card_delete" => Ok(LayoutKey::CardDelete(id)),
        other => Err(format!(
            "unsupported layout element `{other}`; expected viewport|column|column_header|header_controls|card|card_delete"
        )),
    }
}
