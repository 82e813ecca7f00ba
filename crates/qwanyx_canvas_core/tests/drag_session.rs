use qwanyx_canvas_core::{
    Board, CanvasConfig, CardDestination, CardDropTarget, CardId, CardKind, ColumnId,
    DragController, DragOutcome, DragPhase, DragSubject, DropSide, LayoutKey, LayoutRegistry,
    Point, Rect, TimerHandle, TimerKind, TimerRequest,
};

struct Fixture {
    board: Board,
    layout: LayoutRegistry,
    column: ColumnId,
    a: CardId,
    b: CardId,
}

/// One column `[A(text), B(voice)]` stacked vertically inside a viewport.
fn fixture() -> Fixture {
    let mut board = Board::bootstrap();
    let column = board.columns()[0].id;
    let a = board.columns()[0].cards().next().unwrap().id;
    let b = board.add_card(column, CardKind::Voice).unwrap();

    let mut layout = LayoutRegistry::new();
    layout.report(LayoutKey::Viewport, Rect::new(0.0, 0.0, 1000.0, 800.0));
    layout.report(LayoutKey::Column(column), Rect::new(0.0, 0.0, 220.0, 600.0));
    layout.report(LayoutKey::ColumnHeader(column), Rect::new(0.0, 0.0, 220.0, 40.0));
    layout.report(LayoutKey::Card(a), Rect::new(10.0, 50.0, 200.0, 100.0));
    layout.report(LayoutKey::Card(b), Rect::new(10.0, 170.0, 200.0, 100.0));

    Fixture {
        board,
        layout,
        column,
        a,
        b,
    }
}

fn scheduled(requests: &[TimerRequest], wanted: TimerKind) -> TimerHandle {
    requests
        .iter()
        .find_map(|request| match request {
            TimerRequest::Schedule { handle, kind, .. } if *kind == wanted => Some(*handle),
            _ => None,
        })
        .expect("expected a scheduled timer of the requested kind")
}

fn cancelled(requests: &[TimerRequest]) -> Vec<TimerHandle> {
    requests
        .iter()
        .filter_map(|request| match request {
            TimerRequest::Cancel { handle } => Some(*handle),
            TimerRequest::Schedule { .. } => None,
        })
        .collect()
}

/// Presses B and promotes the press into a drag.
fn start_dragging_b(fx: &Fixture, drag: &mut DragController) {
    let requests = drag.press_card(fx.b, fx.column, Point::new(100.0, 220.0));
    drag.timer_fired(scheduled(&requests, TimerKind::Press));
    assert_eq!(drag.phase(), DragPhase::Dragging);
}

#[test]
fn card_press_schedules_long_press_with_card_delay() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());

    let requests = drag.press_card(fx.b, fx.column, Point::new(100.0, 220.0));

    assert_eq!(drag.phase(), DragPhase::Pending);
    assert!(matches!(
        requests.as_slice(),
        [TimerRequest::Schedule {
            kind: TimerKind::Press,
            delay_ms: 200,
            ..
        }]
    ));
    assert!(drag.visuals().is_clear());
}

#[test]
fn movement_past_threshold_cancels_pending_press() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    let requests = drag.press_card(fx.b, fx.column, Point::new(100.0, 220.0));
    let press = scheduled(&requests, TimerKind::Press);

    let small = drag.pointer_move(&fx.board, &fx.layout, Point::new(104.0, 216.0), 10);
    assert!(small.is_empty());
    assert_eq!(drag.phase(), DragPhase::Pending);

    let moved = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 226.0), 20);
    assert_eq!(cancelled(&moved), vec![press]);
    assert_eq!(drag.phase(), DragPhase::Idle);

    // The host may still deliver the expiry it could not cancel in time.
    assert!(drag.timer_fired(press).is_empty());
    assert_eq!(drag.phase(), DragPhase::Idle);
}

#[test]
fn release_before_long_press_is_cancelled() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    let requests = drag.press_card(fx.b, fx.column, Point::new(100.0, 220.0));
    let press = scheduled(&requests, TimerKind::Press);

    let resolution = drag.release(&fx.board, &fx.layout, Point::new(100.0, 220.0));

    assert_eq!(resolution.outcome, DragOutcome::Cancelled);
    assert_eq!(cancelled(&resolution.timers), vec![press]);
    assert!(!drag.is_active());
}

#[test]
fn dragging_exposes_proxy_and_placeholder() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);

    drag.pointer_move(&fx.board, &fx.layout, Point::new(600.0, 400.0), 300);
    let visuals = drag.visuals();

    assert_eq!(visuals.proxy, Some(Point::new(600.0, 400.0)));
    assert_eq!(
        visuals.placeholder,
        Some(DragSubject::Card {
            card: fx.b,
            source: fx.column
        })
    );
    assert_eq!(visuals.merge_candidate, None);
}

#[test]
fn hover_hold_arms_merge_and_release_merges() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);

    let requests = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 80.0), 300);
    let hold = scheduled(&requests, TimerKind::MergeHold);
    assert!(matches!(
        requests.as_slice(),
        [TimerRequest::Schedule { delay_ms: 1500, .. }]
    ));
    assert_eq!(drag.visuals().merge_candidate, Some(fx.a));
    assert_eq!(drag.visuals().merge_armed, None);

    // Staying over the same card does not restart the hold.
    let again = drag.pointer_move(&fx.board, &fx.layout, Point::new(120.0, 90.0), 900);
    assert!(again.is_empty());

    drag.timer_fired(hold);
    assert_eq!(drag.visuals().merge_armed, Some(fx.a));
    assert!(drag.hover().unwrap().armed);

    let resolution = drag.release(&fx.board, &fx.layout, Point::new(120.0, 90.0));
    assert_eq!(
        resolution.outcome,
        DragOutcome::Merge {
            target: fx.a,
            dragged: fx.b
        }
    );
    assert!(resolution.timers.is_empty());
}

#[test]
fn armed_merge_lingers_after_leaving_target() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);

    let requests = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 80.0), 300);
    drag.timer_fired(scheduled(&requests, TimerKind::MergeHold));
    drag.pointer_move(&fx.board, &fx.layout, Point::new(600.0, 500.0), 2000);

    assert_eq!(drag.visuals().merge_armed, Some(fx.a));
    let resolution = drag.release(&fx.board, &fx.layout, Point::new(600.0, 500.0));
    assert_eq!(
        resolution.outcome,
        DragOutcome::Merge {
            target: fx.a,
            dragged: fx.b
        }
    );
}

#[test]
fn early_release_over_card_inserts_by_half() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);

    let requests = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 60.0), 300);
    let hold = scheduled(&requests, TimerKind::MergeHold);
    assert_eq!(
        drag.visuals().insertion,
        Some(CardDropTarget::Anchor {
            card: fx.a,
            side: DropSide::Before
        })
    );

    let resolution = drag.release(&fx.board, &fx.layout, Point::new(100.0, 60.0));
    assert_eq!(
        resolution.outcome,
        DragOutcome::MoveCard {
            card: fx.b,
            destination: CardDestination::Before { anchor: fx.a }
        }
    );
    assert_eq!(cancelled(&resolution.timers), vec![hold]);
}

#[test]
fn switching_hover_target_replaces_merge_timer() {
    let mut fx = fixture();
    let c = fx.board.add_card(fx.column, CardKind::Photo).unwrap();
    fx.layout
        .report(LayoutKey::Card(c), Rect::new(10.0, 290.0, 200.0, 100.0));
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);

    let first = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 80.0), 300);
    let stale = scheduled(&first, TimerKind::MergeHold);

    let second = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 320.0), 800);
    assert_eq!(cancelled(&second), vec![stale]);
    let fresh = scheduled(&second, TimerKind::MergeHold);
    assert_ne!(fresh, stale);
    assert_eq!(drag.hover().unwrap().card, c);
    assert_eq!(drag.hover().unwrap().since_ms, 800);

    drag.timer_fired(stale);
    assert_eq!(drag.visuals().merge_armed, None);
    drag.timer_fired(fresh);
    assert_eq!(drag.visuals().merge_armed, Some(c));
}

#[test]
fn leaving_card_before_hold_elapses_cancels_merge() {
    let mut fx = fixture();
    let right = fx.board.add_empty_column("Right");
    fx.layout
        .report(LayoutKey::Column(right), Rect::new(400.0, 0.0, 220.0, 600.0));
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);

    let over_a = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 80.0), 300);
    let hold = scheduled(&over_a, TimerKind::MergeHold);

    let left_a = drag.pointer_move(&fx.board, &fx.layout, Point::new(500.0, 400.0), 350);
    assert_eq!(cancelled(&left_a), vec![hold]);
    assert_eq!(drag.hover(), None);
    assert_eq!(drag.visuals().merge_candidate, None);

    // The host may still deliver the expiry it could not cancel in time.
    assert!(drag.timer_fired(hold).is_empty());
    assert_eq!(drag.visuals().merge_armed, None);

    let resolution = drag.release(&fx.board, &fx.layout, Point::new(500.0, 400.0));
    assert_eq!(
        resolution.outcome,
        DragOutcome::MoveCard {
            card: fx.b,
            destination: CardDestination::End { column: right }
        }
    );
    assert!(resolution.timers.is_empty());
}

#[test]
fn returning_to_card_restarts_hold() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);

    let first = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 80.0), 300);
    let stale = scheduled(&first, TimerKind::MergeHold);
    drag.pointer_move(&fx.board, &fx.layout, Point::new(600.0, 400.0), 400);
    let back = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 90.0), 500);

    let fresh = scheduled(&back, TimerKind::MergeHold);
    assert_ne!(fresh, stale);
    assert_eq!(drag.hover().unwrap().since_ms, 500);
    drag.timer_fired(stale);
    assert_eq!(drag.visuals().merge_armed, None);
    drag.timer_fired(fresh);
    assert_eq!(drag.visuals().merge_armed, Some(fx.a));
}

#[test]
fn release_over_own_placeholder_is_noop() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);

    drag.pointer_move(&fx.board, &fx.layout, Point::new(110.0, 230.0), 300);
    let resolution = drag.release(&fx.board, &fx.layout, Point::new(110.0, 230.0));

    assert_eq!(resolution.outcome, DragOutcome::NoOp);
    assert!(!resolution.outcome.mutates_board());
}

#[test]
fn release_outside_columns_drags_out_only_inside_viewport() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);
    let resolution = drag.release(&fx.board, &fx.layout, Point::new(600.0, 300.0));
    assert_eq!(resolution.outcome, DragOutcome::DragOut { card: fx.b });

    start_dragging_b(&fx, &mut drag);
    let resolution = drag.release(&fx.board, &fx.layout, Point::new(1200.0, 300.0));
    assert_eq!(resolution.outcome, DragOutcome::NoOp);
}

#[test]
fn release_over_empty_column_appends() {
    let mut fx = fixture();
    let empty = fx.board.add_empty_column("Empty");
    fx.layout
        .report(LayoutKey::Column(empty), Rect::new(500.0, 0.0, 220.0, 600.0));
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);

    drag.pointer_move(&fx.board, &fx.layout, Point::new(600.0, 300.0), 300);
    assert_eq!(
        drag.visuals().insertion,
        Some(CardDropTarget::EmptyColumn { column: empty })
    );
    let resolution = drag.release(&fx.board, &fx.layout, Point::new(600.0, 300.0));
    assert_eq!(
        resolution.outcome,
        DragOutcome::MoveCard {
            card: fx.b,
            destination: CardDestination::End { column: empty }
        }
    );
}

#[test]
fn column_drag_reorders_by_last_zone() {
    let mut board = Board::bootstrap();
    let a = board.columns()[0].id;
    let b = board.add_column();
    let c = board.add_column();
    let mut layout = LayoutRegistry::new();
    layout.report(LayoutKey::Column(a), Rect::new(0.0, 0.0, 300.0, 600.0));
    layout.report(LayoutKey::Column(b), Rect::new(320.0, 0.0, 300.0, 600.0));
    layout.report(LayoutKey::Column(c), Rect::new(640.0, 0.0, 300.0, 600.0));

    let mut drag = DragController::new(CanvasConfig::default());
    let requests = drag.press_column(a, Point::new(100.0, 20.0));
    assert!(matches!(
        requests.as_slice(),
        [TimerRequest::Schedule {
            kind: TimerKind::Press,
            delay_ms: 400,
            ..
        }]
    ));
    drag.timer_fired(scheduled(&requests, TimerKind::Press));

    drag.pointer_move(&board, &layout, Point::new(900.0, 50.0), 500);
    let zone = drag.visuals().drop_zone.unwrap();
    assert_eq!(zone.column, c);
    assert_eq!(zone.gap, 3);

    // Leaving every zone hides the indicator but keeps the target.
    drag.pointer_move(&board, &layout, Point::new(2000.0, 50.0), 600);
    assert_eq!(drag.visuals().drop_zone, None);

    let resolution = drag.release(&board, &layout, Point::new(2000.0, 50.0));
    assert_eq!(resolution.outcome, DragOutcome::MoveColumn { column: a, gap: 3 });
}

#[test]
fn column_drag_without_zone_is_noop() {
    let board = Board::bootstrap();
    let a = board.columns()[0].id;
    let mut layout = LayoutRegistry::new();
    layout.report(LayoutKey::Column(a), Rect::new(0.0, 0.0, 300.0, 600.0));

    let mut drag = DragController::new(CanvasConfig::default());
    let requests = drag.press_column(a, Point::new(100.0, 20.0));
    drag.timer_fired(scheduled(&requests, TimerKind::Press));
    drag.pointer_move(&board, &layout, Point::new(150.0, 60.0), 500);

    let resolution = drag.release(&board, &layout, Point::new(150.0, 60.0));
    assert_eq!(resolution.outcome, DragOutcome::NoOp);
}

#[test]
fn palette_click_adds_card_to_owning_column() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());

    let requests = drag.press_palette(fx.column, CardKind::Mail, Point::new(30.0, 20.0));
    let press = scheduled(&requests, TimerKind::Press);
    assert_eq!(drag.phase(), DragPhase::Pending);

    let resolution = drag.release(&fx.board, &fx.layout, Point::new(31.0, 21.0));
    assert_eq!(
        resolution.outcome,
        DragOutcome::AddCard {
            column: fx.column,
            kind: CardKind::Mail
        }
    );
    assert_eq!(cancelled(&resolution.timers), vec![press]);
}

#[test]
fn palette_drag_creates_column_only_outside_columns() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    let start = |drag: &mut DragController| {
        let requests = drag.press_palette(fx.column, CardKind::Photo, Point::new(30.0, 20.0));
        drag.timer_fired(scheduled(&requests, TimerKind::Press));
        assert_eq!(drag.phase(), DragPhase::Dragging);
    };

    start(&mut drag);
    drag.pointer_move(&fx.board, &fx.layout, Point::new(600.0, 400.0), 300);
    let visuals = drag.visuals();
    assert_eq!(visuals.proxy, Some(Point::new(600.0, 400.0)));
    assert_eq!(
        visuals.placeholder,
        Some(DragSubject::Palette {
            column: fx.column,
            kind: CardKind::Photo
        })
    );
    assert_eq!(visuals.merge_candidate, None);
    let resolution = drag.release(&fx.board, &fx.layout, Point::new(600.0, 400.0));
    assert_eq!(
        resolution.outcome,
        DragOutcome::CreateColumn {
            kind: CardKind::Photo
        }
    );

    start(&mut drag);
    let resolution = drag.release(&fx.board, &fx.layout, Point::new(100.0, 300.0));
    assert_eq!(resolution.outcome, DragOutcome::NoOp);

    start(&mut drag);
    let resolution = drag.release(&fx.board, &fx.layout, Point::new(1200.0, 300.0));
    assert_eq!(resolution.outcome, DragOutcome::NoOp);
}

#[test]
fn nested_column_drag_targets_top_level_gap() {
    let mut board = Board::bootstrap();
    let a = board.columns()[0].id;
    let b = board.add_column();
    let x = board.columns()[0].cards().next().unwrap().id;
    let y = board.add_card(a, CardKind::Voice).unwrap();
    let nested = board.merge_cards(x, y).unwrap();

    let mut layout = LayoutRegistry::new();
    layout.report(LayoutKey::Column(a), Rect::new(0.0, 0.0, 300.0, 600.0));
    layout.report(LayoutKey::Column(nested), Rect::new(10.0, 50.0, 280.0, 250.0));
    layout.report(LayoutKey::Column(b), Rect::new(320.0, 0.0, 300.0, 600.0));

    let mut drag = DragController::new(CanvasConfig::default());
    let requests = drag.press_column(nested, Point::new(100.0, 60.0));
    drag.timer_fired(scheduled(&requests, TimerKind::Press));

    drag.pointer_move(&board, &layout, Point::new(600.0, 100.0), 500);
    let zone = drag.visuals().drop_zone.unwrap();
    assert_eq!(zone.column, b);
    assert_eq!(zone.gap, 2);

    let resolution = drag.release(&board, &layout, Point::new(600.0, 100.0));
    assert_eq!(
        resolution.outcome,
        DragOutcome::MoveColumn {
            column: nested,
            gap: 2
        }
    );
}

#[test]
fn cancel_clears_visuals_and_held_timers() {
    let fx = fixture();
    let mut drag = DragController::new(CanvasConfig::default());
    start_dragging_b(&fx, &mut drag);
    let requests = drag.pointer_move(&fx.board, &fx.layout, Point::new(100.0, 80.0), 300);
    let hold = scheduled(&requests, TimerKind::MergeHold);

    let cancel = drag.cancel();

    assert_eq!(cancelled(&cancel), vec![hold]);
    assert_eq!(drag.phase(), DragPhase::Idle);
    assert!(drag.visuals().is_clear());
    assert!(drag.timer_fired(hold).is_empty());
    assert!(drag.cancel().is_empty());
}

#[test]
fn custom_config_delays_flow_into_requests() {
    let fx = fixture();
    let config = CanvasConfig::from_json(r#"{"card_press_ms": 350}"#).unwrap();
    let mut drag = DragController::new(config);

    let requests = drag.press_card(fx.a, fx.column, Point::new(100.0, 100.0));
    assert!(matches!(
        requests.as_slice(),
        [TimerRequest::Schedule { delay_ms: 350, .. }]
    ));
}
