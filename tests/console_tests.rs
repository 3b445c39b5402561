// Console history driving a session, as the console pane does

mod common;

use common::{ready_session, ScriptedInterpreter};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use replterm::session::history::ReplHistory;
use replterm::session::output::OutputKind;
use replterm::session::RunOutcome;
use replterm::ui::app::FocusedPane;
use replterm::ui::App;
use std::rc::Rc;

fn type_line(history: &mut ReplHistory, text: &str) {
    for c in text.chars() {
        history.insert_char(c);
    }
}

// === SUBMISSION ===

#[tokio::test]
async fn test_console_submission_runs_and_records_history() {
    let session = ready_session().await;
    session.interpreter().push_output(&[("stdout", "[1] 2")]);
    let mut console = ReplHistory::new();

    type_line(&mut console, "1 + 1");
    let command = console.submit().expect("non-blank line submits");
    let outcome = session.run(&command).await;

    assert_eq!(outcome, RunOutcome::Completed { records: 1, plots: 0 });
    let lines = session.output();
    let kinds: Vec<OutputKind> = lines.lines().iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![OutputKind::Info, OutputKind::Command, OutputKind::Stdout]
    );
    assert!(!session.is_busy());
    assert_eq!(console.entries(), &["1 + 1".to_string()]);
    assert_eq!(console.cursor(), None);
    assert_eq!(console.buffer(), "");
}

#[tokio::test]
async fn test_blank_console_line_changes_nothing() {
    let session = ready_session().await;
    let mut console = ReplHistory::new();

    type_line(&mut console, "   ");
    assert_eq!(console.submit(), None);
    assert!(console.entries().is_empty());
    assert_eq!(session.interpreter().acquired.get(), 0);
}

#[tokio::test]
async fn test_recalled_entry_can_be_run_again() {
    let session = ready_session().await;
    let mut console = ReplHistory::new();

    type_line(&mut console, "x <- 1");
    let first = console.submit().expect("submits");
    session.run(&first).await;
    type_line(&mut console, "print(x)");
    let second = console.submit().expect("submits");
    session.run(&second).await;

    console.navigate_up();
    console.navigate_up();
    assert_eq!(console.buffer(), "x <- 1");
    let again = console.submit().expect("recalled line submits");
    session.run(&again).await;

    assert_eq!(
        *session.interpreter().evaluated.borrow(),
        vec!["x <- 1".to_string(), "print(x)".to_string(), "x <- 1".to_string()]
    );
    assert_eq!(console.entries().len(), 3);
    assert_eq!(console.entries()[0], "x <- 1");
}

// === NAVIGATION ===

#[test]
fn test_navigation_round_trip_returns_to_live_line() {
    let mut console = ReplHistory::new();
    for command in ["a", "b", "c", "d"] {
        type_line(&mut console, command);
        console.submit();
    }

    for k in 0..=4 {
        for _ in 0..k {
            console.navigate_up();
        }
        let expected_cursor = if k == 0 { None } else { Some(k.min(4) - 1) };
        assert_eq!(console.cursor(), expected_cursor, "after {} ups", k);

        for _ in 0..k {
            console.navigate_down();
        }
        assert_eq!(console.cursor(), None, "after {} ups and downs", k);
        assert_eq!(console.buffer(), "");
    }
}

#[test]
fn test_up_stops_at_oldest_entry() {
    let mut console = ReplHistory::new();
    for command in ["first", "second"] {
        type_line(&mut console, command);
        console.submit();
    }

    for _ in 0..5 {
        console.navigate_up();
    }
    assert_eq!(console.cursor(), Some(1));
    assert_eq!(console.buffer(), "first");

    console.navigate_down();
    assert_eq!(console.cursor(), Some(0));
    assert_eq!(console.buffer(), "second");
}

#[test]
fn test_down_on_live_line_is_a_no_op() {
    let mut console = ReplHistory::new();
    type_line(&mut console, "draft");
    console.navigate_down();
    assert_eq!(console.cursor(), None);
    assert_eq!(console.buffer(), "draft");
}

// === HAND-OFF ===

fn press(app: &mut App<ScriptedInterpreter>, code: KeyCode) {
    app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
}

#[tokio::test]
async fn test_console_freezes_as_soon_as_enter_is_pressed() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let session = Rc::new(ready_session().await);
            let mut app = App::new(Rc::clone(&session), "");
            app.focused_pane = FocusedPane::Console;

            for c in "1 + 1".chars() {
                press(&mut app, KeyCode::Char(c));
            }
            press(&mut app, KeyCode::Enter);
            assert!(!session.accepts_input());

            // A second line typed before the run task starts goes nowhere
            press(&mut app, KeyCode::Char('2'));
            press(&mut app, KeyCode::Enter);
            assert_eq!(app.console.entries().len(), 1);
            assert_eq!(app.console.buffer(), "");

            for _ in 0..10 {
                if session.accepts_input() {
                    break;
                }
                tokio::task::yield_now().await;
            }
            assert!(session.accepts_input());
            assert_eq!(
                *session.interpreter().evaluated.borrow(),
                vec!["1 + 1".to_string()]
            );
        })
        .await;
}
