//! Event loop: terminal input, debounce deadlines, and lookup results.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::event::{
    Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use tokio::select;
use tokio::sync::mpsc;

use tablepick::config::Settings;
use tablepick::events::{ControlEvent, Key};
use tablepick::state::{Lifecycle, Row};
use tablepick::ui::{self, Hit, UiLayout};
use tablepick::util::is_summary_label;
use tablepick::DropdownTable;

use super::Result;
use super::terminal::ScreenSession;

/// Whether the loop keeps running after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    /// Keep running.
    Continue,
    /// Leave the loop.
    Exit,
}

/// Per-session UI bookkeeping outside the control.
#[derive(Debug, Default)]
struct Session {
    /// Rectangles of the last frame.
    layout: UiLayout,
    /// Status line text.
    status: String,
    /// Whether the pointer is over a row.
    hovering: bool,
}

/// What: Run the picker until the user exits.
///
/// Inputs:
/// - `settings`: Settings for the control
/// - `initial_query`: Text searched right after start
///
/// Output:
/// - Rows selected when the user exited.
///
/// # Errors
/// - Invalid settings, or terminal setup/draw failures.
///
/// Details:
/// - The terminal is restored before returning, also on loop errors and panics.
pub async fn run(settings: Settings, initial_query: Option<String>) -> Result<Vec<Row>> {
    let mut table = DropdownTable::new(settings)?;
    let mut fetch_rx = table
        .take_fetch_receiver()
        .ok_or("fetch receiver already taken")?;
    let (_, mut control_rx) = table.subscribe_channel();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    spawn_event_thread(event_tx, Arc::clone(&cancelled));

    let mut screen = ScreenSession::enter()?;
    let mut session = Session {
        status: hint(&table),
        ..Session::default()
    };
    if let Some(query) = initial_query {
        table.set_value(&query);
    }

    let outcome: Result<()> = async {
        loop {
            screen
                .terminal()
                .draw(|f| ui::render(f, &table, &mut session.layout, &session.status))?;
            let deadline = table.debounce_deadline();
            select! {
                Some(ev) = event_rx.recv() => {
                    if handle_event(&mut table, &mut session, &ev) == Flow::Exit {
                        break;
                    }
                }
                Some(result) = fetch_rx.recv() => {
                    table.apply_fetch_outcome(result);
                }
                Some(event) = control_rx.recv() => {
                    if let Some(text) = status_for(&event) {
                        session.status = text;
                    }
                }
                () = wait_until(deadline) => {
                    table.tick(Instant::now());
                }
            }
        }
        Ok(())
    }
    .await;

    cancelled.store(true, Ordering::Relaxed);
    screen.leave()?;
    outcome?;
    let rows = table.selected_rows();
    table.destroy();
    Ok(rows)
}

/// Sleep until `deadline`, or forever when there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(tokio::time::Instant::from_std(d)).await,
        None => std::future::pending::<()>().await,
    }
}

/// What: Forward crossterm events from a blocking reader thread.
///
/// Inputs:
/// - `event_tx`: Channel receiving terminal events
/// - `cancelled`: Set to stop the thread
///
/// Details:
/// - Polls with a short timeout so cancellation is observed promptly.
fn spawn_event_thread(event_tx: mpsc::UnboundedSender<CEvent>, cancelled: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        while !cancelled.load(Ordering::Relaxed) {
            match crossterm::event::poll(Duration::from_millis(50)) {
                Ok(true) => match crossterm::event::read() {
                    Ok(ev) => {
                        if event_tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::debug!(error = %e, "terminal read failed"),
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "terminal poll failed; stopping input thread");
                    break;
                }
            }
        }
    });
}

/// What: Apply one terminal event to the control.
///
/// Inputs:
/// - `table`: Control
/// - `session`: UI bookkeeping
/// - `ev`: Terminal event
///
/// Output:
/// - `Flow::Exit` on Ctrl+C, or Escape while the list is closed.
fn handle_event(table: &mut DropdownTable, session: &mut Session, ev: &CEvent) -> Flow {
    match ev {
        CEvent::Key(key) if key.kind == KeyEventKind::Press => handle_key(table, *key),
        CEvent::Mouse(mouse) => {
            handle_mouse(table, session, *mouse);
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}

/// Keyboard handling: editing keys feed `on_input`, navigation keys feed `on_key`.
fn handle_key(table: &mut DropdownTable, key: KeyEvent) -> Flow {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return Flow::Exit,
        KeyCode::Char('a') if ctrl => {
            table.select_all();
        }
        KeyCode::Char('u') if ctrl => {
            table.on_input("");
        }
        KeyCode::Char(ch) if !ctrl => {
            let mut text = editable_text(table);
            text.push(ch);
            table.on_input(&text);
        }
        KeyCode::Backspace => {
            let mut text = editable_text(table);
            text.pop();
            table.on_input(&text);
        }
        KeyCode::Esc if table.lifecycle() == Lifecycle::Closed => return Flow::Exit,
        code => {
            table.on_key(Key::from(code));
        }
    }
    Flow::Continue
}

/// Input text as the user edits it; a selection summary starts a fresh query.
fn editable_text(table: &DropdownTable) -> String {
    let value = table.value();
    if table.state().settings.multiselect && is_summary_label(value) {
        String::new()
    } else {
        value.to_string()
    }
}

/// Mouse handling through the hit-test layout of the last frame.
fn handle_mouse(table: &mut DropdownTable, session: &mut Session, mouse: MouseEvent) {
    let hit = session.layout.hit_test(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match hit {
            Hit::Row(index) => {
                table.on_row_click(index);
            }
            Hit::Header(key) => {
                table.on_column_header_click(&key);
            }
            Hit::Input => table.on_focus(),
            Hit::Dropdown => {}
            Hit::Outside => {
                table.on_outside_interaction();
            }
        },
        MouseEventKind::Moved => match hit {
            Hit::Row(index) => {
                session.hovering = true;
                table.on_row_hover(index);
            }
            _ if session.hovering => {
                session.hovering = false;
                table.on_row_leave();
            }
            _ => {}
        },
        MouseEventKind::ScrollDown => {
            table.on_key(Key::Down);
        }
        MouseEventKind::ScrollUp => {
            table.on_key(Key::Up);
        }
        _ => {}
    }
}

/// Status line text for a control event.
fn status_for(event: &ControlEvent) -> Option<String> {
    match event {
        ControlEvent::Loading { query, token } => Some(format!("Searching \"{query}\" ({token})…")),
        ControlEvent::DataLoad { query, count } => Some(format!("{count} row(s) for \"{query}\"")),
        ControlEvent::Error(err) => Some(format!("Error: {err}")),
        ControlEvent::SelectionChange(rows) => Some(format!("{} selected", rows.len())),
        ControlEvent::Select(_) | ControlEvent::Open | ControlEvent::Close => None,
    }
}

/// Initial status line.
fn hint(table: &DropdownTable) -> String {
    if table.state().settings.multiselect {
        "Type to search · ↑/↓ move · Enter toggle · Ctrl+A all · Esc close/quit".to_string()
    } else {
        "Type to search · ↑/↓ move · Enter pick · Esc close/quit".to_string()
    }
}
